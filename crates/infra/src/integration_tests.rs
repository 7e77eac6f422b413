//! Integration tests for the product editing workflow.
//!
//! Tests: suggestion → session commands → submit → ProductStore → resume
//!
//! Verifies:
//! - A full create flow persists the assembled variant payload
//! - A failed save leaves the session open and a retry sends the same payload
//! - Resumed products round-trip their variants and reject stale updates

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use inventra_core::{Aggregate, AggregateRoot, ExpectedVersion};
    use inventra_products::{
        Capabilities, EngineConfig, ProductFields, ProductId, ProductPayload, SessionCommand,
        SessionError, SessionState, VariantDefaults, VariantField, VariantSession,
    };

    use crate::product_editor::{EditorError, ProductEditor};
    use crate::product_store::{InMemoryProductStore, ProductStore, StoreError, StoredProduct};
    use crate::sku_suggestion::LocalSkuSuggester;

    /// Fails the first `failures` writes, recording every payload it was sent.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: InMemoryProductStore,
        failures: Mutex<u32>,
        attempts: Mutex<Vec<ProductPayload>>,
    }

    impl FlakyStore {
        fn failing(failures: u32) -> Self {
            Self {
                failures: Mutex::new(failures),
                ..Self::default()
            }
        }

        fn attempt(&self, payload: &ProductPayload) -> Result<(), StoreError> {
            self.attempts.lock().unwrap().push(payload.clone());
            let mut left = self.failures.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(StoreError::Unavailable("connection reset".to_string()));
            }
            Ok(())
        }
    }

    impl ProductStore for FlakyStore {
        fn create(&self, payload: &ProductPayload) -> Result<StoredProduct, StoreError> {
            self.attempt(payload)?;
            self.inner.create(payload)
        }

        fn update(
            &self,
            id: ProductId,
            payload: &ProductPayload,
            expected: ExpectedVersion,
        ) -> Result<StoredProduct, StoreError> {
            self.attempt(payload)?;
            self.inner.update(id, payload, expected)
        }

        fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, StoreError> {
            self.inner.get(id)
        }
    }

    const DEFAULTS: VariantDefaults = VariantDefaults {
        selling_price: 2500,
        cost_price: Some(1100),
    };

    fn fields() -> ProductFields {
        ProductFields {
            name: "Cotton Shirt".to_string(),
            category: "Apparel".to_string(),
            unit: "pcs".to_string(),
            description: "Plain crew neck".to_string(),
            ..ProductFields::default()
        }
    }

    fn run(session: &mut VariantSession, command: SessionCommand) {
        session.execute(&command).unwrap();
    }

    /// Declare `name` with `values` as the next attribute.
    fn declare(session: &mut VariantSession, name: &str, values: &[&str]) {
        let index = session.attributes().len();
        run(session, SessionCommand::AddAttribute);
        run(session, SessionCommand::RenameAttribute { index, name: name.to_string() });
        for (value_index, value) in values.iter().enumerate() {
            if value_index > 0 {
                run(session, SessionCommand::AddValue { attr_index: index });
            }
            run(session, SessionCommand::UpdateValue {
                attr_index: index,
                value_index,
                value: value.to_string(),
            });
        }
    }

    fn shirt_session<S, P>(editor: &ProductEditor<S, P>) -> VariantSession
    where
        S: crate::sku_suggestion::SkuSuggestionService,
        P: ProductStore,
    {
        let mut session = editor.start("Cotton Shirt");
        declare(&mut session, "Color", &["Red", "Blue"]);
        declare(&mut session, "Size", &["S", "M", "L"]);
        run(&mut session, SessionCommand::Generate { defaults: DEFAULTS });
        session
    }

    #[test]
    fn end_to_end_create_persists_variant_payload() {
        let store = Arc::new(InMemoryProductStore::new());
        let editor = ProductEditor::new(LocalSkuSuggester::new(), store.clone(), EngineConfig::default());

        let mut session = shirt_session(&editor);
        assert_eq!(session.base_sku(), "COT-SHI-001");
        assert_eq!(session.variants().len(), 6);

        run(&mut session, SessionCommand::UpdateVariant {
            index: 4,
            field: VariantField::Stock(12),
        });
        run(&mut session, SessionCommand::RemoveVariant { index: 5 });
        run(&mut session, SessionCommand::ChangeBaseSku { base_sku: "TEE".to_string() });

        let stored = editor
            .submit(&mut session, fields(), Capabilities { can_view_cost_price: true }, ExpectedVersion::Any)
            .unwrap();

        assert_eq!(session.state(), SessionState::Submitted);
        assert_eq!(stored.revision, 1);
        assert_eq!(store.len(), 1);

        let payload = &stored.payload;
        assert!(payload.has_variants);
        assert_eq!(payload.sku, None);
        assert_eq!(payload.selling_price, None);
        assert_eq!(payload.attributes().len(), 2);
        let skus: Vec<&str> = payload.variants().iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["TEE-RED-S", "TEE-RED-M", "TEE-RED-L", "TEE-BLU-S", "TEE-BLU-M"]);
        assert_eq!(payload.variants()[4].stock, 12);
        assert_eq!(payload.variants()[0].cost_price, Some(1100));
    }

    #[test]
    fn cost_prices_are_not_persisted_without_capability() {
        let editor = ProductEditor::new(
            LocalSkuSuggester::new(),
            InMemoryProductStore::new(),
            EngineConfig::default(),
        );
        let mut session = shirt_session(&editor);

        let stored = editor
            .submit(&mut session, fields(), Capabilities::default(), ExpectedVersion::Any)
            .unwrap();

        assert!(stored.payload.variants().iter().all(|v| v.cost_price.is_none()));
    }

    #[test]
    fn invalid_submit_never_reaches_the_store() {
        let store = Arc::new(FlakyStore::default());
        let editor = ProductEditor::new(LocalSkuSuggester::new(), store.clone(), EngineConfig::default());
        let mut session = shirt_session(&editor);

        let err = editor
            .submit(
                &mut session,
                ProductFields { category: String::new(), ..fields() },
                Capabilities::default(),
                ExpectedVersion::Any,
            )
            .unwrap_err();

        assert!(matches!(err, EditorError::Session(SessionError::Validation(_))));
        assert!(store.attempts.lock().unwrap().is_empty());
        assert_eq!(session.state(), SessionState::Generated);
    }

    #[test]
    fn failed_save_leaves_session_open_and_retry_sends_same_payload() {
        let store = Arc::new(FlakyStore::failing(1));
        let editor = ProductEditor::new(LocalSkuSuggester::new(), store.clone(), EngineConfig::default());
        let mut session = shirt_session(&editor);
        run(&mut session, SessionCommand::UpdateVariant {
            index: 0,
            field: VariantField::SellingPrice(2700),
        });
        let version = session.version();

        let err = editor
            .submit(&mut session, fields(), Capabilities::default(), ExpectedVersion::Any)
            .unwrap_err();
        match &err {
            EditorError::Store(e) => assert!(e.is_transient()),
            other => panic!("Expected Store error, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Curated);
        assert_eq!(session.version(), version);
        assert!(session.payload().is_none());

        let stored = editor
            .submit(&mut session, fields(), Capabilities::default(), ExpectedVersion::Any)
            .unwrap();

        let attempts = store.attempts.lock().unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0], attempts[1]);
        assert_eq!(stored.payload, attempts[1]);
        assert_eq!(session.state(), SessionState::Submitted);
    }

    #[test]
    fn resume_recovers_base_sku_and_updates_under_revision() {
        let store = Arc::new(InMemoryProductStore::new());
        let editor = ProductEditor::new(LocalSkuSuggester::new(), store.clone(), EngineConfig::default());

        let mut first = shirt_session(&editor);
        let created = editor
            .submit(&mut first, fields(), Capabilities { can_view_cost_price: true }, ExpectedVersion::Any)
            .unwrap();

        let resumed = editor.resume(created.id).unwrap();
        assert_eq!(resumed.revision, 1);
        let mut session = resumed.session;
        assert_eq!(session.product_id(), Some(created.id));
        assert_eq!(session.base_sku(), "COT-SHI-001");
        assert_eq!(session.state(), SessionState::Generated);
        assert_eq!(session.variants(), created.payload.variants());

        run(&mut session, SessionCommand::RemoveAttribute { index: 1, defaults: DEFAULTS });
        let updated = editor
            .submit(
                &mut session,
                fields(),
                Capabilities { can_view_cost_price: true },
                ExpectedVersion::Exact(resumed.revision),
            )
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.revision, 2);
        assert_eq!(store.len(), 1);
        let skus: Vec<&str> = updated.payload.variants().iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["COT-SHI-001-RED", "COT-SHI-001-BLU"]);
    }

    #[test]
    fn stale_resumed_session_is_rejected_and_stays_open() {
        let store = Arc::new(InMemoryProductStore::new());
        let editor = ProductEditor::new(LocalSkuSuggester::new(), store.clone(), EngineConfig::default());

        let mut first = shirt_session(&editor);
        let created = editor
            .submit(&mut first, fields(), Capabilities::default(), ExpectedVersion::Any)
            .unwrap();

        let mut a = editor.resume(created.id).unwrap();
        let mut b = editor.resume(created.id).unwrap();

        run(&mut a.session, SessionCommand::UpdateVariant { index: 0, field: VariantField::Stock(3) });
        editor
            .submit(&mut a.session, fields(), Capabilities::default(), ExpectedVersion::Exact(a.revision))
            .unwrap();

        run(&mut b.session, SessionCommand::UpdateVariant { index: 1, field: VariantField::Stock(7) });
        let err = editor
            .submit(&mut b.session, fields(), Capabilities::default(), ExpectedVersion::Exact(b.revision))
            .unwrap_err();

        assert!(matches!(err, EditorError::Store(StoreError::Concurrency(_))));
        assert_eq!(b.session.state(), SessionState::Curated);
        let current = store.get(created.id).unwrap().unwrap();
        assert_eq!(current.revision, 2);
        assert_eq!(current.payload.variants()[0].stock, 3);
        assert_eq!(current.payload.variants()[1].stock, 0);
    }

    #[test]
    fn simple_product_round_trips_its_sku() {
        let editor = ProductEditor::new(
            LocalSkuSuggester::new(),
            InMemoryProductStore::new(),
            EngineConfig::default(),
        );
        let mut session = editor.start("Enamel Mug");

        let stored = editor
            .submit(
                &mut session,
                ProductFields { selling_price: Some(900), ..fields() },
                Capabilities::default(),
                ExpectedVersion::Any,
            )
            .unwrap();
        assert!(!stored.payload.has_variants);
        assert_eq!(stored.payload.sku.as_deref(), Some("ENA-MUG-001"));

        let resumed = editor.resume(stored.id).unwrap();
        assert_eq!(resumed.session.base_sku(), "ENA-MUG-001");
        assert_eq!(resumed.session.state(), SessionState::NoVariants);
    }
}
