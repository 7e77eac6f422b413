//! Attributes (axes of variation) and the ordered store being edited.

use serde::{Deserialize, Serialize};

use inventra_core::{DomainError, DomainResult, ValueObject};

/// A named axis of product variation (e.g. "Color") with its ordered values.
///
/// While editing, `name` and `values` may hold blank entries; only the
/// non-blank ones take part in generation (see [`Attribute::qualified`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl ValueObject for Attribute {}

impl Attribute {
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Fresh editor row: blank name and a single blank value.
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            values: vec![String::new()],
        }
    }

    /// Trimmed copy with blank values dropped.
    ///
    /// Returns `None` when the name is blank or no value survives.
    pub fn qualified(&self) -> Option<Attribute> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }

        let values: Vec<String> = self
            .values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        if values.is_empty() {
            return None;
        }

        Some(Attribute {
            name: name.to_string(),
            values,
        })
    }
}

/// The attributes that participate in generation, in declaration order.
pub fn qualifying_attributes(attributes: &[Attribute]) -> Vec<Attribute> {
    attributes.iter().filter_map(Attribute::qualified).collect()
}

/// One coordinate of a variant: which value it takes on which attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValuePair {
    pub attribute_name: String,
    pub value: String,
}

impl ValueObject for AttributeValuePair {}

impl AttributeValuePair {
    pub fn new(attribute_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of attributes under edit.
///
/// Every mutator validates its indices before touching anything, so a failed
/// call leaves the store unchanged. None of them regenerate variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeStore {
    attributes: Vec<Attribute>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn into_attributes(self) -> Vec<Attribute> {
        self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Whether at least one attribute would take part in generation.
    pub fn has_qualifying(&self) -> bool {
        self.attributes.iter().any(|a| a.qualified().is_some())
    }

    pub fn add_attribute(&mut self) {
        self.attributes.push(Attribute::blank());
    }

    /// Remove one attribute. The caller is responsible for regenerating.
    pub fn remove_attribute(&mut self, index: usize) -> DomainResult<Attribute> {
        self.check_attribute(index)?;
        Ok(self.attributes.remove(index))
    }

    pub fn rename_attribute(&mut self, index: usize, name: impl Into<String>) -> DomainResult<()> {
        self.check_attribute(index)?;
        self.attributes[index].name = name.into();
        Ok(())
    }

    /// Append a blank value to one attribute.
    pub fn add_value(&mut self, attr_index: usize) -> DomainResult<()> {
        self.check_attribute(attr_index)?;
        self.attributes[attr_index].values.push(String::new());
        Ok(())
    }

    pub fn remove_value(&mut self, attr_index: usize, value_index: usize) -> DomainResult<String> {
        self.check_value(attr_index, value_index)?;
        Ok(self.attributes[attr_index].values.remove(value_index))
    }

    pub fn update_value(
        &mut self,
        attr_index: usize,
        value_index: usize,
        value: impl Into<String>,
    ) -> DomainResult<()> {
        self.check_value(attr_index, value_index)?;
        self.attributes[attr_index].values[value_index] = value.into();
        Ok(())
    }

    fn check_attribute(&self, index: usize) -> DomainResult<()> {
        if index >= self.attributes.len() {
            return Err(DomainError::out_of_range("attribute", index, self.attributes.len()));
        }
        Ok(())
    }

    fn check_value(&self, attr_index: usize, value_index: usize) -> DomainResult<()> {
        self.check_attribute(attr_index)?;
        let len = self.attributes[attr_index].values.len();
        if value_index >= len {
            return Err(DomainError::out_of_range("value", value_index, len));
        }
        Ok(())
    }
}

impl From<Vec<Attribute>> for AttributeStore {
    fn from(attributes: Vec<Attribute>) -> Self {
        Self::from_attributes(attributes)
    }
}
