//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two attributes named `Color` with values
/// `[Red, Blue]` are the same attribute. They are never patched in place by
/// shared references; "modifying" one means building a new value (clone and
/// patch), which keeps edits to one value from leaking into another.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct AttributeValuePair {
///     attribute_name: String,
///     value: String,
/// }
///
/// impl ValueObject for AttributeValuePair {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
