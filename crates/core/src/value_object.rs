//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. In the catalog a
/// product name or a price is a value object; a product or an image is not.
///
/// To "modify" a value object, construct a new one (which re-runs validation).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Price(f64);
///
/// impl ValueObject for Price {}
///
/// assert_eq!(Price(9.9), Price(9.9));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
