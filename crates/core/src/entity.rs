//! Identity for catalog objects that change over time.

/// A product or an image: equal ids mean the same object even when a
/// default flag, URL or image list differs.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
