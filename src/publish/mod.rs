//! Reconciliation core: media, taxonomy terms, and the post reconciler

pub mod media;
pub mod reconcile;
pub mod terms;

pub use media::{AssetPublisher, MediaRef};
pub use reconcile::{rewrite_image_refs, Outcome, Reconciler};
pub use terms::TermResolver;
