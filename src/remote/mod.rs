//! Remote CMS API: wire types, the `CmsApi` trait, and clients

pub mod api;
pub mod client;
pub mod types;

pub use api::CmsApi;
pub use client::{DryRunClient, WpClient};
pub use types::{
    Applied, PostFields, RemoteMedia, RemotePost, RemoteTerm, Rendered, TermFields, Taxonomy,
    DRY_RUN_ID,
};
