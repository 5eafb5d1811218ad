//! Catalog of sellable packs

pub mod models;
pub mod service;

pub use models::{CatalogItem, CatalogItemDraft, DEFAULT_PACKS};
pub use service::CatalogService;
