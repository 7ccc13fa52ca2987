//! # AhanHub Common Library
//!
//! Shared code for the AhanHub catalog service including:
//! - Catalog data model (recitations, media, stations, channels)
//! - The `Entity` abstraction every catalog collection implements
//! - Record store adapters (SQLite document store, in-process memory store)
//! - Database initialization
//! - Configuration loading

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod models;
pub mod store;

pub use entity::{Entity, EntityKind};
pub use error::{Error, Result};
pub use store::RecordStore;
