//! Admin CRUD controller
//!
//! One `Editor` per entity kind, grouped in an `AdminWorkspace` that lives in
//! the admin's session.

use ahan_common::store::CatalogStores;
use ahan_common::{Entity, Result};
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogEntity};

mod editor;
pub mod episodes;
pub mod forms;

pub use editor::{Editor, EditorState, EditorView, Notice};
pub use forms::{AdminForm, ChannelForm, MediaForm, RecitationForm, StationForm};

#[derive(Error, Debug)]
pub enum AdminError {
    /// The action is not available in the editor's current state
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Catalog(#[from] ahan_common::Error),
}

/// A validated write, ready to send to the store
#[derive(Debug, Clone)]
pub enum PendingWrite<E: Entity> {
    Create(E::Draft),
    Update(E::Id, E::Patch),
}

impl<E: CatalogEntity> PendingWrite<E> {
    /// Write through the catalog (write-then-reflect)
    pub async fn execute(self, stores: &CatalogStores, catalog: &Catalog) -> Result<E> {
        match self {
            PendingWrite::Create(draft) => catalog.create::<E>(stores, draft).await,
            PendingWrite::Update(id, patch) => catalog.update::<E>(stores, &id, patch).await,
        }
    }
}

/// The four editors of one admin session
#[derive(Debug)]
pub struct AdminWorkspace {
    pub recitations: Editor<RecitationForm>,
    pub media: Editor<MediaForm>,
    pub stations: Editor<StationForm>,
    pub channels: Editor<ChannelForm>,
}

impl AdminWorkspace {
    pub fn new(confirmation_delay: Duration) -> Self {
        Self {
            recitations: Editor::new(confirmation_delay),
            media: Editor::new(confirmation_delay),
            stations: Editor::new(confirmation_delay),
            channels: Editor::new(confirmation_delay),
        }
    }
}
