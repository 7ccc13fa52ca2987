//! Per-kind admin editor state machine
//!
//! ```text
//! Listing --begin_create--> Creating --submit ok--> (notice, delay) --> Listing
//! Listing --begin_edit----> Editing  --submit ok--> (notice, delay) --> Listing
//! Creating/Editing --cancel--> Listing
//! Listing --request_delete--> (pending) --confirm/cancel--> Listing
//! ```
//!
//! Submission is split into `prepare_submit` and `finish_submit` so the caller
//! can run the store call without holding the session lock. `submit` chains
//! the two for callers that own the editor outright.

use ahan_common::store::CatalogStores;
use ahan_common::Entity;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tracing::debug;

use super::forms::AdminForm;
use super::{AdminError, PendingWrite};
use crate::catalog::Catalog;

type Record<F> = <F as AdminForm>::Entity;
type RecordId<F> = <Record<F> as Entity>::Id;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "record", rename_all = "lowercase")]
pub enum EditorState<E> {
    Listing,
    Creating,
    /// Holds the record as it was when editing began
    Editing(E),
}

impl<E> EditorState<E> {
    fn name(&self) -> &'static str {
        match self {
            EditorState::Listing => "listing",
            EditorState::Creating => "creating",
            EditorState::Editing(_) => "editing",
        }
    }
}

/// Inline message shown above the editor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Serializable view of one editor, with the form prefilled for editing
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "", rename_all = "camelCase")]
pub struct EditorView<F: AdminForm> {
    pub state: EditorState<Record<F>>,
    pub form: Option<F>,
    pub notice: Option<Notice>,
    pub pending_delete: Option<String>,
}

#[derive(Debug)]
pub struct Editor<F: AdminForm> {
    state: EditorState<Record<F>>,
    notice: Option<Notice>,
    pending_delete: Option<RecordId<F>>,
    /// Set after a successful submit; the editor returns to `Listing` once passed
    return_at: Option<Instant>,
    confirmation_delay: Duration,
    _form: PhantomData<fn() -> F>,
}

impl<F: AdminForm> Editor<F> {
    pub fn new(confirmation_delay: Duration) -> Self {
        Self {
            state: EditorState::Listing,
            notice: None,
            pending_delete: None,
            return_at: None,
            confirmation_delay,
            _form: PhantomData,
        }
    }

    pub fn state(&self) -> &EditorState<Record<F>> {
        &self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&RecordId<F>> {
        self.pending_delete.as_ref()
    }

    /// Finish a success confirmation whose delay has elapsed
    pub fn settle(&mut self, now: Instant) {
        if matches!(self.return_at, Some(at) if now >= at) {
            self.return_to_listing();
        }
    }

    fn return_to_listing(&mut self) {
        self.state = EditorState::Listing;
        self.notice = None;
        self.return_at = None;
    }

    /// A user action during the confirmation delay cuts it short
    fn interrupt_confirmation(&mut self) {
        if self.return_at.is_some() {
            self.return_to_listing();
        }
    }

    fn invalid(&self, action: &'static str) -> AdminError {
        AdminError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    pub fn begin_create(&mut self) -> Result<(), AdminError> {
        self.interrupt_confirmation();
        if !matches!(self.state, EditorState::Listing) {
            return Err(self.invalid("add new"));
        }
        self.state = EditorState::Creating;
        self.notice = None;
        self.pending_delete = None;
        Ok(())
    }

    pub fn begin_edit(&mut self, record: Record<F>) -> Result<(), AdminError> {
        self.interrupt_confirmation();
        if !matches!(self.state, EditorState::Listing) {
            return Err(self.invalid("edit"));
        }
        self.state = EditorState::Editing(record);
        self.notice = None;
        self.pending_delete = None;
        Ok(())
    }

    /// Back to `Listing`; nothing is written
    pub fn cancel(&mut self) {
        self.return_to_listing();
    }

    /// Validate the form for the current mode. A validation failure becomes
    /// the error notice and no store call is made.
    pub fn prepare_submit(&mut self, form: &F) -> Result<PendingWrite<Record<F>>, AdminError> {
        if self.return_at.is_some() {
            return Err(self.invalid("submit"));
        }

        let prepared = match &self.state {
            EditorState::Listing => return Err(self.invalid("submit")),
            EditorState::Creating => form.to_draft().map(PendingWrite::Create),
            EditorState::Editing(record) => {
                let id = record.id().clone();
                form.to_patch().map(|patch| PendingWrite::Update(id, patch))
            }
        };

        prepared.map_err(|e| {
            self.notice = Some(Notice::Error(e.to_string()));
            AdminError::Catalog(e)
        })
    }

    /// Record the outcome of a prepared write. Success starts the
    /// confirmation delay; failure keeps the current mode.
    pub fn finish_submit(
        &mut self,
        outcome: &ahan_common::Result<Record<F>>,
        now: Instant,
    ) {
        match outcome {
            Ok(record) => {
                let verb = match self.state {
                    EditorState::Editing(_) => "Updated",
                    _ => "Created",
                };
                self.notice = Some(Notice::Success(format!(
                    "{} {} '{}'",
                    verb,
                    <Record<F> as Entity>::KIND,
                    record.id()
                )));
                self.return_at = Some(now + self.confirmation_delay);
            }
            Err(e) => {
                self.notice = Some(Notice::Error(e.to_string()));
            }
        }
    }

    /// Validate, write through the catalog, then record the outcome
    pub async fn submit(
        &mut self,
        form: &F,
        stores: &CatalogStores,
        catalog: &Catalog,
    ) -> Result<Record<F>, AdminError> {
        let pending = self.prepare_submit(form)?;
        let outcome = pending.execute(stores, catalog).await;
        self.finish_submit(&outcome, Instant::now());
        outcome.map_err(AdminError::from)
    }

    /// Ask for confirmation before deleting `id`
    pub fn request_delete(&mut self, id: RecordId<F>) -> Result<(), AdminError> {
        self.interrupt_confirmation();
        if !matches!(self.state, EditorState::Listing) {
            return Err(self.invalid("delete"));
        }
        debug!("Delete of {} '{}' awaiting confirmation", <Record<F> as Entity>::KIND, id);
        self.pending_delete = Some(id);
        self.notice = None;
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Take the confirmed target; a second confirmation finds nothing pending
    pub fn take_confirmed_delete(&mut self) -> Result<RecordId<F>, AdminError> {
        self.pending_delete
            .take()
            .ok_or_else(|| self.invalid("confirm delete"))
    }

    pub fn finish_delete(&mut self, id: &RecordId<F>, outcome: &ahan_common::Result<()>) {
        self.notice = Some(match outcome {
            Ok(()) => Notice::Success(format!(
                "Deleted {} '{}'",
                <Record<F> as Entity>::KIND,
                id
            )),
            Err(e) => Notice::Error(e.to_string()),
        });
    }

    pub async fn confirm_delete(
        &mut self,
        stores: &CatalogStores,
        catalog: &Catalog,
    ) -> Result<(), AdminError> {
        let id = self.take_confirmed_delete()?;
        let outcome = catalog.delete::<Record<F>>(stores, &id).await;
        self.finish_delete(&id, &outcome);
        outcome.map_err(AdminError::from)
    }

    pub fn view(&self) -> EditorView<F> {
        let form = match &self.state {
            EditorState::Listing => None,
            EditorState::Creating => Some(F::default()),
            EditorState::Editing(record) => Some(F::from_record(record)),
        };

        EditorView {
            state: self.state.clone(),
            form,
            notice: self.notice.clone(),
            pending_delete: self.pending_delete.as_ref().map(|id| id.to_string()),
        }
    }
}
