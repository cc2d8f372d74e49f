//! Create/edit forms.
//!
//! A form holds a local draft and moves through
//! `Editing -> Submitting -> Succeeded`, falling back to `Editing` when the
//! backend rejects the submission. Only `Editing` accepts edits or a submit.

mod author;
mod paper;

use tokio::sync::RwLock;

pub use author::{AuthorDraft, AuthorForm, PaperLookup};
pub use paper::{PaperDraft, PaperForm, generate_paper_id, parse_author_list};

use crate::error::{ViewError, ViewResult};

/// Lifecycle phase of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Accepting edits.
    Editing,
    /// Submission in flight; edits and further submits are rejected.
    Submitting,
    /// Saved; the host navigates away.
    Succeeded,
}

impl FormPhase {
    /// Lowercase name for messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
        }
    }
}

/// Whether a form creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// New record.
    Create,
    /// Existing record with this id.
    Edit(String),
}

impl FormMode {
    /// Whether this is a new record.
    #[must_use]
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }
}

#[derive(Debug)]
struct Inner<D> {
    draft: D,
    phase: FormPhase,
    last_error: Option<String>,
}

/// Draft plus phase, guarded together.
#[derive(Debug)]
pub(crate) struct FormState<D> {
    inner: RwLock<Inner<D>>,
}

impl<D: Clone> FormState<D> {
    pub(crate) fn new(draft: D) -> Self {
        Self { inner: RwLock::new(Inner { draft, phase: FormPhase::Editing, last_error: None }) }
    }

    pub(crate) async fn draft(&self) -> D {
        self.inner.read().await.draft.clone()
    }

    pub(crate) async fn phase(&self) -> FormPhase {
        self.inner.read().await.phase
    }

    pub(crate) async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    /// Apply an edit to the draft.
    pub(crate) async fn edit(&self, apply: impl FnOnce(&mut D) + Send) -> ViewResult<()> {
        let mut inner = self.inner.write().await;
        ensure_editing(inner.phase)?;
        apply(&mut inner.draft);
        Ok(())
    }

    /// Validate the draft and enter `Submitting` in one step.
    ///
    /// Validation failures leave the form in `Editing`.
    pub(crate) async fn begin_submit<T>(
        &self,
        validate: impl FnOnce(&D) -> ViewResult<T> + Send,
    ) -> ViewResult<T> {
        let mut inner = self.inner.write().await;
        ensure_editing(inner.phase)?;
        let payload = validate(&inner.draft)?;
        inner.phase = FormPhase::Submitting;
        inner.last_error = None;
        Ok(payload)
    }

    pub(crate) async fn succeed(&self) {
        self.inner.write().await.phase = FormPhase::Succeeded;
    }

    pub(crate) async fn fail(&self, message: String) {
        let mut inner = self.inner.write().await;
        inner.phase = FormPhase::Editing;
        inner.last_error = Some(message);
    }
}

const fn ensure_editing(phase: FormPhase) -> ViewResult<()> {
    match phase {
        FormPhase::Editing => Ok(()),
        FormPhase::Submitting => Err(ViewError::SubmitInFlight),
        FormPhase::Succeeded => Err(ViewError::NotEditable { phase: "succeeded" }),
    }
}
