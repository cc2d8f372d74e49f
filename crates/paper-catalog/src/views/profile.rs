//! Profile editor.

use tokio::sync::RwLock;

use crate::client::CatalogClient;
use crate::error::{ViewError, ViewResult};
use crate::models::Profile;

#[derive(Debug, Default)]
struct Inner {
    loaded: Profile,
    draft: Profile,
    editing: bool,
    saving: bool,
}

/// `/profile`: view mode with an edit toggle; cancel restores the loaded
/// profile.
#[derive(Debug)]
pub struct ProfileEditor {
    client: CatalogClient,
    inner: RwLock<Inner>,
}

impl ProfileEditor {
    /// Editor seeded with the signed-in email until [`Self::load`] runs.
    pub async fn new(client: CatalogClient) -> Self {
        let email = client.session().current().await.map(|s| s.user_email).unwrap_or_default();
        let seed = Profile { email, ..Default::default() };
        Self {
            client,
            inner: RwLock::new(Inner { loaded: seed.clone(), draft: seed, ..Default::default() }),
        }
    }

    /// Fetch the profile from the backend.
    pub async fn load(&self) -> ViewResult<Profile> {
        match self.client.get_profile().await {
            Ok(profile) => {
                let mut inner = self.inner.write().await;
                inner.loaded = profile.clone();
                inner.draft = profile.clone();
                inner.editing = false;
                Ok(profile)
            }
            Err(e) => {
                if !e.is_auth_failure() {
                    self.client.session().events().error("Failed to load profile");
                }
                Err(ViewError::Client(e))
            }
        }
    }

    /// Last loaded or saved profile.
    pub async fn profile(&self) -> Profile {
        self.inner.read().await.loaded.clone()
    }

    /// Profile being edited.
    pub async fn draft(&self) -> Profile {
        self.inner.read().await.draft.clone()
    }

    /// Whether edit mode is on.
    pub async fn is_editing(&self) -> bool {
        self.inner.read().await.editing
    }

    /// Enter edit mode with a fresh copy of the loaded profile.
    pub async fn begin_edit(&self) {
        let mut inner = self.inner.write().await;
        inner.draft = inner.loaded.clone();
        inner.editing = true;
    }

    /// Leave edit mode, discarding changes.
    pub async fn cancel(&self) {
        let mut inner = self.inner.write().await;
        inner.draft = inner.loaded.clone();
        inner.editing = false;
    }

    /// Edit the draft.
    pub async fn update(&self, apply: impl FnOnce(&mut Profile) + Send) -> ViewResult<()> {
        let mut inner = self.inner.write().await;
        if inner.saving {
            return Err(ViewError::SubmitInFlight);
        }
        if !inner.editing {
            return Err(ViewError::NotEditable { phase: "viewing" });
        }
        apply(&mut inner.draft);
        Ok(())
    }

    /// Save the draft with `PUT /auth/profile`.
    pub async fn save(&self) -> ViewResult<Profile> {
        let draft = {
            let mut inner = self.inner.write().await;
            if inner.saving {
                return Err(ViewError::SubmitInFlight);
            }
            if !inner.editing {
                return Err(ViewError::NotEditable { phase: "viewing" });
            }
            if inner.draft.name.trim().is_empty() {
                return Err(ViewError::validation("name", "Name is required"));
            }
            inner.saving = true;
            inner.draft.clone()
        };

        let events = self.client.session().events();
        let result = self.client.update_profile(&draft).await;

        let mut inner = self.inner.write().await;
        inner.saving = false;
        match result {
            Ok(saved) => {
                // An empty acknowledgement decodes as a blank profile.
                let saved = if saved.email.is_empty() { draft } else { saved };
                inner.loaded = saved.clone();
                inner.draft = saved.clone();
                inner.editing = false;
                events.success("Profile updated successfully");
                Ok(saved)
            }
            Err(e) => {
                let auth_failure = e.is_auth_failure();
                let error = ViewError::Client(e);
                if !auth_failure {
                    events.error(format!("Failed to update profile: {}", error.to_user_message()));
                }
                Err(error)
            }
        }
    }
}
