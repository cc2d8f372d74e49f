//! Single paper page.

use tokio::sync::RwLock;

use crate::client::CatalogClient;
use crate::error::{ViewError, ViewResult};
use crate::events::ListKind;
use crate::models::Paper;
use crate::routes::Route;

/// `/papers/:id`.
#[derive(Debug)]
pub struct PaperDetailsView {
    client: CatalogClient,
    paper_id: String,
    paper: RwLock<Option<Paper>>,
}

impl PaperDetailsView {
    /// View for one paper; call [`Self::load`] to fetch it.
    #[must_use]
    pub fn new(client: CatalogClient, paper_id: impl Into<String>) -> Self {
        Self { client, paper_id: paper_id.into(), paper: RwLock::new(None) }
    }

    /// Paper id.
    #[must_use]
    pub fn paper_id(&self) -> &str {
        &self.paper_id
    }

    /// Loaded paper.
    pub async fn paper(&self) -> Option<Paper> {
        self.paper.read().await.clone()
    }

    /// Route of the edit form.
    #[must_use]
    pub fn edit_route(&self) -> Route {
        Route::EditPaper(self.paper_id.clone())
    }

    /// Fetch the paper.
    pub async fn load(&self) -> ViewResult<Paper> {
        match self.client.get_paper(&self.paper_id).await {
            Ok(paper) => {
                *self.paper.write().await = Some(paper.clone());
                Ok(paper)
            }
            Err(e) => {
                if !e.is_auth_failure() {
                    self.client.session().events().error("Failed to load paper details");
                }
                Err(ViewError::Client(e))
            }
        }
    }

    /// Delete the paper and go back to the list.
    pub async fn delete(&self) -> ViewResult<()> {
        let events = self.client.session().events();
        match self.client.delete_paper(&self.paper_id).await {
            Ok(()) => {
                tracing::info!(paper_id = %self.paper_id, "Deleted paper");
                *self.paper.write().await = None;
                events.success("Paper deleted successfully");
                events.navigate(Route::Papers);
                events.invalidate(ListKind::Papers);
                Ok(())
            }
            Err(e) => {
                let auth_failure = e.is_auth_failure();
                let error = ViewError::Client(e);
                if !auth_failure {
                    events.error(format!("Failed to delete paper: {}", error.to_user_message()));
                }
                Err(error)
            }
        }
    }
}
