//! Dashboard: catalog-wide figures and series.

use serde::Serialize;
use tokio::sync::RwLock;

use crate::client::CatalogClient;
use crate::error::{ViewError, ViewResult};
use crate::models::{AuthorStat, Overview, YearCount};

/// Everything the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Totals and top-N lists.
    pub overview: Overview,
    /// Papers per publication year, ascending.
    pub papers_per_year: Vec<YearCount>,
    /// Most prolific authors.
    pub top_authors: Vec<AuthorStat>,
}

impl Dashboard {
    /// Assemble from the three stats responses.
    ///
    /// The dedicated series and author list win over the copies embedded in
    /// the overview, unless they came back empty.
    #[must_use]
    pub fn assemble(overview: Overview, mut per_year: Vec<YearCount>, authors: Vec<AuthorStat>) -> Self {
        if per_year.is_empty() {
            per_year.clone_from(&overview.papers_per_year);
        }
        per_year.sort_by_key(|p| p.year);

        let top_authors = if authors.is_empty() { overview.top_authors.clone() } else { authors };

        Self { overview, papers_per_year: per_year, top_authors }
    }

    /// Distinct years with at least one paper.
    #[must_use]
    pub fn years_covered(&self) -> usize {
        self.papers_per_year.iter().filter(|p| p.count > 0).count()
    }
}

/// Loads and holds the dashboard.
#[derive(Debug)]
pub struct DashboardView {
    client: CatalogClient,
    current: RwLock<Option<Dashboard>>,
}

impl DashboardView {
    /// Empty view.
    #[must_use]
    pub fn new(client: CatalogClient) -> Self {
        Self { client, current: RwLock::new(None) }
    }

    /// Last loaded dashboard.
    pub async fn current(&self) -> Option<Dashboard> {
        self.current.read().await.clone()
    }

    /// Fetch all figures concurrently. On failure the previous dashboard is
    /// kept and an error notification is emitted.
    pub async fn load(&self) -> ViewResult<Dashboard> {
        let client = &self.client;
        let (core, authors) = futures::join!(
            futures::future::try_join(client.overview(), client.papers_per_year()),
            client.author_stats(),
        );

        let (overview, per_year) = match core {
            Ok(core) => core,
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard load failed");
                if !e.is_auth_failure() {
                    client.session().events().error("Failed to load dashboard data");
                }
                return Err(ViewError::Client(e));
            }
        };

        let authors = authors.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Author stats unavailable, using overview");
            Vec::new()
        });

        let dashboard = Dashboard::assemble(overview, per_year, authors);
        *self.current.write().await = Some(dashboard.clone());
        Ok(dashboard)
    }
}
