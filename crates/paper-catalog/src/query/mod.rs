//! List view querying: state, request construction, pagination and the
//! coordinator that keeps only the newest response.

mod coordinator;
mod debounce;
mod pagination;
mod request;
mod sources;
mod state;

pub use coordinator::{
    DeletableSource, ListSource, ListView, QueryCoordinator, RefreshOutcome, ViewStatus,
};
pub use debounce::Debouncer;
pub use pagination::{PageControls, clamp_page, page_window};
pub use request::{BrowseRequest, Retrieval, SearchRequest};
pub use sources::{
    AuthorsSource, AuthorsView, JournalsSource, JournalsView, PapersSource, PapersView,
    sort_journals,
};
pub use state::{FilterName, QueryState};
