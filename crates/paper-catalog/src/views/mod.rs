//! Screens that are not list views.

mod dashboard;
mod paper_details;
mod profile;

pub use dashboard::{Dashboard, DashboardView};
pub use paper_details::PaperDetailsView;
pub use profile::ProfileEditor;
