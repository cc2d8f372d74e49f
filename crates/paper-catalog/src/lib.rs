//! Paper Catalog client
//!
//! Client core for a research-paper catalog backend: browse and search papers,
//! authors and journals, create and edit records, and manage a signed-in
//! session.
//!
//! # Features
//!
//! - **List views**: one coordinator per view; browse vs search, paging, and
//!   only the newest response is committed
//! - **Forms**: local drafts with validation and an explicit submit lifecycle
//! - **Session**: persisted bearer token, torn down on any 401
//! - **Events**: navigation and notifications go out on a broadcast bus
//!
//! # Example
//!
//! ```no_run
//! use paper_catalog::{CatalogClient, Config, EventBus, SessionContext};
//! use paper_catalog::query::PapersSource;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let session = SessionContext::in_memory(EventBus::default());
//!     let client = CatalogClient::new(&config, session)?;
//!
//!     let papers = PapersSource::view(client);
//!     papers.refresh().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod formatters;
pub mod forms;
pub mod models;
pub mod query;
pub mod routes;
pub mod session;
pub mod views;

pub use auth::AuthService;
pub use client::CatalogClient;
pub use config::Config;
pub use error::{ClientError, ViewError};
pub use events::{EventBus, UiEvent};
pub use routes::Route;
pub use session::{FileSessionStore, Session, SessionContext, SessionStore};
