//! Data models for catalog backend entities.
//!
//! Backend records use snake_case keys. Entities that the backend has served
//! under more than one key name over time (`_id` vs `paper_id`, `author` vs
//! `name`) are read through a raw intermediate and normalized on the way in.

mod auth;
mod author;
mod de;
mod enums;
mod page;
mod paper;
mod stats;

pub use auth::{LoginRequest, LoginResponse, MessageResponse, Profile, RegisterRequest};
pub use author::{Author, AuthorInput};
pub use enums::{AuthorSort, JournalSort, PaperSort, ResponseFormat, SortOrder};
pub use page::{AuthorListResponse, Pagination, PaperBrowseResponse, PaperSearchResponse, ResultPage};
pub use paper::{Paper, PaperEnvelope, PaperInput};
pub use stats::{AuthorStat, JournalStat, Overview, TopJournal, YearCount};
