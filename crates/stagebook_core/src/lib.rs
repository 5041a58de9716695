//! Core domain logic for Stagebook, a venue / artist / show directory.
//! Persistence, validation and use-cases live here; transports stay thin.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use form::{ArtistForm, FormFields, ShowForm, VenueForm};
pub use logging::{default_log_level, init_logging, logging_status, LogSink, LoggingError};
pub use model::artist::{Artist, ArtistId, ArtistProfile};
pub use model::show::{NewShow, Show, ShowId, ShowTiming};
pub use model::validation::ValidationError;
pub use model::venue::{Venue, VenueId, VenueProfile};
pub use model::EntityKind;
pub use repo::{NameMatch, RepoError, RepoResult};
pub use service::mutation_service::{MutationService, VenueRemoval};
pub use service::outcome::{Action, FailureReason, Outcome};
pub use service::query_service::{
    ArtistDetail, EntitySummary, QueryService, SearchResults, SqliteQueryService, VenueArea,
    VenueDetail,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
