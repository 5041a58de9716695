//! Booking directory domain model.
//!
//! # Responsibility
//! - Define venue, artist and show records plus their validated profiles.
//! - Classify shows as past or upcoming relative to a caller-supplied `now`.
//!
//! # Invariants
//! - Ids are assigned by the store on creation and never reused.
//! - Past/upcoming is derived on every read, never persisted.

use serde::Serialize;
use std::fmt::{Display, Formatter};

pub mod artist;
pub mod show;
pub mod validation;
pub mod venue;

/// Entity families stored in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Venue,
    Artist,
    Show,
}

impl EntityKind {
    /// User-facing label, also used as the message prefix in outcomes.
    pub fn label(self) -> &'static str {
        match self {
            Self::Venue => "Venue",
            Self::Artist => "Artist",
            Self::Show => "Show",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
