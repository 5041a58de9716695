//! Show records and past/upcoming classification.
//!
//! # Invariants
//! - A show is past iff `start_time < now`; otherwise it is upcoming.
//! - Start times are stored as UTC epoch milliseconds.

use crate::model::artist::ArtistId;
use crate::model::venue::VenueId;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned show identifier.
pub type ShowId = i64;

/// Display format for show dates on venue/artist pages.
pub const SHOW_DATE_FORMAT: &str = "%m/%d/%Y";

/// Validated input for booking an artist at a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShow {
    pub venue_id: VenueId,
    pub artist_id: ArtistId,
    pub start_time: DateTime<Utc>,
}

/// A persisted show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: ShowId,
    pub venue_id: VenueId,
    pub artist_id: ArtistId,
    pub start_time: DateTime<Utc>,
}

impl Show {
    pub fn timing(&self, now: DateTime<Utc>) -> ShowTiming {
        ShowTiming::classify(self.start_time, now)
    }
}

/// Where a show sits relative to the moment a request was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowTiming {
    Past,
    Upcoming,
}

impl ShowTiming {
    pub fn classify(start_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if start_time < now {
            Self::Past
        } else {
            Self::Upcoming
        }
    }
}

/// Formats a start time as `MM/DD/YYYY`.
pub fn format_show_date(start_time: DateTime<Utc>) -> String {
    start_time.format(SHOW_DATE_FORMAT).to_string()
}

pub(crate) fn to_epoch_ms(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn from_epoch_ms(value: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value).single()
}
