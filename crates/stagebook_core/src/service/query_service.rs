//! Read-side use-cases: listings, search and detail pages.
//!
//! # Responsibility
//! - Group venues by area, search names, and build venue/artist detail views
//!   with their shows split into past and upcoming.
//!
//! # Invariants
//! - Related rows are loaded through explicit join queries, one per view.
//! - Detail lookups of unknown ids fail with `NotFound`; they never return
//!   empty placeholder data.
//! - A single `now` classifies every show of one request.

use crate::model::artist::{Artist, ArtistId};
use crate::model::show::{format_show_date, Show, ShowId, ShowTiming};
use crate::model::venue::{Venue, VenueId};
use crate::model::EntityKind;
use crate::repo::artist_repo::{ArtistRepository, SqliteArtistRepository};
use crate::repo::show_repo::{Booking, ShowListing, ShowRepository, SqliteShowRepository};
use crate::repo::venue_repo::{SqliteVenueRepository, VenueRepository};
use crate::repo::{NameMatch, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

/// Id and display name of a venue or artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: i64,
    pub name: String,
}

/// Venues sharing one `(city, state)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

/// Name search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<NameMatch>,
}

/// A show on a venue page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistAppearance {
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    /// `MM/DD/YYYY`.
    pub start_time: String,
}

/// A show on an artist page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueAppearance {
    pub venue_id: VenueId,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    /// `MM/DD/YYYY`.
    pub start_time: String,
}

/// Venue page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    pub past_shows: Vec<ArtistAppearance>,
    pub upcoming_shows: Vec<ArtistAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Artist page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    pub past_shows: Vec<VenueAppearance>,
    pub upcoming_shows: Vec<VenueAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Read-only service over venue, artist and show repositories.
pub struct QueryService<V: VenueRepository, A: ArtistRepository, S: ShowRepository> {
    venues: V,
    artists: A,
    shows: S,
}

/// Query service bound to one SQLite connection.
pub type SqliteQueryService<'conn> = QueryService<
    SqliteVenueRepository<'conn>,
    SqliteArtistRepository<'conn>,
    SqliteShowRepository<'conn>,
>;

impl<'conn> SqliteQueryService<'conn> {
    /// Builds a query service after verifying the connection is migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(QueryService::new(
            SqliteVenueRepository::try_new(conn)?,
            SqliteArtistRepository::try_new(conn)?,
            SqliteShowRepository::try_new(conn)?,
        ))
    }
}

impl<V: VenueRepository, A: ArtistRepository, S: ShowRepository> QueryService<V, A, S> {
    pub fn new(venues: V, artists: A, shows: S) -> Self {
        Self {
            venues,
            artists,
            shows,
        }
    }

    /// Distinct `(city, state)` areas, each with its venues.
    ///
    /// Ordered by city, state, then venue name and id.
    pub fn venue_areas(&self) -> RepoResult<Vec<VenueArea>> {
        let mut areas: Vec<VenueArea> = Vec::new();
        for venue in self.venues.list_venues()? {
            let summary = EntitySummary {
                id: venue.id,
                name: venue.profile.name,
            };
            match areas.last_mut() {
                Some(area)
                    if area.city == venue.profile.city && area.state == venue.profile.state =>
                {
                    area.venues.push(summary);
                }
                _ => areas.push(VenueArea {
                    city: venue.profile.city,
                    state: venue.profile.state,
                    venues: vec![summary],
                }),
            }
        }
        Ok(areas)
    }

    /// Case-insensitive substring search over venue names.
    ///
    /// An empty term matches every venue.
    pub fn search_venues(&self, term: &str, now: DateTime<Utc>) -> RepoResult<SearchResults> {
        let data = self.venues.search_venues(term, now)?;
        Ok(SearchResults {
            count: data.len(),
            data,
        })
    }

    /// Case-insensitive substring search over artist names.
    pub fn search_artists(&self, term: &str, now: DateTime<Utc>) -> RepoResult<SearchResults> {
        let data = self.artists.search_artists(term, now)?;
        Ok(SearchResults {
            count: data.len(),
            data,
        })
    }

    pub fn venue(&self, id: VenueId) -> RepoResult<Venue> {
        self.venues
            .get_venue(id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Venue, id))
    }

    pub fn artist(&self, id: ArtistId) -> RepoResult<Artist> {
        self.artists
            .get_artist(id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Artist, id))
    }

    pub fn show(&self, id: ShowId) -> RepoResult<Show> {
        self.shows
            .get_show(id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Show, id))
    }

    /// Venue page with its shows split around `now`.
    pub fn venue_detail(&self, id: VenueId, now: DateTime<Utc>) -> RepoResult<VenueDetail> {
        let venue = self.venue(id)?;
        let bookings = self.shows.list_venue_bookings(id)?;
        let (past_shows, upcoming_shows) = split_bookings(bookings, now, |booking| {
            ArtistAppearance {
                artist_id: booking.partner_id,
                artist_name: booking.partner_name,
                artist_image_link: booking.partner_image_link,
                start_time: format_show_date(booking.start_time),
            }
        });

        Ok(VenueDetail {
            venue,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        })
    }

    /// Artist page with its shows split around `now`.
    pub fn artist_detail(&self, id: ArtistId, now: DateTime<Utc>) -> RepoResult<ArtistDetail> {
        let artist = self.artist(id)?;
        let bookings = self.shows.list_artist_bookings(id)?;
        let (past_shows, upcoming_shows) = split_bookings(bookings, now, |booking| {
            VenueAppearance {
                venue_id: booking.partner_id,
                venue_name: booking.partner_name,
                venue_image_link: booking.partner_image_link,
                start_time: format_show_date(booking.start_time),
            }
        });

        Ok(ArtistDetail {
            artist,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        })
    }

    /// Every show ordered by start time, then id.
    pub fn list_shows(&self) -> RepoResult<Vec<ShowListing>> {
        self.shows.list_show_listings()
    }

    /// Every artist as `(id, name)`, ordered by name, then id.
    pub fn list_artists(&self) -> RepoResult<Vec<EntitySummary>> {
        Ok(self
            .artists
            .list_artists()?
            .into_iter()
            .map(|artist| EntitySummary {
                id: artist.id,
                name: artist.profile.name,
            })
            .collect())
    }
}

fn split_bookings<T>(
    bookings: Vec<Booking>,
    now: DateTime<Utc>,
    to_entry: impl Fn(Booking) -> T,
) -> (Vec<T>, Vec<T>) {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for booking in bookings {
        match ShowTiming::classify(booking.start_time, now) {
            ShowTiming::Past => past.push(to_entry(booking)),
            ShowTiming::Upcoming => upcoming.push(to_entry(booking)),
        }
    }
    (past, upcoming)
}
