//! Show repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist shows with referential checks against venues and artists.
//! - Provide explicit join queries for venue/artist pages and the show list.
//!
//! # Invariants
//! - Inserts whose venue or artist does not resolve fail with
//!   `ConstraintViolation` and persist nothing.
//! - Join queries never skip a show whose counterpart is missing; they fail
//!   with `NotFound` for that counterpart instead.
//! - Every show listing is ordered by `start_time ASC, id ASC`.

use crate::model::artist::ArtistId;
use crate::model::show::{from_epoch_ms, to_epoch_ms, NewShow, Show, ShowId};
use crate::model::venue::VenueId;
use crate::model::EntityKind;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

const SHOW_SELECT_SQL: &str = "SELECT id, venue_id, artist_id, start_time FROM shows";

/// A show seen from one side: the partner is the artist on a venue page,
/// or the venue on an artist page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub show_id: ShowId,
    pub partner_id: i64,
    pub partner_name: String,
    pub partner_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
}

/// A show joined with the names needed by the show list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub show_id: ShowId,
    pub venue_id: VenueId,
    pub venue_name: String,
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    /// Serialized as RFC 3339, UTC.
    pub start_time: DateTime<Utc>,
}

/// Repository interface for show rows.
pub trait ShowRepository {
    fn create_show(&self, show: &NewShow) -> RepoResult<ShowId>;
    fn get_show(&self, id: ShowId) -> RepoResult<Option<Show>>;
    fn list_shows(&self) -> RepoResult<Vec<Show>>;
    fn update_show(&self, id: ShowId, show: &NewShow) -> RepoResult<()>;
    fn delete_show(&self, id: ShowId) -> RepoResult<()>;
    /// Removes every show booked at `venue_id`; returns the removed count.
    fn delete_shows_for_venue(&self, venue_id: VenueId) -> RepoResult<usize>;
    /// Shows at a venue joined with their artists.
    fn list_venue_bookings(&self, venue_id: VenueId) -> RepoResult<Vec<Booking>>;
    /// Shows of an artist joined with their venues.
    fn list_artist_bookings(&self, artist_id: ArtistId) -> RepoResult<Vec<Booking>>;
    /// Every show joined with artist and venue names.
    fn list_show_listings(&self) -> RepoResult<Vec<ShowListing>>;
}

/// SQLite-backed show repository.
pub struct SqliteShowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShowRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["venues", "artists", "shows"])?;
        Ok(Self { conn })
    }

    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_parents_exist(&self, show: &NewShow) -> RepoResult<()> {
        if !row_exists(self.conn, "venues", show.venue_id)? {
            return Err(RepoError::ConstraintViolation(format!(
                "show references missing venue {}",
                show.venue_id
            )));
        }
        if !row_exists(self.conn, "artists", show.artist_id)? {
            return Err(RepoError::ConstraintViolation(format!(
                "show references missing artist {}",
                show.artist_id
            )));
        }
        Ok(())
    }
}

impl ShowRepository for SqliteShowRepository<'_> {
    fn create_show(&self, show: &NewShow) -> RepoResult<ShowId> {
        self.ensure_parents_exist(show)?;

        self.conn.execute(
            "INSERT INTO shows (venue_id, artist_id, start_time) VALUES (?1, ?2, ?3);",
            params![show.venue_id, show.artist_id, to_epoch_ms(show.start_time)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_show(&self, id: ShowId) -> RepoResult<Option<Show>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SHOW_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_show_row(row)?));
        }
        Ok(None)
    }

    fn list_shows(&self) -> RepoResult<Vec<Show>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SHOW_SELECT_SQL} ORDER BY start_time ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut shows = Vec::new();
        while let Some(row) = rows.next()? {
            shows.push(parse_show_row(row)?);
        }
        Ok(shows)
    }

    fn update_show(&self, id: ShowId, show: &NewShow) -> RepoResult<()> {
        self.ensure_parents_exist(show)?;

        let changed = self.conn.execute(
            "UPDATE shows
             SET venue_id = ?1, artist_id = ?2, start_time = ?3
             WHERE id = ?4;",
            params![
                show.venue_id,
                show.artist_id,
                to_epoch_ms(show.start_time),
                id
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Show, id));
        }
        Ok(())
    }

    fn delete_show(&self, id: ShowId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM shows WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Show, id));
        }
        Ok(())
    }

    fn delete_shows_for_venue(&self, venue_id: VenueId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM shows WHERE venue_id = ?1;", [venue_id])?;
        Ok(removed)
    }

    fn list_venue_bookings(&self, venue_id: VenueId) -> RepoResult<Vec<Booking>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                s.id AS show_id,
                s.artist_id AS partner_id,
                a.name AS partner_name,
                a.image_link AS partner_image_link,
                s.start_time AS start_time
             FROM shows s
             LEFT JOIN artists a ON a.id = s.artist_id
             WHERE s.venue_id = ?1
             ORDER BY s.start_time ASC, s.id ASC;",
        )?;
        let mut rows = stmt.query([venue_id])?;
        let mut bookings = Vec::new();
        while let Some(row) = rows.next()? {
            bookings.push(parse_booking_row(row, EntityKind::Artist)?);
        }
        Ok(bookings)
    }

    fn list_artist_bookings(&self, artist_id: ArtistId) -> RepoResult<Vec<Booking>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                s.id AS show_id,
                s.venue_id AS partner_id,
                v.name AS partner_name,
                v.image_link AS partner_image_link,
                s.start_time AS start_time
             FROM shows s
             LEFT JOIN venues v ON v.id = s.venue_id
             WHERE s.artist_id = ?1
             ORDER BY s.start_time ASC, s.id ASC;",
        )?;
        let mut rows = stmt.query([artist_id])?;
        let mut bookings = Vec::new();
        while let Some(row) = rows.next()? {
            bookings.push(parse_booking_row(row, EntityKind::Venue)?);
        }
        Ok(bookings)
    }

    fn list_show_listings(&self) -> RepoResult<Vec<ShowListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                s.id AS show_id,
                s.venue_id AS venue_id,
                v.name AS venue_name,
                s.artist_id AS artist_id,
                a.name AS artist_name,
                a.image_link AS artist_image_link,
                s.start_time AS start_time
             FROM shows s
             LEFT JOIN venues v ON v.id = s.venue_id
             LEFT JOIN artists a ON a.id = s.artist_id
             ORDER BY s.start_time ASC, s.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut listings = Vec::new();
        while let Some(row) = rows.next()? {
            let venue_id: VenueId = row.get("venue_id")?;
            let artist_id: ArtistId = row.get("artist_id")?;
            let venue_name: Option<String> = row.get("venue_name")?;
            let artist_name: Option<String> = row.get("artist_name")?;
            listings.push(ShowListing {
                show_id: row.get("show_id")?,
                venue_id,
                venue_name: venue_name
                    .ok_or_else(|| RepoError::not_found(EntityKind::Venue, venue_id))?,
                artist_id,
                artist_name: artist_name
                    .ok_or_else(|| RepoError::not_found(EntityKind::Artist, artist_id))?,
                artist_image_link: row.get("artist_image_link")?,
                start_time: parse_start_time(row.get("start_time")?)?,
            });
        }
        Ok(listings)
    }
}

fn parse_show_row(row: &Row<'_>) -> RepoResult<Show> {
    Ok(Show {
        id: row.get("id")?,
        venue_id: row.get("venue_id")?,
        artist_id: row.get("artist_id")?,
        start_time: parse_start_time(row.get("start_time")?)?,
    })
}

fn parse_booking_row(row: &Row<'_>, partner: EntityKind) -> RepoResult<Booking> {
    let partner_id: i64 = row.get("partner_id")?;
    let partner_name: Option<String> = row.get("partner_name")?;
    let Some(partner_name) = partner_name else {
        return Err(RepoError::not_found(partner, partner_id));
    };

    Ok(Booking {
        show_id: row.get("show_id")?,
        partner_id,
        partner_name,
        partner_image_link: row.get("partner_image_link")?,
        start_time: parse_start_time(row.get("start_time")?)?,
    })
}

fn parse_start_time(millis: i64) -> RepoResult<DateTime<Utc>> {
    from_epoch_ms(millis).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid start_time `{millis}` in shows.start_time"))
    })
}

fn row_exists(conn: &Connection, table: &'static str, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
