//! Venue repository contract and SQLite implementation.
//!
//! # Invariants
//! - Venue listing is ordered by `city, state, name, id` so area grouping
//!   can be done in one pass.
//! - Deleting a venue that still has shows is a constraint violation; the
//!   cascade is the mutation layer's job.

use crate::model::show::to_epoch_ms;
use crate::model::venue::{Venue, VenueId, VenueProfile};
use crate::model::EntityKind;
use crate::repo::{
    bool_to_int, decode_genres, encode_genres, ensure_connection_ready, int_to_bool,
    substring_pattern, NameMatch, RepoError, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

const VENUE_SELECT_SQL: &str = "SELECT
    id,
    name,
    genres,
    address,
    city,
    state,
    phone,
    website,
    facebook_link,
    seeking_talent,
    seeking_description,
    image_link
FROM venues";

/// Repository interface for venue rows.
pub trait VenueRepository {
    fn create_venue(&self, profile: &VenueProfile) -> RepoResult<VenueId>;
    fn get_venue(&self, id: VenueId) -> RepoResult<Option<Venue>>;
    /// All venues ordered by `city, state, name, id`.
    fn list_venues(&self) -> RepoResult<Vec<Venue>>;
    /// Replaces every attribute of an existing venue.
    fn update_venue(&self, id: VenueId, profile: &VenueProfile) -> RepoResult<()>;
    fn delete_venue(&self, id: VenueId) -> RepoResult<()>;
    /// Case-insensitive literal substring search over names.
    fn search_venues(&self, term: &str, now: DateTime<Utc>) -> RepoResult<Vec<NameMatch>>;
}

/// SQLite-backed venue repository.
pub struct SqliteVenueRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVenueRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["venues", "shows"])?;
        Ok(Self { conn })
    }

    /// Skips readiness checks; used inside already-verified transactions.
    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl VenueRepository for SqliteVenueRepository<'_> {
    fn create_venue(&self, profile: &VenueProfile) -> RepoResult<VenueId> {
        profile.validate()?;

        self.conn.execute(
            "INSERT INTO venues (
                name,
                genres,
                address,
                city,
                state,
                phone,
                website,
                facebook_link,
                seeking_talent,
                seeking_description,
                image_link
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                profile.name.as_str(),
                encode_genres(&profile.genres)?,
                profile.address.as_str(),
                profile.city.as_str(),
                profile.state.as_str(),
                profile.phone.as_deref(),
                profile.website.as_deref(),
                profile.facebook_link.as_deref(),
                bool_to_int(profile.seeking_talent),
                profile.seeking_description.as_deref(),
                profile.image_link.as_deref(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_venue(&self, id: VenueId) -> RepoResult<Option<Venue>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VENUE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_venue_row(row)?));
        }
        Ok(None)
    }

    fn list_venues(&self) -> RepoResult<Vec<Venue>> {
        let mut stmt = self.conn.prepare(&format!(
            "{VENUE_SELECT_SQL} ORDER BY city ASC, state ASC, name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut venues = Vec::new();
        while let Some(row) = rows.next()? {
            venues.push(parse_venue_row(row)?);
        }
        Ok(venues)
    }

    fn update_venue(&self, id: VenueId, profile: &VenueProfile) -> RepoResult<()> {
        profile.validate()?;

        let changed = self.conn.execute(
            "UPDATE venues
             SET
                name = ?1,
                genres = ?2,
                address = ?3,
                city = ?4,
                state = ?5,
                phone = ?6,
                website = ?7,
                facebook_link = ?8,
                seeking_talent = ?9,
                seeking_description = ?10,
                image_link = ?11
             WHERE id = ?12;",
            params![
                profile.name.as_str(),
                encode_genres(&profile.genres)?,
                profile.address.as_str(),
                profile.city.as_str(),
                profile.state.as_str(),
                profile.phone.as_deref(),
                profile.website.as_deref(),
                profile.facebook_link.as_deref(),
                bool_to_int(profile.seeking_talent),
                profile.seeking_description.as_deref(),
                profile.image_link.as_deref(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Venue, id));
        }
        Ok(())
    }

    fn delete_venue(&self, id: VenueId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM venues WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Venue, id));
        }
        Ok(())
    }

    fn search_venues(&self, term: &str, now: DateTime<Utc>) -> RepoResult<Vec<NameMatch>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                v.id AS id,
                v.name AS name,
                (
                    SELECT COUNT(*)
                    FROM shows s
                    WHERE s.venue_id = v.id
                      AND s.start_time > ?2
                ) AS num_upcoming_shows
             FROM venues v
             WHERE fold_case(v.name) LIKE ?1 ESCAPE '\\'
             ORDER BY v.name COLLATE NOCASE ASC, v.id ASC;",
        )?;
        let mut rows = stmt.query(params![substring_pattern(term), to_epoch_ms(now)])?;
        let mut matches = Vec::new();
        while let Some(row) = rows.next()? {
            matches.push(NameMatch {
                id: row.get("id")?,
                name: row.get("name")?,
                num_upcoming_shows: row.get("num_upcoming_shows")?,
            });
        }
        Ok(matches)
    }
}

fn parse_venue_row(row: &Row<'_>) -> RepoResult<Venue> {
    let genres_text: String = row.get("genres")?;
    let profile = VenueProfile {
        name: row.get("name")?,
        genres: decode_genres("venues", &genres_text)?,
        address: row.get("address")?,
        city: row.get("city")?,
        state: row.get("state")?,
        phone: row.get("phone")?,
        website: row.get("website")?,
        facebook_link: row.get("facebook_link")?,
        seeking_talent: int_to_bool("venues", "seeking_talent", row.get("seeking_talent")?)?,
        seeking_description: row.get("seeking_description")?,
        image_link: row.get("image_link")?,
    };
    Ok(Venue {
        id: row.get("id")?,
        profile,
    })
}
