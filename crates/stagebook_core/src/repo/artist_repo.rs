//! Artist repository contract and SQLite implementation.

use crate::model::artist::{Artist, ArtistId, ArtistProfile};
use crate::model::show::to_epoch_ms;
use crate::model::EntityKind;
use crate::repo::{
    bool_to_int, decode_genres, encode_genres, ensure_connection_ready, int_to_bool,
    substring_pattern, NameMatch, RepoError, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

const ARTIST_SELECT_SQL: &str = "SELECT
    id,
    name,
    genres,
    city,
    state,
    phone,
    website,
    facebook_link,
    seeking_venue,
    seeking_description,
    image_link
FROM artists";

/// Repository interface for artist rows.
pub trait ArtistRepository {
    fn create_artist(&self, profile: &ArtistProfile) -> RepoResult<ArtistId>;
    fn get_artist(&self, id: ArtistId) -> RepoResult<Option<Artist>>;
    /// All artists ordered by `name, id`.
    fn list_artists(&self) -> RepoResult<Vec<Artist>>;
    fn update_artist(&self, id: ArtistId, profile: &ArtistProfile) -> RepoResult<()>;
    /// Fails with `ConstraintViolation` while shows still reference the artist.
    fn delete_artist(&self, id: ArtistId) -> RepoResult<()>;
    fn search_artists(&self, term: &str, now: DateTime<Utc>) -> RepoResult<Vec<NameMatch>>;
}

/// SQLite-backed artist repository.
pub struct SqliteArtistRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArtistRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["artists", "shows"])?;
        Ok(Self { conn })
    }

    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ArtistRepository for SqliteArtistRepository<'_> {
    fn create_artist(&self, profile: &ArtistProfile) -> RepoResult<ArtistId> {
        profile.validate()?;

        self.conn.execute(
            "INSERT INTO artists (
                name,
                genres,
                city,
                state,
                phone,
                website,
                facebook_link,
                seeking_venue,
                seeking_description,
                image_link
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                profile.name.as_str(),
                encode_genres(&profile.genres)?,
                profile.city.as_str(),
                profile.state.as_str(),
                profile.phone.as_deref(),
                profile.website.as_deref(),
                profile.facebook_link.as_deref(),
                bool_to_int(profile.seeking_venue),
                profile.seeking_description.as_deref(),
                profile.image_link.as_deref(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_artist(&self, id: ArtistId) -> RepoResult<Option<Artist>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTIST_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_artist_row(row)?));
        }
        Ok(None)
    }

    fn list_artists(&self) -> RepoResult<Vec<Artist>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ARTIST_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut artists = Vec::new();
        while let Some(row) = rows.next()? {
            artists.push(parse_artist_row(row)?);
        }
        Ok(artists)
    }

    fn update_artist(&self, id: ArtistId, profile: &ArtistProfile) -> RepoResult<()> {
        profile.validate()?;

        let changed = self.conn.execute(
            "UPDATE artists
             SET
                name = ?1,
                genres = ?2,
                city = ?3,
                state = ?4,
                phone = ?5,
                website = ?6,
                facebook_link = ?7,
                seeking_venue = ?8,
                seeking_description = ?9,
                image_link = ?10
             WHERE id = ?11;",
            params![
                profile.name.as_str(),
                encode_genres(&profile.genres)?,
                profile.city.as_str(),
                profile.state.as_str(),
                profile.phone.as_deref(),
                profile.website.as_deref(),
                profile.facebook_link.as_deref(),
                bool_to_int(profile.seeking_venue),
                profile.seeking_description.as_deref(),
                profile.image_link.as_deref(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Artist, id));
        }
        Ok(())
    }

    fn delete_artist(&self, id: ArtistId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM artists WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Artist, id));
        }
        Ok(())
    }

    fn search_artists(&self, term: &str, now: DateTime<Utc>) -> RepoResult<Vec<NameMatch>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id AS id,
                a.name AS name,
                (
                    SELECT COUNT(*)
                    FROM shows s
                    WHERE s.artist_id = a.id
                      AND s.start_time > ?2
                ) AS num_upcoming_shows
             FROM artists a
             WHERE fold_case(a.name) LIKE ?1 ESCAPE '\\'
             ORDER BY a.name COLLATE NOCASE ASC, a.id ASC;",
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

fn parse_artist_row(row: &Row<'_>) -> RepoResult<Artist> {
    let genres_text: String = row.get("genres")?;
    let profile = ArtistProfile {
        name: row.get("name")?,
        genres: decode_genres("artists", &genres_text)?,
        city: row.get("city")?,
        state: row.get("state")?,
        phone: row.get("phone")?,
        website: row.get("website")?,
        facebook_link: row.get("facebook_link")?,
        seeking_venue: int_to_bool("artists", "seeking_venue", row.get("seeking_venue")?)?,
        seeking_description: row.get("seeking_description")?,
        image_link: row.get("image_link")?,
    };
    Ok(Artist {
        id: row.get("id")?,
        profile,
    })
}
