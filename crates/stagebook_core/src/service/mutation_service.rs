//! Write-side use-cases for venues, artists and shows.
//!
//! # Responsibility
//! - Turn submitted forms into validated profiles and persist them.
//! - Run every write inside one immediate transaction on the caller's
//!   connection, and read the stored record back.
//! - Cascade venue deletion to the venue's shows.
//! - Rebook or cancel individual shows.
//!
//! # Invariants
//! - Validation runs before a transaction is opened.
//! - A failed mutation leaves no partial writes; the transaction rolls back
//!   when dropped without commit.
//! - Log lines carry entity ids and error codes only, never form content.

use crate::form::{ArtistForm, ShowForm, VenueForm};
use crate::model::artist::{Artist, ArtistId};
use crate::model::show::{Show, ShowId};
use crate::model::venue::{Venue, VenueId};
use crate::model::EntityKind;
use crate::repo::artist_repo::{ArtistRepository, SqliteArtistRepository};
use crate::repo::show_repo::{ShowRepository, SqliteShowRepository};
use crate::repo::venue_repo::{SqliteVenueRepository, VenueRepository};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::{error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// A deleted venue together with the number of shows removed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueRemoval {
    pub venue: Venue,
    pub removed_shows: usize,
}

/// Transactional mutation service bound to one connection.
pub struct MutationService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> MutationService<'conn> {
    /// Builds a mutation service after verifying the connection is migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["venues", "artists", "shows"])?;
        Ok(Self { conn })
    }

    pub fn create_venue(&self, form: VenueForm) -> RepoResult<Venue> {
        logged("venue_create", None, || {
            let profile = form.into_profile()?;
            self.in_transaction(|tx| {
                let venues = SqliteVenueRepository::new_unchecked(tx);
                let id = venues.create_venue(&profile)?;
                read_back(EntityKind::Venue, id, venues.get_venue(id)?)
            })
        })
    }

    /// Replaces every attribute of venue `id`.
    pub fn update_venue(&self, id: VenueId, form: VenueForm) -> RepoResult<Venue> {
        logged("venue_update", Some(id), || {
            let profile = form.into_profile()?;
            self.in_transaction(|tx| {
                let venues = SqliteVenueRepository::new_unchecked(tx);
                venues.update_venue(id, &profile)?;
                read_back(EntityKind::Venue, id, venues.get_venue(id)?)
            })
        })
    }

    /// Deletes venue `id` and every show booked there, atomically.
    pub fn delete_venue(&self, id: VenueId) -> RepoResult<VenueRemoval> {
        logged("venue_delete", Some(id), || {
            self.in_transaction(|tx| {
                let venues = SqliteVenueRepository::new_unchecked(tx);
                let shows = SqliteShowRepository::new_unchecked(tx);
                let venue = venues
                    .get_venue(id)?
                    .ok_or_else(|| RepoError::not_found(EntityKind::Venue, id))?;
                let removed_shows = shows.delete_shows_for_venue(id)?;
                venues.delete_venue(id)?;
                Ok(VenueRemoval {
                    venue,
                    removed_shows,
                })
            })
        })
    }

    pub fn create_artist(&self, form: ArtistForm) -> RepoResult<Artist> {
        logged("artist_create", None, || {
            let profile = form.into_profile()?;
            self.in_transaction(|tx| {
                let artists = SqliteArtistRepository::new_unchecked(tx);
                let id = artists.create_artist(&profile)?;
                read_back(EntityKind::Artist, id, artists.get_artist(id)?)
            })
        })
    }

    /// Replaces every attribute of artist `id`.
    pub fn update_artist(&self, id: ArtistId, form: ArtistForm) -> RepoResult<Artist> {
        logged("artist_update", Some(id), || {
            let profile = form.into_profile()?;
            self.in_transaction(|tx| {
                let artists = SqliteArtistRepository::new_unchecked(tx);
                artists.update_artist(id, &profile)?;
                read_back(EntityKind::Artist, id, artists.get_artist(id)?)
            })
        })
    }

    /// Deletes artist `id`. Refused with `ConstraintViolation` while any
    /// show still references the artist.
    pub fn delete_artist(&self, id: ArtistId) -> RepoResult<Artist> {
        logged("artist_delete", Some(id), || {
            self.in_transaction(|tx| {
                let artists = SqliteArtistRepository::new_unchecked(tx);
                let artist = artists
                    .get_artist(id)?
                    .ok_or_else(|| RepoError::not_found(EntityKind::Artist, id))?;
                artists.delete_artist(id)?;
                Ok(artist)
            })
        })
    }

    /// Books a show. Unknown venue or artist ids fail with
    /// `ConstraintViolation`.
    pub fn create_show(&self, form: ShowForm) -> RepoResult<Show> {
        logged("show_create", None, || {
            let new_show = form.into_new_show()?;
            self.in_transaction(|tx| {
                let shows = SqliteShowRepository::new_unchecked(tx);
                let id: ShowId = shows.create_show(&new_show)?;
                read_back(EntityKind::Show, id, shows.get_show(id)?)
            })
        })
    }

    /// Replaces venue, artist and start time of show `id`.
    pub fn update_show(&self, id: ShowId, form: ShowForm) -> RepoResult<Show> {
        logged("show_update", Some(id), || {
            let new_show = form.into_new_show()?;
            self.in_transaction(|tx| {
                let shows = SqliteShowRepository::new_unchecked(tx);
                shows.update_show(id, &new_show)?;
                read_back(EntityKind::Show, id, shows.get_show(id)?)
            })
        })
    }

    pub fn delete_show(&self, id: ShowId) -> RepoResult<Show> {
        logged("show_delete", Some(id), || {
            self.in_transaction(|tx| {
                let shows = SqliteShowRepository::new_unchecked(tx);
                let show = shows
                    .get_show(id)?
                    .ok_or_else(|| RepoError::not_found(EntityKind::Show, id))?;
                shows.delete_show(id)?;
                Ok(show)
            })
        })
    }

    fn in_transaction<T>(
        &self,
        op: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn read_back<T>(entity: EntityKind, id: i64, record: Option<T>) -> RepoResult<T> {
    record.ok_or_else(|| {
        RepoError::InvalidData(format!(
            "{} {id} missing in read-back",
            entity.label().to_lowercase()
        ))
    })
}

fn logged<T>(
    event: &'static str,
    id: Option<i64>,
    op: impl FnOnce() -> RepoResult<T>,
) -> RepoResult<T> {
    let target = id.map(|id| format!(" id={id}")).unwrap_or_default();
    info!("event={event} module=service status=start{target}");
    let started_at = Instant::now();
    let result = op();
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event={event} module=service status=ok{target} duration_ms={duration_ms}"),
        Err(err @ (RepoError::Validation(_) | RepoError::NotFound { .. })) => warn!(
            "event={event} module=service status=error{target} duration_ms={duration_ms} error_code={}",
            err.code()
        ),
        Err(err) => error!(
            "event={event} module=service status=error{target} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
    result
}
