use chrono::{Duration, Utc};
use rusqlite::Connection;
use stagebook_core::db::open_db_in_memory;
use stagebook_core::{
    Action, ArtistForm, EntityKind, FailureReason, MutationService, Outcome, RepoError, ShowForm,
    SqliteQueryService, VenueForm,
};

struct Booked {
    venue_id: i64,
    show_ids: Vec<i64>,
}

fn seed_venue_with_shows(conn: &Connection, shows: usize) -> Booked {
    let mutations = MutationService::try_new(conn).unwrap();
    let venue = mutations
        .create_venue(VenueForm {
            name: "Venue V".to_string(),
            address: "500 Congress Ave".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            ..VenueForm::default()
        })
        .unwrap();
    let artist = mutations
        .create_artist(ArtistForm {
            name: "Artist A".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            ..ArtistForm::default()
        })
        .unwrap();
    let show_ids = (0..shows)
        .map(|index| {
            let start_time = Utc::now() + Duration::hours(1 + index as i64);
            mutations
                .create_show(ShowForm {
                    venue_id: venue.id.to_string(),
                    artist_id: artist.id.to_string(),
                    start_time: start_time.to_rfc3339(),
                })
                .unwrap()
                .id
        })
        .collect();
    Booked {
        venue_id: venue.id,
        show_ids,
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn deleting_a_venue_removes_its_shows() {
    let conn = open_db_in_memory().unwrap();
    let booked = seed_venue_with_shows(&conn, 3);
    let mutations = MutationService::try_new(&conn).unwrap();

    let removal = mutations.delete_venue(booked.venue_id).unwrap();

    assert_eq!(removal.venue.id, booked.venue_id);
    assert_eq!(removal.venue.profile.name, "Venue V");
    assert_eq!(removal.removed_shows, 3);
    assert_eq!(count(&conn, "venues"), 0);
    assert_eq!(count(&conn, "shows"), 0);
    assert_eq!(count(&conn, "artists"), 1);
}

#[test]
fn deleted_venue_and_its_show_are_not_found_afterwards() {
    let conn = open_db_in_memory().unwrap();
    let booked = seed_venue_with_shows(&conn, 1);
    MutationService::try_new(&conn)
        .unwrap()
        .delete_venue(booked.venue_id)
        .unwrap();

    let queries = SqliteQueryService::try_new(&conn).unwrap();
    assert!(matches!(
        queries.venue(booked.venue_id),
        Err(RepoError::NotFound {
            entity: EntityKind::Venue,
            ..
        })
    ));
    assert!(matches!(
        queries.show(booked.show_ids[0]),
        Err(RepoError::NotFound {
            entity: EntityKind::Show,
            ..
        })
    ));
}

#[test]
fn failed_venue_delete_leaves_venue_and_shows_untouched() {
    let conn = open_db_in_memory().unwrap();
    let booked = seed_venue_with_shows(&conn, 2);
    conn.execute_batch(
        "CREATE TRIGGER fail_venue_delete
         BEFORE DELETE ON venues
         BEGIN
             SELECT RAISE(ABORT, 'simulated store failure');
         END;",
    )
    .unwrap();

    let result = MutationService::try_new(&conn)
        .unwrap()
        .delete_venue(booked.venue_id);

    assert!(result.is_err());
    assert_eq!(count(&conn, "venues"), 1);
    assert_eq!(count(&conn, "shows"), 2);
    assert!(conn.is_autocommit(), "transaction must be released after failure");
}

#[test]
fn deleting_unknown_venue_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let err = MutationService::try_new(&conn)
        .unwrap()
        .delete_venue(77)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: EntityKind::Venue,
            id: 77
        }
    ));
}

#[test]
fn outcomes_describe_finished_mutations() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();

    let form = VenueForm {
        name: "The Dueling Pianos Bar".to_string(),
        address: "335 Delancey Street".to_string(),
        city: "New York".to_string(),
        state: "NY".to_string(),
        ..VenueForm::default()
    };
    let result = mutations.create_venue(form);
    let outcome = Outcome::from_result(
        EntityKind::Venue,
        Some("The Dueling Pianos Bar"),
        Action::Create,
        &result,
    );
    assert_eq!(
        outcome.message(),
        "Venue The Dueling Pianos Bar was successfully listed!"
    );

    let result = mutations.create_venue(VenueForm::default());
    let outcome = Outcome::from_result(EntityKind::Venue, None, Action::Create, &result);
    assert!(!outcome.is_success());
    assert_eq!(outcome.reason(), Some(FailureReason::Validation));
    assert_eq!(
        outcome.message(),
        "An error occurred. Venue could not be listed."
    );
}

#[test]
fn mutation_service_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        MutationService::try_new(&conn),
        Err(RepoError::UninitializedConnection { .. })
    ));
}
