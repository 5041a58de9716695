use stagebook_core::db::open_db_in_memory;
use stagebook_core::repo::artist_repo::{ArtistRepository, SqliteArtistRepository};
use stagebook_core::{ArtistForm, EntityKind, MutationService, RepoError, SqliteQueryService};

fn guns_n_petals() -> ArtistForm {
    ArtistForm {
        name: "Guns N Petals".to_string(),
        genres: vec!["Rock n Roll".to_string()],
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        phone: "326-123-5000".to_string(),
        website: "https://www.gunsnpetalsband.com".to_string(),
        facebook_link: "https://www.facebook.com/GunsNPetals".to_string(),
        seeking_venue: true,
        seeking_description: "Looking for shows in the San Francisco Bay Area!".to_string(),
        image_link: "https://images.example.com/guns-n-petals.jpg".to_string(),
    }
}

#[test]
fn created_artist_reads_back_with_identical_attributes() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();

    let created = mutations.create_artist(guns_n_petals()).unwrap();
    let loaded = SqliteQueryService::try_new(&conn)
        .unwrap()
        .artist(created.id)
        .unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.profile.genres, vec!["Rock n Roll"]);
    assert!(loaded.profile.seeking_venue);
    assert_eq!(
        loaded.profile.facebook_link.as_deref(),
        Some("https://www.facebook.com/GunsNPetals")
    );
}

#[test]
fn update_replaces_artist_profile() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();
    let created = mutations.create_artist(guns_n_petals()).unwrap();

    let mut form = ArtistForm::from_profile(&created.profile);
    form.name = "Matt Quevedo".to_string();
    form.genres = vec!["Jazz".to_string()];
    form.seeking_venue = false;
    form.seeking_description.clear();
    let updated = mutations.update_artist(created.id, form).unwrap();

    assert_eq!(updated.profile.name, "Matt Quevedo");
    assert_eq!(updated.profile.genres, vec!["Jazz"]);
    assert!(!updated.profile.seeking_venue);
    assert_eq!(updated.profile.seeking_description, None);
    assert_eq!(updated.profile.city, "San Francisco");
}

#[test]
fn update_of_unknown_artist_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();

    let err = mutations.update_artist(9, guns_n_petals()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: EntityKind::Artist,
            id: 9
        }
    ));
}

#[test]
fn bad_phone_is_a_validation_failure() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();

    let mut form = guns_n_petals();
    form.phone = "call me".to_string();
    let err = mutations.create_artist(form).unwrap_err();
    match err {
        RepoError::Validation(validation) => assert_eq!(validation.field, "phone"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn artist_with_shows_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();
    let artist = mutations.create_artist(guns_n_petals()).unwrap();
    conn.execute(
        "INSERT INTO venues (name, city, state, address) VALUES ('Park Square', 'San Francisco', 'CA', '34 Whiskey Moore Ave');",
        [],
    )
    .unwrap();
    let venue_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO shows (venue_id, artist_id, start_time) VALUES (?1, ?2, 0);",
        [venue_id, artist.id],
    )
    .unwrap();

    let err = mutations.delete_artist(artist.id).unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)));

    let repo = SqliteArtistRepository::try_new(&conn).unwrap();
    assert!(repo.get_artist(artist.id).unwrap().is_some());
}

#[test]
fn artist_without_shows_is_deleted() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();
    let artist = mutations.create_artist(guns_n_petals()).unwrap();

    let removed = mutations.delete_artist(artist.id).unwrap();
    assert_eq!(removed.id, artist.id);

    let repo = SqliteArtistRepository::try_new(&conn).unwrap();
    assert!(repo.get_artist(artist.id).unwrap().is_none());
    assert!(matches!(
        mutations.delete_artist(artist.id),
        Err(RepoError::NotFound { .. })
    ));
}
