use stagebook_core::db::open_db_in_memory;
use stagebook_core::repo::venue_repo::{SqliteVenueRepository, VenueRepository};
use stagebook_core::{
    EntityKind, MutationService, RepoError, SqliteQueryService, VenueForm, VenueProfile,
};

fn fillmore_form() -> VenueForm {
    VenueForm {
        name: "The Fillmore".to_string(),
        genres: vec!["Rock".to_string(), "Jazz".to_string()],
        address: "1805 Geary Blvd".to_string(),
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        phone: "415-346-6000".to_string(),
        website: "https://www.thefillmore.com".to_string(),
        seeking_talent: true,
        seeking_description: "Local bands for weekend slots".to_string(),
        ..VenueForm::default()
    }
}

#[test]
fn created_venue_reads_back_with_identical_attributes() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();

    let created = mutations.create_venue(fillmore_form()).unwrap();
    let queries = SqliteQueryService::try_new(&conn).unwrap();
    let loaded = queries.venue(created.id).unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.profile.name, "The Fillmore");
    assert_eq!(loaded.profile.genres, vec!["Rock", "Jazz"]);
    assert_eq!(loaded.profile.phone.as_deref(), Some("415-346-6000"));
    assert!(loaded.profile.seeking_talent);
    assert_eq!(loaded.profile.facebook_link, None);
    assert_eq!(loaded.profile.image_link, None);
}

#[test]
fn update_replaces_every_attribute() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();
    let created = mutations.create_venue(fillmore_form()).unwrap();

    let replacement = VenueForm {
        name: "The Fillmore West".to_string(),
        genres: vec!["Blues".to_string()],
        address: "10 South Van Ness".to_string(),
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        ..VenueForm::default()
    };
    let updated = mutations.update_venue(created.id, replacement).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.profile.name, "The Fillmore West");
    assert_eq!(updated.profile.genres, vec!["Blues"]);
    assert_eq!(updated.profile.phone, None);
    assert_eq!(updated.profile.website, None);
    assert!(!updated.profile.seeking_talent);
    assert_eq!(updated.profile.seeking_description, None);
}

#[test]
fn update_of_unknown_venue_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();

    let err = mutations.update_venue(42, fillmore_form()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: EntityKind::Venue,
            id: 42
        }
    ));
}

#[test]
fn invalid_form_is_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let mutations = MutationService::try_new(&conn).unwrap();

    let mut form = fillmore_form();
    form.city = "   ".to_string();
    let err = mutations.create_venue(form).unwrap_err();
    match err {
        RepoError::Validation(validation) => assert_eq!(validation.field, "city"),
        other => panic!("unexpected error: {other}"),
    }

    let mut form = fillmore_form();
    form.website = "ftp://example.com".to_string();
    let err = mutations.create_venue(form).unwrap_err();
    assert_eq!(err.code(), "validation_failed");

    let queries = SqliteQueryService::try_new(&conn).unwrap();
    assert!(queries.venue_areas().unwrap().is_empty());
}

#[test]
fn repository_rejects_invalid_profile() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVenueRepository::try_new(&conn).unwrap();

    let profile = VenueProfile::new("Nameless", "Austin", "TX", "");
    let err = repo.create_venue(&profile).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_venues().unwrap().is_empty());
}

#[test]
fn missing_venue_lookup_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVenueRepository::try_new(&conn).unwrap();

    assert!(repo.get_venue(7).unwrap().is_none());
    assert!(matches!(
        repo.delete_venue(7),
        Err(RepoError::NotFound { id: 7, .. })
    ));
}
