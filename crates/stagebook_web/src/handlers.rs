//! Route table and request handlers.
//!
//! # Invariants
//! - Mutation bodies are urlencoded forms; repeated `genres` keys are kept.
//! - Every mutation answers `{status, message, redirect_to}`, with failure
//!   `reason`/`detail` added when it did not apply.
//! - `now` is read once per request and shared by every show it classifies.
//! - Store work runs through `AppState::run`, off the async workers.

use crate::error::{status_for, ApiError};
use crate::state::AppState;
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stagebook_core::form::{ARTIST_FIELDS, SHOW_FIELDS, VENUE_FIELDS};
use stagebook_core::{
    core_version, Action, ArtistForm, ArtistId, EntityKind, FormFields, MutationService, Outcome,
    SearchResults, ShowForm, ShowId, SqliteQueryService, VenueForm, VenueId,
};

type SubmittedForm = web::Form<Vec<(String, String)>>;

/// Registers every route on an app or test service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(|err, _req| {
        let body = json!({ "error": err.to_string() });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        let body = json!({ "error": format!("no route for `{}`", req.path()) });
        InternalError::from_response(err, HttpResponse::NotFound().json(body)).into()
    }))
    .route("/", web::get().to(home))
    // Venues
    .route("/venues", web::get().to(list_venues))
    .route("/venues/search", web::post().to(search_venues))
    .route("/venues/create", web::get().to(new_venue_form))
    .route("/venues/create", web::post().to(create_venue))
    .route("/venues/{id}", web::get().to(venue_detail))
    .route("/venues/{id}", web::delete().to(delete_venue))
    .route("/venues/{id}/delete", web::post().to(delete_venue))
    .route("/venues/{id}/edit", web::get().to(edit_venue_form))
    .route("/venues/{id}/edit", web::post().to(update_venue))
    // Artists
    .route("/artists", web::get().to(list_artists))
    .route("/artists/search", web::post().to(search_artists))
    .route("/artists/create", web::get().to(new_artist_form))
    .route("/artists/create", web::post().to(create_artist))
    .route("/artists/{id}", web::get().to(artist_detail))
    .route("/artists/{id}/edit", web::get().to(edit_artist_form))
    .route("/artists/{id}/edit", web::post().to(update_artist))
    // Shows
    .route("/shows", web::get().to(list_shows))
    .route("/shows/create", web::get().to(new_show_form))
    .route("/shows/create", web::post().to(create_show))
    .route("/shows/{id}", web::delete().to(delete_show))
    .route("/shows/{id}/delete", web::post().to(delete_show))
    .route("/shows/{id}/edit", web::get().to(edit_show_form))
    .route("/shows/{id}/edit", web::post().to(update_show))
    .default_service(web::to(route_not_found));
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    search_term: String,
}

#[derive(Debug, Serialize)]
struct SearchReply {
    search_term: String,
    #[serde(flatten)]
    results: SearchResults,
}

/// Field list and current values for rendering a form.
#[derive(Debug, Serialize)]
struct FormDescription<T: Serialize> {
    form: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    fields: &'static [&'static str],
    values: T,
    submit_to: String,
}

// ── Home ────────────────────────────────────────────────────────────

async fn home() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": "stagebook",
        "version": core_version(),
        "links": {
            "venues": "/venues",
            "artists": "/artists",
            "shows": "/shows",
        },
    }))
}

// ── Venues ──────────────────────────────────────────────────────────

async fn list_venues(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let areas = state
        .into_inner()
        .run(|conn| Ok(SqliteQueryService::try_new(conn)?.venue_areas()?))
        .await?;
    Ok(HttpResponse::Ok().json(areas))
}

async fn search_venues(
    state: web::Data<AppState>,
    form: web::Form<SearchForm>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();
    let search_term = form.into_inner().search_term;
    let term = search_term.clone();
    let results = state
        .into_inner()
        .run(move |conn| Ok(SqliteQueryService::try_new(conn)?.search_venues(&term, now)?))
        .await?;
    Ok(HttpResponse::Ok().json(SearchReply {
        search_term,
        results,
    }))
}

async fn venue_detail(
    state: web::Data<AppState>,
    path: web::Path<VenueId>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();
    let id = path.into_inner();
    let detail = state
        .into_inner()
        .run(move |conn| Ok(SqliteQueryService::try_new(conn)?.venue_detail(id, now)?))
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

async fn new_venue_form() -> HttpResponse {
    HttpResponse::Ok().json(FormDescription {
        form: EntityKind::Venue,
        id: None,
        fields: VENUE_FIELDS,
        values: VenueForm::default(),
        submit_to: "/venues/create".to_string(),
    })
}

async fn create_venue(
    state: web::Data<AppState>,
    form: SubmittedForm,
) -> Result<HttpResponse, ApiError> {
    let form = VenueForm::from_fields(&submitted(form));
    let outcome = state
        .into_inner()
        .run(move |conn| {
            let name = form.name.clone();
            let result = MutationService::try_new(conn)?.create_venue(form);
            Ok(Outcome::from_result(
                EntityKind::Venue,
                Some(name.as_str()),
                Action::Create,
                &result,
            ))
        })
        .await?;
    Ok(mutation_reply(&outcome, StatusCode::CREATED, "/"))
}

async fn edit_venue_form(
    state: web::Data<AppState>,
    path: web::Path<VenueId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let venue = state
        .into_inner()
        .run(move |conn| Ok(SqliteQueryService::try_new(conn)?.venue(id)?))
        .await?;
    Ok(HttpResponse::Ok().json(FormDescription {
        form: EntityKind::Venue,
        id: Some(id),
        fields: VENUE_FIELDS,
        values: VenueForm::from_profile(&venue.profile),
        submit_to: format!("/venues/{id}/edit"),
    }))
}

async fn update_venue(
    state: web::Data<AppState>,
    path: web::Path<VenueId>,
    form: SubmittedForm,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let form = VenueForm::from_fields(&submitted(form));
    let outcome = state
        .into_inner()
        .run(move |conn| {
            let name = form.name.clone();
            let result = MutationService::try_new(conn)?.update_venue(id, form);
            Ok(Outcome::from_result(
                EntityKind::Venue,
                Some(name.as_str()),
                Action::Update,
                &result,
            ))
        })
        .await?;
    Ok(mutation_reply(&outcome, StatusCode::OK, &format!("/venues/{id}")))
}

async fn delete_venue(
    state: web::Data<AppState>,
    path: web::Path<VenueId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let outcome = state
        .into_inner()
        .run(move |conn| {
            let result = MutationService::try_new(conn)?.delete_venue(id);
            let name = result
                .as_ref()
                .ok()
                .map(|removal| removal.venue.profile.name.clone());
            Ok(Outcome::from_result(
                EntityKind::Venue,
                name.as_deref(),
                Action::Delete,
                &result,
            ))
        })
        .await?;
    Ok(mutation_reply(&outcome, StatusCode::OK, "/venues"))
}

// ── Artists ─────────────────────────────────────────────────────────

async fn list_artists(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let artists = state
        .into_inner()
        .run(|conn| Ok(SqliteQueryService::try_new(conn)?.list_artists()?))
        .await?;
    Ok(HttpResponse::Ok().json(artists))
}

async fn search_artists(
    state: web::Data<AppState>,
    form: web::Form<SearchForm>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();
    let search_term = form.into_inner().search_term;
    let term = search_term.clone();
    let results = state
        .into_inner()
        .run(move |conn| Ok(SqliteQueryService::try_new(conn)?.search_artists(&term, now)?))
        .await?;
    Ok(HttpResponse::Ok().json(SearchReply {
        search_term,
        results,
    }))
}

async fn artist_detail(
    state: web::Data<AppState>,
    path: web::Path<ArtistId>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();
    let id = path.into_inner();
    let detail = state
        .into_inner()
        .run(move |conn| Ok(SqliteQueryService::try_new(conn)?.artist_detail(id, now)?))
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

async fn new_artist_form() -> HttpResponse {
    HttpResponse::Ok().json(FormDescription {
        form: EntityKind::Artist,
        id: None,
        fields: ARTIST_FIELDS,
        values: ArtistForm::default(),
        submit_to: "/artists/create".to_string(),
    })
}

async fn create_artist(
    state: web::Data<AppState>,
    form: SubmittedForm,
) -> Result<HttpResponse, ApiError> {
    let form = ArtistForm::from_fields(&submitted(form));
    let outcome = state
        .into_inner()
        .run(move |conn| {
            let name = form.name.clone();
            let result = MutationService::try_new(conn)?.create_artist(form);
            Ok(Outcome::from_result(
                EntityKind::Artist,
                Some(name.as_str()),
                Action::Create,
                &result,
            ))
        })
        .await?;
    Ok(mutation_reply(&outcome, StatusCode::CREATED, "/"))
}

async fn edit_artist_form(
    state: web::Data<AppState>,
    path: web::Path<ArtistId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let artist = state
        .into_inner()
        .run(move |conn| Ok(SqliteQueryService::try_new(conn)?.artist(id)?))
        .await?;
    Ok(HttpResponse::Ok().json(FormDescription {
        form: EntityKind::Artist,
        id: Some(id),
        fields: ARTIST_FIELDS,
        values: ArtistForm::from_profile(&artist.profile),
        submit_to: format!("/artists/{id}/edit"),
    }))
}

async fn update_artist(
    state: web::Data<AppState>,
    path: web::Path<ArtistId>,
    form: SubmittedForm,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let form = ArtistForm::from_fields(&submitted(form));
    let outcome = state
        .into_inner()
        .run(move |conn| {
            let name = form.name.clone();
            let result = MutationService::try_new(conn)?.update_artist(id, form);
            Ok(Outcome::from_result(
                EntityKind::Artist,
                Some(name.as_str()),
                Action::Update,
                &result,
            ))
        })
        .await?;
    Ok(mutation_reply(&outcome, StatusCode::OK, &format!("/artists/{id}")))
}

// ── Shows ───────────────────────────────────────────────────────────

async fn list_shows(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let shows = state
        .into_inner()
        .run(|conn| Ok(SqliteQueryService::try_new(conn)?.list_shows()?))
        .await?;
    Ok(HttpResponse::Ok().json(shows))
}

async fn new_show_form() -> HttpResponse {
    HttpResponse::Ok().json(FormDescription {
        form: EntityKind::Show,
        id: None,
        fields: SHOW_FIELDS,
        values: ShowForm::default(),
        submit_to: "/shows/create".to_string(),
    })
}

async fn create_show(
    state: web::Data<AppState>,
    form: SubmittedForm,
) -> Result<HttpResponse, ApiError> {
    let form = ShowForm::from_fields(&submitted(form));
    let outcome = state
        .into_inner()
        .run(move |conn| {
            let result = MutationService::try_new(conn)?.create_show(form);
            Ok(Outcome::from_result(
                EntityKind::Show,
                None,
                Action::Create,
                &result,
            ))
        })
        .await?;
    Ok(mutation_reply(&outcome, StatusCode::CREATED, "/"))
}

async fn edit_show_form(
    state: web::Data<AppState>,
    path: web::Path<ShowId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let show = state
        .into_inner()
        .run(move |conn| Ok(SqliteQueryService::try_new(conn)?.show(id)?))
        .await?;
    Ok(HttpResponse::Ok().json(FormDescription {
        form: EntityKind::Show,
        id: Some(id),
        fields: SHOW_FIELDS,
        values: ShowForm::from_show(&show),
        submit_to: format!("/shows/{id}/edit"),
    }))
}

async fn update_show(
    state: web::Data<AppState>,
    path: web::Path<ShowId>,
    form: SubmittedForm,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let form = ShowForm::from_fields(&submitted(form));
    let outcome = state
        .into_inner()
        .run(move |conn| {
            let result = MutationService::try_new(conn)?.update_show(id, form);
            Ok(Outcome::from_result(
                EntityKind::Show,
                None,
                Action::Update,
                &result,
            ))
        })
        .await?;
    Ok(mutation_reply(&outcome, StatusCode::OK, "/shows"))
}

async fn delete_show(
    state: web::Data<AppState>,
    path: web::Path<ShowId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let outcome = state
        .into_inner()
        .run(move |conn| {
            let result = MutationService::try_new(conn)?.delete_show(id);
            Ok(Outcome::from_result(
                EntityKind::Show,
                None,
                Action::Delete,
                &result,
            ))
        })
        .await?;
    Ok(mutation_reply(&outcome, StatusCode::OK, "/shows"))
}

// ── Helpers ─────────────────────────────────────────────────────────

async fn route_not_found(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::RouteNotFound(req.path().to_string()))
}

fn submitted(form: SubmittedForm) -> FormFields {
    form.into_inner().into_iter().collect()
}

fn mutation_reply(outcome: &Outcome, success: StatusCode, redirect_to: &str) -> HttpResponse {
    match outcome {
        Outcome::Success { message } => HttpResponse::build(success).json(json!({
            "status": "success",
            "message": message,
            "redirect_to": redirect_to,
        })),
        Outcome::Failure {
            reason,
            message,
            detail,
        } => HttpResponse::build(status_for(*reason)).json(json!({
            "status": "failure",
            "reason": reason,
            "message": message,
            "detail": detail,
            "redirect_to": redirect_to,
        })),
    }
}
