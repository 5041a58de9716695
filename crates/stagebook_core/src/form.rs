//! Inbound form decoding for venue, artist and show submissions.
//!
//! # Responsibility
//! - Collect raw form pairs (repeated keys allowed) into typed forms.
//! - Normalize raw text into validated profiles before any store write.
//!
//! # Invariants
//! - Only the recognized field set is read; unknown keys are ignored.
//! - Blank optional fields become `None`; required fields are trimmed.
//! - Genre order is kept and duplicates are dropped after the first.

use crate::model::artist::{ArtistId, ArtistProfile};
use crate::model::show::{NewShow, Show};
use crate::model::validation::ValidationError;
use crate::model::venue::{VenueId, VenueProfile};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field names accepted by venue forms.
pub const VENUE_FIELDS: &[&str] = &[
    "name",
    "genres",
    "address",
    "city",
    "state",
    "phone",
    "website",
    "facebook_link",
    "seeking_talent",
    "seeking_description",
    "image_link",
];

/// Field names accepted by artist forms.
pub const ARTIST_FIELDS: &[&str] = &[
    "name",
    "genres",
    "city",
    "state",
    "phone",
    "website",
    "facebook_link",
    "seeking_venue",
    "seeking_description",
    "image_link",
];

/// Field names accepted by show forms.
pub const SHOW_FIELDS: &[&str] = &["venue_id", "artist_id", "start_time"];

const NAIVE_START_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Raw submitted key/value pairs in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one pair; repeated keys are kept.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value submitted for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Every value submitted for `key`, in order.
    pub fn all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn text(&self, key: &str) -> String {
        self.first(key).unwrap_or_default().to_string()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Raw venue form, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueForm {
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl VenueForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: fields.text("name"),
            genres: owned_values(fields, "genres"),
            address: fields.text("address"),
            city: fields.text("city"),
            state: fields.text("state"),
            phone: fields.text("phone"),
            website: fields.text("website"),
            facebook_link: fields.text("facebook_link"),
            seeking_talent: parse_checkbox(fields.first("seeking_talent")),
            seeking_description: fields.text("seeking_description"),
            image_link: fields.text("image_link"),
        }
    }

    /// Prefills a form from a stored profile for editing.
    pub fn from_profile(profile: &VenueProfile) -> Self {
        Self {
            name: profile.name.clone(),
            genres: profile.genres.clone(),
            address: profile.address.clone(),
            city: profile.city.clone(),
            state: profile.state.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            website: profile.website.clone().unwrap_or_default(),
            facebook_link: profile.facebook_link.clone().unwrap_or_default(),
            seeking_talent: profile.seeking_talent,
            seeking_description: profile.seeking_description.clone().unwrap_or_default(),
            image_link: profile.image_link.clone().unwrap_or_default(),
        }
    }

    /// Normalizes and validates the form into a storable profile.
    pub fn into_profile(self) -> Result<VenueProfile, ValidationError> {
        let profile = VenueProfile {
            name: self.name.trim().to_string(),
            genres: normalize_genres(&self.genres),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            phone: optional(&self.phone),
            website: optional(&self.website),
            facebook_link: optional(&self.facebook_link),
            seeking_talent: self.seeking_talent,
            seeking_description: optional(&self.seeking_description),
            image_link: optional(&self.image_link),
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Raw artist form, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistForm {
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl ArtistForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: fields.text("name"),
            genres: owned_values(fields, "genres"),
            city: fields.text("city"),
            state: fields.text("state"),
            phone: fields.text("phone"),
            website: fields.text("website"),
            facebook_link: fields.text("facebook_link"),
            seeking_venue: parse_checkbox(fields.first("seeking_venue")),
            seeking_description: fields.text("seeking_description"),
            image_link: fields.text("image_link"),
        }
    }

    pub fn from_profile(profile: &ArtistProfile) -> Self {
        Self {
            name: profile.name.clone(),
            genres: profile.genres.clone(),
            city: profile.city.clone(),
            state: profile.state.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            website: profile.website.clone().unwrap_or_default(),
            facebook_link: profile.facebook_link.clone().unwrap_or_default(),
            seeking_venue: profile.seeking_venue,
            seeking_description: profile.seeking_description.clone().unwrap_or_default(),
            image_link: profile.image_link.clone().unwrap_or_default(),
        }
    }

    pub fn into_profile(self) -> Result<ArtistProfile, ValidationError> {
        let profile = ArtistProfile {
            name: self.name.trim().to_string(),
            genres: normalize_genres(&self.genres),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            phone: optional(&self.phone),
            website: optional(&self.website),
            facebook_link: optional(&self.facebook_link),
            seeking_venue: self.seeking_venue,
            seeking_description: optional(&self.seeking_description),
            image_link: optional(&self.image_link),
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Raw show form, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowForm {
    pub venue_id: String,
    pub artist_id: String,
    pub start_time: String,
}

impl ShowForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            venue_id: fields.text("venue_id"),
            artist_id: fields.text("artist_id"),
            start_time: fields.text("start_time"),
        }
    }

    /// Prefills an edit form from a stored show, start time in UTC.
    pub fn from_show(show: &Show) -> Self {
        Self {
            venue_id: show.venue_id.to_string(),
            artist_id: show.artist_id.to_string(),
            start_time: show.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Parses ids and start time. Existence of the referenced rows is
    /// checked by the store, not here.
    pub fn into_new_show(self) -> Result<NewShow, ValidationError> {
        let venue_id: VenueId = parse_id("venue_id", &self.venue_id)?;
        let artist_id: ArtistId = parse_id("artist_id", &self.artist_id)?;
        let start_time = parse_start_time(&self.start_time)?;
        Ok(NewShow {
            venue_id,
            artist_id,
            start_time,
        })
    }
}

/// Parses a submitted start time.
///
/// Accepts RFC 3339, or `YYYY-MM-DD HH:MM[:SS]` (space or `T` separated)
/// interpreted as UTC.
pub fn parse_start_time(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("start_time", "is required"));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_START_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            ValidationError::new(
                "start_time",
                format!("`{trimmed}` is not a date-time like 2035-04-01 20:00:00"),
            )
        })
}

/// Interprets an HTML checkbox value.
pub fn parse_checkbox(value: Option<&str>) -> bool {
    matches!(
        value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "yes" | "on" | "true" | "1")
    )
}

fn parse_id(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    match trimmed.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::new(
            field,
            format!("`{trimmed}` is not a positive id"),
        )),
    }
}

fn owned_values(fields: &FormFields, key: &str) -> Vec<String> {
    fields.all(key).into_iter().map(str::to_string).collect()
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_genres(genres: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let trimmed = genre.trim();
        if !normalized.iter().any(|existing| existing == trimmed) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn show_edit_form_is_prefilled_with_utc_start() {
        let show = Show {
            id: 9,
            venue_id: 1,
            artist_id: 4,
            start_time: Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap(),
        };
        let form = ShowForm::from_show(&show);
        assert_eq!(form.venue_id, "1");
        assert_eq!(form.artist_id, "4");
        assert_eq!(form.start_time, "2035-04-01 20:00:00");
    }

    fn fillmore_fields() -> FormFields {
        [
            ("name", "The Fillmore"),
            ("genres", "Rock"),
            ("genres", "Jazz"),
            ("genres", "Rock"),
            ("address", "1805 Geary Blvd"),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("phone", ""),
            ("seeking_talent", "y"),
            ("csrf_token", "ignored"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn venue_form_collects_repeated_genres_in_order() {
        let form = VenueForm::from_fields(&fillmore_fields());
        assert_eq!(form.genres, vec!["Rock", "Jazz", "Rock"]);
        assert!(form.seeking_talent);

        let profile = form.into_profile().unwrap();
        assert_eq!(profile.genres, vec!["Rock".to_string(), "Jazz".to_string()]);
        assert_eq!(profile.phone, None);
        assert_eq!(profile.name, "The Fillmore");
    }

    #[test]
    fn blank_genre_is_a_validation_error() {
        let mut fields = fillmore_fields();
        fields.push("genres", "  ");
        let err = VenueForm::from_fields(&fields).into_profile().unwrap_err();
        assert_eq!(err.field, "genres");
    }

    #[test]
    fn venue_form_round_trips_through_profile() {
        let profile = VenueForm::from_fields(&fillmore_fields())
            .into_profile()
            .unwrap();
        let again = VenueForm::from_profile(&profile).into_profile().unwrap();
        assert_eq!(again, profile);
    }

    #[test]
    fn artist_form_requires_name() {
        let fields: FormFields = [("city", "Oakland"), ("state", "CA")].into_iter().collect();
        let err = ArtistForm::from_fields(&fields).into_profile().unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn checkbox_values() {
        assert!(parse_checkbox(Some("y")));
        assert!(parse_checkbox(Some("On")));
        assert!(parse_checkbox(Some("TRUE")));
        assert!(!parse_checkbox(Some("n")));
        assert!(!parse_checkbox(Some("")));
        assert!(!parse_checkbox(None));
    }

    #[test]
    fn show_form_parses_ids_and_start_time() {
        let fields: FormFields = [
            ("venue_id", "3"),
            ("artist_id", " 4 "),
            ("start_time", "2035-04-01 20:00:00"),
        ]
        .into_iter()
        .collect();
        let show = ShowForm::from_fields(&fields).into_new_show().unwrap();
        assert_eq!(show.venue_id, 3);
        assert_eq!(show.artist_id, 4);
        assert_eq!(
            show.start_time,
            Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap()
        );
    }

    #[test]
    fn show_form_rejects_non_numeric_ids() {
        let form = ShowForm {
            venue_id: "abc".to_string(),
            artist_id: "1".to_string(),
            start_time: "2035-04-01 20:00:00".to_string(),
        };
        assert_eq!(form.into_new_show().unwrap_err().field, "venue_id");

        let form = ShowForm {
            venue_id: "1".to_string(),
            artist_id: "0".to_string(),
            start_time: "2035-04-01 20:00:00".to_string(),
        };
        assert_eq!(form.into_new_show().unwrap_err().field, "artist_id");
    }

    #[test]
    fn start_time_accepts_rfc3339_and_local_input_formats() {
        let expected = Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap();
        assert_eq!(parse_start_time("2035-04-01T20:00:00Z").unwrap(), expected);
        assert_eq!(
            parse_start_time("2035-04-01T22:00:00+02:00").unwrap(),
            expected
        );
        assert_eq!(parse_start_time("2035-04-01T20:00").unwrap(), expected);
        assert_eq!(parse_start_time("2035-04-01 20:00").unwrap(), expected);
        assert!(parse_start_time("next friday").is_err());
        assert!(parse_start_time("").is_err());
    }
}
