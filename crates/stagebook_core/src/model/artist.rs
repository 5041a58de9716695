//! Artist records.
//!
//! Artist genres are kept as an ordered list, the same shape venues use.

use crate::model::validation::{
    genre_list, optional_phone, optional_text, optional_url, require_text, ValidationError,
    LONG_TEXT_MAX_CHARS, SHORT_TEXT_MAX_CHARS,
};
use serde::{Deserialize, Serialize};

/// Store-assigned artist identifier.
pub type ArtistId = i64;

/// Every artist attribute except its id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    /// Meaningful only when `seeking_venue` is set.
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
}

impl ArtistProfile {
    pub fn new(name: impl Into<String>, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            state: state.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, LONG_TEXT_MAX_CHARS)?;
        require_text("city", &self.city, SHORT_TEXT_MAX_CHARS)?;
        require_text("state", &self.state, SHORT_TEXT_MAX_CHARS)?;
        genre_list("genres", &self.genres)?;
        optional_phone("phone", self.phone.as_deref())?;
        optional_url("website", self.website.as_deref(), SHORT_TEXT_MAX_CHARS)?;
        optional_url(
            "facebook_link",
            self.facebook_link.as_deref(),
            SHORT_TEXT_MAX_CHARS,
        )?;
        optional_url("image_link", self.image_link.as_deref(), LONG_TEXT_MAX_CHARS)?;
        optional_text(
            "seeking_description",
            self.seeking_description.as_deref(),
            LONG_TEXT_MAX_CHARS,
        )
    }
}

/// A persisted artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    #[serde(flatten)]
    pub profile: ArtistProfile,
}
