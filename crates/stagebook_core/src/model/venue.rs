//! Venue records.

use crate::model::validation::{
    genre_list, optional_phone, optional_text, optional_url, require_text, ValidationError,
    LONG_TEXT_MAX_CHARS, SHORT_TEXT_MAX_CHARS,
};
use serde::{Deserialize, Serialize};

/// Store-assigned venue identifier.
pub type VenueId = i64;

/// Every venue attribute except its id.
///
/// Updates replace the whole profile; there is no partial patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueProfile {
    pub name: String,
    /// Ordered genre tags, first occurrence wins on duplicates.
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    /// Meaningful only when `seeking_talent` is set.
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
}

impl VenueProfile {
    /// Creates a profile with the required attributes and nothing else set.
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            state: state.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Checks required fields, column limits and link/phone shapes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, LONG_TEXT_MAX_CHARS)?;
        require_text("city", &self.city, SHORT_TEXT_MAX_CHARS)?;
        require_text("state", &self.state, SHORT_TEXT_MAX_CHARS)?;
        require_text("address", &self.address, SHORT_TEXT_MAX_CHARS)?;
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

/// A persisted venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    #[serde(flatten)]
    pub profile: VenueProfile,
}
