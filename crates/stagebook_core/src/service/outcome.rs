//! Typed mutation outcomes.
//!
//! Every mutation yields exactly one outcome; presentation code decides how
//! to surface it (banner, JSON, log line).

use crate::model::EntityKind;
use crate::repo::RepoError;
use serde::Serialize;

/// Write performed by a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    fn past_participle(self) -> &'static str {
        match self {
            Self::Create => "listed",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

/// Failure class carried by [`Outcome::Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Validation,
    NotFound,
    ConstraintViolation,
    StoreFailure,
}

impl FailureReason {
    pub fn of(err: &RepoError) -> Self {
        match err {
            RepoError::Validation(_) => Self::Validation,
            RepoError::NotFound { .. } => Self::NotFound,
            RepoError::ConstraintViolation(_) => Self::ConstraintViolation,
            RepoError::Db(_)
            | RepoError::InvalidData(_)
            | RepoError::UninitializedConnection { .. }
            | RepoError::MissingRequiredTable(_) => Self::StoreFailure,
        }
    }
}

/// Result of one mutation, ready for user-facing rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        message: String,
    },
    Failure {
        reason: FailureReason,
        message: String,
        /// Error text for client-correctable failures; store internals are
        /// never exposed.
        detail: Option<String>,
    },
}

impl Outcome {
    /// `"<Entity> <name> was successfully <verb>!"`
    pub fn success(entity: EntityKind, name: Option<&str>, action: Action) -> Self {
        Self::Success {
            message: format!(
                "{} was successfully {}!",
                subject(entity, name),
                action.past_participle()
            ),
        }
    }

    /// `"An error occurred. <Entity> <name> could not be <verb>."`
    pub fn failure(
        entity: EntityKind,
        name: Option<&str>,
        action: Action,
        err: &RepoError,
    ) -> Self {
        let reason = FailureReason::of(err);
        let detail = match reason {
            FailureReason::StoreFailure => None,
            _ => Some(err.to_string()),
        };
        Self::Failure {
            reason,
            message: format!(
                "An error occurred. {} could not be {}.",
                subject(entity, name),
                action.past_participle()
            ),
            detail,
        }
    }

    /// Builds the outcome for a finished mutation.
    pub fn from_result<T>(
        entity: EntityKind,
        name: Option<&str>,
        action: Action,
        result: &Result<T, RepoError>,
    ) -> Self {
        match result {
            Ok(_) => Self::success(entity, name, action),
            Err(err) => Self::failure(entity, name, action, err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } | Self::Failure { message, .. } => message,
        }
    }

    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(*reason),
        }
    }
}

fn subject(entity: EntityKind, name: Option<&str>) -> String {
    match name.map(str::trim).filter(|value| !value.is_empty()) {
        Some(name) => format!("{} {name}", entity.label()),
        None => entity.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::validation::ValidationError;

    #[test]
    fn success_message_names_entity_and_verb() {
        let outcome = Outcome::success(EntityKind::Venue, Some("The Fillmore"), Action::Create);
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "Venue The Fillmore was successfully listed!");

        let outcome = Outcome::success(EntityKind::Show, None, Action::Create);
        assert_eq!(outcome.message(), "Show was successfully listed!");
    }

    #[test]
    fn failure_keeps_reason_and_client_detail() {
        let err = RepoError::Validation(ValidationError::new("city", "is required"));
        let outcome = Outcome::failure(
            EntityKind::Artist,
            Some("Guns N Petals"),
            Action::Update,
            &err,
        );
        assert_eq!(outcome.reason(), Some(FailureReason::Validation));
        assert_eq!(
            outcome.message(),
            "An error occurred. Artist Guns N Petals could not be updated."
        );
        match outcome {
            Outcome::Failure { detail, .. } => {
                assert_eq!(detail.as_deref(), Some("invalid `city`: is required"));
            }
            Outcome::Success { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn store_failures_hide_internal_detail() {
        let err = RepoError::InvalidData("bad row".to_string());
        let outcome = Outcome::failure(EntityKind::Venue, None, Action::Delete, &err);
        assert_eq!(outcome.reason(), Some(FailureReason::StoreFailure));
        assert!(matches!(outcome, Outcome::Failure { detail: None, .. }));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = Outcome::success(EntityKind::Venue, Some("Park Square"), Action::Delete);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Venue Park Square was successfully deleted!");
    }
}
