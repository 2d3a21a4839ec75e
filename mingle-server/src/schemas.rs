use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::errors::ServerError;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterSchema {
    #[validate(length(min = 2, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
    /// attendee, organizer, or admin. Defaults to attendee, and admin is
    /// only accepted while no admin exists yet.
    pub role: Option<String>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 64))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewEventSchema {
    #[validate(length(min = 3, max = 255))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEventSchema {
    #[validate(length(min = 3, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCommentSchema {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastSchema {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    pub event_id: Option<i64>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleSchema {
    /// attendee, organizer, or admin
    pub role: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EventFilterQuery {
    /// Substring to search for in event titles
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub unread_only: Option<bool>,
}

/// Clamps a requested page size into a sane range
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, 100)
}

/// Events can only be created or moved into the future
pub fn ensure_future_date(date: &DateTime<Utc>) -> Result<(), ServerError> {
    if *date <= Utc::now() {
        return Err(ServerError::Validation(
            "date must be in the future".to_string(),
        ));
    }

    Ok(())
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e| ServerError::Validation(e.to_string()))?;

        extracted_json
            .0
            .validate()
            .map_err(|e| ServerError::Validation(e.to_string()))?;

        Ok(Self(extracted_json.0))
    }
}
