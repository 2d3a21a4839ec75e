use std::str::FromStr;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{header, request::Parts},
    routing::{get, post},
    Json,
};
use mingle_core::{Credentials, NewPlainUser, SessionData, UserData, UserRole};

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{LoginSchema, RegisterSchema, ValidatedJson},
    serialized::{LoginResult, Message, Registration, ToSerialized, User},
    Router,
};

/// Wraps [SessionData] so [FromRequestParts] can be implemented for it
pub struct Session(SessionData);

impl Session {
    /// Returns the user of the session
    pub fn user(&self) -> &UserData {
        &self.0.user
    }

    pub fn token(&self) -> &str {
        &self.0.token
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    ServerContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|x| x.to_str().ok())
            .ok_or(ServerError::Unauthorized)?;

        let parts: Vec<_> = header_value.split_ascii_whitespace().collect();

        if parts.first() != Some(&"Bearer") {
            return Err(ServerError::Unauthorized);
        }

        let token = parts.last().cloned().unwrap_or_default();

        let session = context
            .mingle
            .auth
            .session(token)
            .await
            .map_err(|_| ServerError::Unauthorized)?;

        Ok(Self(session))
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterSchema,
    responses(
        (status = 200, body = User),
        (status = 409, description = "The email is already taken")
    )
)]
pub(crate) async fn register(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> ServerResult<Json<User>> {
    let role = match body.role.as_deref() {
        Some(role) => UserRole::from_str(role).map_err(|e| ServerError::Validation(e.to_string()))?,
        None => UserRole::Attendee,
    };

    let user = context
        .mingle
        .auth
        .register(NewPlainUser {
            name: body.name,
            email: body.email,
            password: body.password,
            role,
        })
        .await?;

    Ok(Json(user.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginSchema,
    responses(
        (status = 200, body = LoginResult),
        (status = 401, description = "The credentials are invalid")
    )
)]
pub(crate) async fn login(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<Json<LoginResult>> {
    let session = context
        .mingle
        .auth
        .login(Credentials {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(session.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    security(("BearerAuth" = [])),
    responses((status = 200, body = Message))
)]
pub(crate) async fn logout(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Message>> {
    context.mingle.auth.logout(session.token()).await?;

    Ok(Json(Message {
        message: "Logged out".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/auth/user",
    tag = "auth",
    security(("BearerAuth" = [])),
    responses((status = 200, body = User))
)]
pub(crate) async fn user(session: Session) -> Json<User> {
    Json(session.user().to_serialized())
}

#[utoipa::path(
    get,
    path = "/v1/auth/user/registrations",
    tag = "auth",
    security(("BearerAuth" = [])),
    responses((status = 200, body = Vec<Registration>))
)]
pub(crate) async fn my_registrations(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Registration>>> {
    let registrations = context
        .mingle
        .registrations
        .list_for_user(session.user().id)
        .await?;

    Ok(Json(registrations.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(user))
        .route("/user/registrations", get(my_registrations))
}
