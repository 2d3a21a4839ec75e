use std::str::FromStr;

use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json,
};
use mingle_core::UserRole;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{RoleSchema, ValidatedJson},
    serialized::{Message, ToSerialized, User},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "admin",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Vec<User>),
        (status = 403, description = "The caller is not an admin")
    )
)]
pub(crate) async fn list_users(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<User>>> {
    let users = context.mingle.auth.list_users(session.user()).await?;

    Ok(Json(users.to_serialized()))
}

#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}/role",
    tag = "admin",
    request_body = RoleSchema,
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = User),
        (status = 403, description = "The caller is not an admin"),
        (status = 404, description = "The user does not exist")
    )
)]
pub(crate) async fn change_role(
    session: Session,
    State(context): State<ServerContext>,
    Path(user_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<RoleSchema>,
) -> ServerResult<Json<User>> {
    let role =
        UserRole::from_str(&body.role).map_err(|e| ServerError::Validation(e.to_string()))?;

    let user = context
        .mingle
        .auth
        .change_role(session.user(), user_id, role)
        .await?;

    Ok(Json(user.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/admin/users/{id}",
    tag = "admin",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Message),
        (status = 403, description = "The caller is not an admin"),
        (status = 404, description = "The user does not exist")
    )
)]
pub(crate) async fn delete_user(
    session: Session,
    State(context): State<ServerContext>,
    Path(user_id): Path<i64>,
) -> ServerResult<Json<Message>> {
    context
        .mingle
        .auth
        .delete_user(session.user(), user_id)
        .await?;

    Ok(Json(Message {
        message: "User deleted".to_string(),
    }))
}

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/role", put(change_role))
        .route("/users/:id", delete(delete_user))
}
