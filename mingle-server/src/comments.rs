use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json,
};
use mingle_core::Page;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{clamp_limit, NewCommentSchema, PageQuery, ValidatedJson},
    serialized::{Comment, Message, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/v1/events/{id}/comments",
    tag = "comments",
    request_body = NewCommentSchema,
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Comment),
        (status = 404, description = "The event does not exist")
    )
)]
pub(crate) async fn create_comment(
    session: Session,
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<NewCommentSchema>,
) -> ServerResult<Json<Comment>> {
    let comment = context
        .mingle
        .comments
        .create(session.user(), event_id, body.content)
        .await?;

    Ok(Json(comment.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/events/{id}/comments",
    tag = "comments",
    params(PageQuery),
    responses(
        (status = 200, body = Vec<Comment>),
        (status = 404, description = "The event does not exist")
    )
)]
pub(crate) async fn list_comments(
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> ServerResult<Json<Vec<Comment>>> {
    let comments = context
        .mingle
        .comments
        .list(
            event_id,
            Page {
                offset: query.skip.unwrap_or(0).max(0),
                limit: clamp_limit(query.limit, 50),
            },
        )
        .await?;

    Ok(Json(comments.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/comments/{id}",
    tag = "comments",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Message),
        (status = 403, description = "Only the author or an admin can delete the comment")
    )
)]
pub(crate) async fn delete_comment(
    session: Session,
    State(context): State<ServerContext>,
    Path(comment_id): Path<i64>,
) -> ServerResult<Json<Message>> {
    context
        .mingle
        .comments
        .delete(session.user(), comment_id)
        .await?;

    Ok(Json(Message {
        message: "Comment deleted successfully".to_string(),
    }))
}

/// Routes that hang off the events router
pub fn event_router() -> Router {
    Router::new()
        .route("/:id/comments", post(create_comment))
        .route("/:id/comments", get(list_comments))
}

pub fn router() -> Router {
    Router::new().route("/:id", delete(delete_comment))
}
