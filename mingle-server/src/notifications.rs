use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json,
};
use mingle_core::NotificationFilter;

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{clamp_limit, BroadcastSchema, NotificationQuery, ValidatedJson},
    serialized::{Message, Notification, ToSerialized, UnreadCount},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/notifications",
    tag = "notifications",
    params(NotificationQuery),
    security(("BearerAuth" = [])),
    responses((status = 200, body = Vec<Notification>))
)]
pub(crate) async fn list_notifications(
    session: Session,
    State(context): State<ServerContext>,
    Query(query): Query<NotificationQuery>,
) -> ServerResult<Json<Vec<Notification>>> {
    let notifications = context
        .mingle
        .notifications
        .list(
            session.user().id,
            NotificationFilter {
                unread_only: query.unread_only.unwrap_or(false),
                offset: query.skip.unwrap_or(0).max(0),
                limit: clamp_limit(query.limit, 20),
            },
        )
        .await?;

    Ok(Json(notifications.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/notifications/count",
    tag = "notifications",
    security(("BearerAuth" = [])),
    responses((status = 200, body = UnreadCount))
)]
pub(crate) async fn unread_count(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<UnreadCount>> {
    let unread_count = context
        .mingle
        .notifications
        .unread_count(session.user().id)
        .await?;

    Ok(Json(UnreadCount { unread_count }))
}

#[utoipa::path(
    patch,
    path = "/v1/notifications/{id}/read",
    tag = "notifications",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Notification),
        (status = 403, description = "The notification belongs to another user"),
        (status = 404, description = "The notification does not exist")
    )
)]
pub(crate) async fn mark_read(
    session: Session,
    State(context): State<ServerContext>,
    Path(notification_id): Path<i64>,
) -> ServerResult<Json<Notification>> {
    let notification = context
        .mingle
        .notifications
        .mark_read(session.user().id, notification_id)
        .await?;

    Ok(Json(notification.to_serialized()))
}

#[utoipa::path(
    patch,
    path = "/v1/notifications/read-all",
    tag = "notifications",
    security(("BearerAuth" = [])),
    responses((status = 200, body = Message))
)]
pub(crate) async fn mark_all_read(
    session: Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Message>> {
    let marked = context
        .mingle
        .notifications
        .mark_all_read(session.user().id)
        .await?;

    Ok(Json(Message {
        message: format!("{marked} notifications marked as read"),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/notifications/broadcast",
    tag = "notifications",
    request_body = BroadcastSchema,
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Vec<Notification>),
        (status = 403, description = "Only admins can broadcast")
    )
)]
pub(crate) async fn broadcast(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<BroadcastSchema>,
) -> ServerResult<Json<Vec<Notification>>> {
    let notifications = context
        .mingle
        .notifications
        .broadcast(session.user(), &body.title, &body.message, body.event_id)
        .await?;

    Ok(Json(notifications.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/count", get(unread_count))
        .route("/read-all", patch(mark_all_read))
        .route("/broadcast", post(broadcast))
        .route("/:id/read", patch(mark_read))
}

#[cfg(test)]
mod test {
    use crate::test_util::{create_event, register_and_login, send, test_app};
    use serde_json::json;

    #[tokio::test]
    async fn test_registration_drives_the_unread_count() {
        let (app, _dir) = test_app().await;

        let organizer = register_and_login(&app, "Jane Smith", "jane@example.com", "organizer")
            .await;
        let attendee = register_and_login(&app, "John Doe", "john@example.com", "attendee").await;

        let event_id = create_event(&app, &organizer, "Rust Meetup").await;

        let (_, body) = send(&app, "GET", "/v1/notifications/count", Some(&attendee), None).await;
        assert_eq!(body["unread_count"], 0);

        send(
            &app,
            "POST",
            &format!("/v1/events/{event_id}/register"),
            Some(&attendee),
            None,
        )
        .await;

        let (_, body) = send(&app, "GET", "/v1/notifications/count", Some(&attendee), None).await;
        assert_eq!(body["unread_count"], 1, "the confirmation should be unread");

        let (_, body) = send(&app, "GET", "/v1/notifications/count", Some(&organizer), None)
            .await;
        assert_eq!(body["unread_count"], 1, "the organizer hears about it too");

        let (status, body) = send(
            &app,
            "GET",
            "/v1/notifications?unread_only=true",
            Some(&attendee),
            None,
        )
        .await;

        assert_eq!(status, 200);

        let notifications = body.as_array().expect("array");
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["title"], "Registration confirmed");
        assert_eq!(notifications[0]["read"], false);
        assert_eq!(notifications[0]["event_id"], event_id);

        let (status, _) = send(
            &app,
            "PATCH",
            "/v1/notifications/read-all",
            Some(&attendee),
            None,
        )
        .await;
        assert_eq!(status, 200);

        let (_, body) = send(&app, "GET", "/v1/notifications/count", Some(&attendee), None).await;
        assert_eq!(body["unread_count"], 0, "mark-all should drive the count to 0");
    }

    #[tokio::test]
    async fn test_mark_read_is_owner_only() {
        let (app, _dir) = test_app().await;

        let organizer = register_and_login(&app, "Jane Smith", "jane@example.com", "organizer")
            .await;
        let attendee = register_and_login(&app, "John Doe", "john@example.com", "attendee").await;

        let event_id = create_event(&app, &organizer, "Rust Meetup").await;

        send(
            &app,
            "POST",
            &format!("/v1/events/{event_id}/register"),
            Some(&attendee),
            None,
        )
        .await;

        let (_, body) = send(&app, "GET", "/v1/notifications", Some(&attendee), None).await;
        let notification_id = body.as_array().expect("array")[0]["id"]
            .as_i64()
            .expect("notification has an id");

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/v1/notifications/{notification_id}/read"),
            Some(&organizer),
            None,
        )
        .await;

        assert_eq!(status, 403, "another user cannot mark the notification");
        assert_eq!(body["type"], "Forbidden");

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/v1/notifications/{notification_id}/read"),
            Some(&attendee),
            None,
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(body["read"], true);

        let (status, _) = send(
            &app,
            "PATCH",
            "/v1/notifications/999/read",
            Some(&attendee),
            None,
        )
        .await;

        assert_eq!(status, 404, "unknown notifications are not found");
    }

    #[tokio::test]
    async fn test_broadcast_is_admin_only() {
        let (app, _dir) = test_app().await;

        let admin = register_and_login(&app, "Admin", "admin@example.com", "admin").await;
        let attendee = register_and_login(&app, "John Doe", "john@example.com", "attendee").await;

        let payload = json!({ "title": "Maintenance", "message": "Downtime tonight" });

        let (status, body) = send(
            &app,
            "POST",
            "/v1/notifications/broadcast",
            Some(&attendee),
            Some(payload.clone()),
        )
        .await;

        assert_eq!(status, 403);
        assert_eq!(body["type"], "Forbidden");

        let (status, body) = send(
            &app,
            "POST",
            "/v1/notifications/broadcast",
            Some(&admin),
            Some(payload),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(
            body.as_array().expect("array").len(),
            2,
            "every user should be notified"
        );
    }
}
