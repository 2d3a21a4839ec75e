use std::borrow::BorrowMut;

use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{admin, auth, comments, events, notifications, schemas, serialized, tickets};

#[derive(OpenApi)]
#[openapi(
    modifiers(&Security),
    info(
        description = "mingle-server exposes endpoints to manage events, registrations, tickets, and notifications"
    ),
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::user,
        auth::my_registrations,
        events::list_events,
        events::get_event,
        events::create_event,
        events::update_event,
        events::delete_event,
        events::register_for_event,
        events::cancel_registration,
        events::list_attendees,
        comments::create_comment,
        comments::list_comments,
        comments::delete_comment,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::broadcast,
        admin::list_users,
        admin::change_role,
        admin::delete_user,
        tickets::ticket_artifact,
    ),
    components(schemas(
        schemas::RegisterSchema,
        schemas::LoginSchema,
        schemas::NewEventSchema,
        schemas::UpdateEventSchema,
        schemas::NewCommentSchema,
        schemas::BroadcastSchema,
        schemas::RoleSchema,
        serialized::User,
        serialized::LoginResult,
        serialized::Event,
        serialized::Attendee,
        serialized::Registration,
        serialized::RegisterResult,
        serialized::Comment,
        serialized::Notification,
        serialized::UnreadCount,
        serialized::Message,
    ))
)]
pub struct ApiDoc;

struct Security;

impl Modify for Security {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.borrow_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("Bearer <token>")
                .build();

            components.add_security_scheme("BearerAuth", SecurityScheme::Http(scheme))
        }
    }
}

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
