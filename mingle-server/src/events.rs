use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json,
};
use mingle_core::{EventFilter, NewEventInput, UpdatedEvent};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{
        clamp_limit, ensure_future_date, EventFilterQuery, NewEventSchema, UpdateEventSchema,
        ValidatedJson,
    },
    serialized::{Attendee, Event, Message, RegisterResult, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/events",
    tag = "events",
    params(EventFilterQuery),
    responses((status = 200, body = Vec<Event>))
)]
pub(crate) async fn list_events(
    State(context): State<ServerContext>,
    Query(query): Query<EventFilterQuery>,
) -> ServerResult<Json<Vec<Event>>> {
    let events = context
        .mingle
        .events
        .list(EventFilter {
            search: query.search,
            from: query.from,
            until: query.until,
            offset: query.skip.unwrap_or(0).max(0),
            limit: clamp_limit(query.limit, 50),
        })
        .await?;

    Ok(Json(events.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/events/{id}",
    tag = "events",
    responses(
        (status = 200, body = Event),
        (status = 404, description = "The event does not exist")
    )
)]
pub(crate) async fn get_event(
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
) -> ServerResult<Json<Event>> {
    let event = context.mingle.events.get(event_id).await?;

    Ok(Json(event.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/events",
    tag = "events",
    request_body = NewEventSchema,
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Event),
        (status = 403, description = "The caller cannot create events")
    )
)]
pub(crate) async fn create_event(
    session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewEventSchema>,
) -> ServerResult<Json<Event>> {
    ensure_future_date(&body.date)?;

    let event = context
        .mingle
        .events
        .create(
            session.user(),
            NewEventInput {
                title: body.title,
                description: body.description,
                date: body.date,
            },
        )
        .await?;

    Ok(Json(event.to_serialized()))
}

#[utoipa::path(
    patch,
    path = "/v1/events/{id}",
    tag = "events",
    request_body = UpdateEventSchema,
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Event),
        (status = 403, description = "Only the organizer can update the event")
    )
)]
pub(crate) async fn update_event(
    session: Session,
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateEventSchema>,
) -> ServerResult<Json<Event>> {
    if let Some(date) = &body.date {
        ensure_future_date(date)?;
    }

    let event = context
        .mingle
        .events
        .update(
            session.user(),
            UpdatedEvent {
                id: event_id,
                title: body.title,
                description: body.description,
                date: body.date,
            },
        )
        .await?;

    Ok(Json(event.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/events/{id}",
    tag = "events",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Message),
        (status = 403, description = "Only the organizer or an admin can delete the event")
    )
)]
pub(crate) async fn delete_event(
    session: Session,
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
) -> ServerResult<Json<Message>> {
    context.mingle.events.delete(session.user(), event_id).await?;

    Ok(Json(Message {
        message: "Event deleted".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/v1/events/{id}/register",
    tag = "events",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = RegisterResult),
        (status = 404, description = "The event does not exist"),
        (status = 409, description = "The caller is already registered")
    )
)]
pub(crate) async fn register_for_event(
    session: Session,
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
) -> ServerResult<Json<RegisterResult>> {
    let registration = context
        .mingle
        .registrations
        .register(session.user().id, event_id)
        .await?;

    let ticket_code = registration
        .ticket
        .map(|t| t.code)
        .unwrap_or_default();

    Ok(Json(RegisterResult {
        message: "Registered successfully".to_string(),
        ticket_url: format!("/v1/tickets/{ticket_code}"),
        ticket_code,
    }))
}

#[utoipa::path(
    delete,
    path = "/v1/events/{id}/register",
    tag = "events",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Message),
        (status = 404, description = "No such registration exists")
    )
)]
pub(crate) async fn cancel_registration(
    session: Session,
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
) -> ServerResult<Json<Message>> {
    context
        .mingle
        .registrations
        .cancel(session.user().id, event_id)
        .await?;

    Ok(Json(Message {
        message: "Registration cancelled".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/v1/events/{id}/attendees",
    tag = "events",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Vec<Attendee>),
        (status = 403, description = "Only the organizer can view attendees")
    )
)]
pub(crate) async fn list_attendees(
    session: Session,
    State(context): State<ServerContext>,
    Path(event_id): Path<i64>,
) -> ServerResult<Json<Vec<Attendee>>> {
    let attendees = context
        .mingle
        .registrations
        .list_attendees(session.user(), event_id)
        .await?;

    Ok(Json(attendees.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_events))
        .route("/", post(create_event))
        .route("/:id", get(get_event))
        .route("/:id", patch(update_event))
        .route("/:id", delete(delete_event))
        .route("/:id/register", post(register_for_event))
        .route("/:id/register", delete(cancel_registration))
        .route("/:id/attendees", get(list_attendees))
}
