//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from core data

use chrono::{DateTime, Utc};
use mingle_core::{
    CommentData, EventData, NotificationData, RegistrationData, SessionData, UserData,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    id: i64,
    name: String,
    email: String,
    role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResult {
    token: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Event {
    id: i64,
    title: String,
    description: Option<String>,
    date: DateTime<Utc>,
    organizer: User,
}

/// One row of an event's attendee list
#[derive(Debug, Serialize, ToSchema)]
pub struct Attendee {
    id: i64,
    user: User,
    ticket_code: Option<String>,
}

/// A registration as seen by the registered user themselves
#[derive(Debug, Serialize, ToSchema)]
pub struct Registration {
    id: i64,
    event_id: i64,
    created_at: DateTime<Utc>,
    ticket_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResult {
    pub message: String,
    pub ticket_code: String,
    pub ticket_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Comment {
    id: i64,
    content: String,
    created_at: DateTime<Utc>,
    event_id: i64,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Notification {
    id: i64,
    title: String,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
    event_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCount {
    pub unread_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Message {
    pub message: String,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.to_string(),
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<Event> for EventData {
    fn to_serialized(&self) -> Event {
        Event {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            organizer: self.organizer.to_serialized(),
        }
    }
}

impl ToSerialized<Attendee> for RegistrationData {
    fn to_serialized(&self) -> Attendee {
        Attendee {
            id: self.id,
            user: self.user.to_serialized(),
            ticket_code: self.ticket.as_ref().map(|t| t.code.clone()),
        }
    }
}

impl ToSerialized<Registration> for RegistrationData {
    fn to_serialized(&self) -> Registration {
        Registration {
            id: self.id,
            event_id: self.event_id,
            created_at: self.created_at,
            ticket_code: self.ticket.as_ref().map(|t| t.code.clone()),
        }
    }
}

impl ToSerialized<Comment> for CommentData {
    fn to_serialized(&self) -> Comment {
        Comment {
            id: self.id,
            content: self.content.clone(),
            created_at: self.created_at,
            event_id: self.event_id,
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<Notification> for NotificationData {
    fn to_serialized(&self) -> Notification {
        Notification {
            id: self.id,
            title: self.title.clone(),
            message: self.message.clone(),
            read: self.read,
            created_at: self.created_at,
            event_id: self.event_id,
        }
    }
}
