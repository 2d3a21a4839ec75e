use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The type used for primary keys in the database.
pub type PrimaryKey = i64;

/// The closed set of roles a user can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Attendee,
    Organizer,
    Admin,
}

#[derive(Debug, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(String);

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attendee => "attendee",
            Self::Organizer => "organizer",
            Self::Admin => "admin",
        }
    }

    /// Whether this role is allowed to create and manage events
    pub fn can_organize(&self) -> bool {
        matches!(self, Self::Organizer | Self::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attendee" => Ok(Self::Attendee),
            "organizer" => Ok(Self::Organizer),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A mingle account
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: PrimaryKey,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Login session data for authentication
#[derive(Debug, Clone)]
pub struct SessionData {
    pub id: PrimaryKey,
    /// The session token, or key if you will
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The user that is logged in
    pub user: UserData,
}

/// A mingle event
#[derive(Debug, Clone)]
pub struct EventData {
    pub id: PrimaryKey,
    pub title: String,
    pub description: Option<String>,
    /// When the event takes place
    pub date: DateTime<Utc>,
    pub organizer: UserData,
}

/// A user's registration for an event
#[derive(Debug, Clone)]
pub struct RegistrationData {
    pub id: PrimaryKey,
    pub event_id: PrimaryKey,
    pub created_at: DateTime<Utc>,
    pub user: UserData,
    /// Always present for a live registration, since the ticket is
    /// created in the same transaction
    pub ticket: Option<TicketData>,
}

/// Proof of registration, issued exactly once per registration
#[derive(Debug, Clone)]
pub struct TicketData {
    pub id: PrimaryKey,
    /// The unique opaque code identifying the ticket
    pub code: String,
    pub registration_id: PrimaryKey,
}

/// A comment posted on an event
#[derive(Debug, Clone)]
pub struct CommentData {
    pub id: PrimaryKey,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub event_id: PrimaryKey,
    pub user: UserData,
}

/// A notification delivered to a single user
#[derive(Debug, Clone)]
pub struct NotificationData {
    pub id: PrimaryKey,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: PrimaryKey,
    /// The event this notification is about, if any
    pub event_id: Option<PrimaryKey>,
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub user_id: PrimaryKey,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    /// The organizer of the new event
    pub organizer_id: PrimaryKey,
}

#[derive(Debug)]
pub struct UpdatedEvent {
    pub id: PrimaryKey,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct NewRegistration {
    pub user_id: PrimaryKey,
    pub event_id: PrimaryKey,
}

#[derive(Debug)]
pub struct NewComment {
    pub content: String,
    pub user_id: PrimaryKey,
    pub event_id: PrimaryKey,
}

#[derive(Debug)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub user_id: PrimaryKey,
    pub event_id: Option<PrimaryKey>,
}

/// Filtering and pagination for event listings
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Substring to match against event titles
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            search: None,
            from: None,
            until: None,
            offset: 0,
            limit: 50,
        }
    }
}

/// Filtering and pagination for notification listings
#[derive(Debug, Clone)]
pub struct NotificationFilter {
    pub unread_only: bool,
    pub offset: i64,
    pub limit: i64,
}

impl Default for NotificationFilter {
    fn default() -> Self {
        Self {
            unread_only: false,
            offset: 0,
            limit: 20,
        }
    }
}

/// Plain pagination for comment listings
#[derive(Debug, Clone)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}
