use async_trait::async_trait;
use thiserror::Error;

mod data;
pub use data::*;

mod sqlite;
pub use sqlite::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    /// Turns a unique constraint violation into a conflict, so a race
    /// that slips past a duplicate pre-check still surfaces correctly
    fn conflict_or_any(self, resource: &'static str, field: &'static str, value: &str)
        -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(e) => match e {
                DatabaseError::NotFound {
                    resource: _,
                    identifier: _,
                } => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Represents a type that can fetch mingle data from a database
#[async_trait]
pub trait Database: Send + Sync + 'static {
    async fn check_for_admin(&self) -> Result<bool>;
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    async fn user_by_email(&self, email: &str) -> Result<UserData>;
    async fn list_users(&self) -> Result<Vec<UserData>>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;
    async fn update_user_role(&self, user_id: PrimaryKey, role: UserRole) -> Result<UserData>;
    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()>;

    async fn session_by_token(&self, token: &str) -> Result<SessionData>;
    async fn create_session(&self, new_session: NewSession) -> Result<SessionData>;
    async fn delete_session_by_token(&self, token: &str) -> Result<()>;
    async fn clear_expired_sessions(&self) -> Result<()>;

    async fn event_by_id(&self, event_id: PrimaryKey) -> Result<EventData>;
    async fn list_events(&self, filter: EventFilter) -> Result<Vec<EventData>>;
    async fn create_event(&self, new_event: NewEvent) -> Result<EventData>;
    async fn update_event(&self, updated_event: UpdatedEvent) -> Result<EventData>;
    async fn delete_event(&self, event_id: PrimaryKey) -> Result<()>;

    async fn registration_by_pair(
        &self,
        user_id: PrimaryKey,
        event_id: PrimaryKey,
    ) -> Result<RegistrationData>;
    async fn registrations_by_event(&self, event_id: PrimaryKey) -> Result<Vec<RegistrationData>>;
    async fn registrations_by_user(&self, user_id: PrimaryKey) -> Result<Vec<RegistrationData>>;
    /// Inserts the registration and its ticket as one atomic unit
    async fn create_registration_with_ticket(
        &self,
        new_registration: NewRegistration,
        ticket_code: &str,
    ) -> Result<RegistrationData>;
    /// Deletes the registration and its ticket, returning the deleted
    /// record so callers can notify the parties involved
    async fn delete_registration(
        &self,
        user_id: PrimaryKey,
        event_id: PrimaryKey,
    ) -> Result<RegistrationData>;

    async fn ticket_by_code(&self, code: &str) -> Result<TicketData>;

    async fn comment_by_id(&self, comment_id: PrimaryKey) -> Result<CommentData>;
    async fn comments_by_event(&self, event_id: PrimaryKey, page: Page)
        -> Result<Vec<CommentData>>;
    async fn create_comment(&self, new_comment: NewComment) -> Result<CommentData>;
    async fn delete_comment(&self, comment_id: PrimaryKey) -> Result<()>;

    async fn notification_by_id(&self, notification_id: PrimaryKey) -> Result<NotificationData>;
    async fn notifications_by_user(
        &self,
        user_id: PrimaryKey,
        filter: NotificationFilter,
    ) -> Result<Vec<NotificationData>>;
    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData>;
    async fn mark_notification_read(&self, notification_id: PrimaryKey)
        -> Result<NotificationData>;
    async fn mark_all_notifications_read(&self, user_id: PrimaryKey) -> Result<u64>;
    async fn unread_notification_count(&self, user_id: PrimaryKey) -> Result<i64>;
}
