use log::warn;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    Database, DatabaseError, MingleContext, NewNotification, NotificationData,
    NotificationFilter, PrimaryKey, UserData,
};

/// Creates and manages per-user notifications.
///
/// Fan-out to a recipient set is best effort: one recipient failing never
/// blocks the others, and callers treat the whole fan-out as advisory.
pub struct NotificationManager<Db> {
    db: Arc<Db>,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification belongs to another user")]
    NotRecipient,
    #[error("Only admins can broadcast notifications")]
    AdminOnly,
    #[error(transparent)]
    Db(DatabaseError),
}

impl<Db> NotificationManager<Db>
where
    Db: Database,
{
    pub fn new(context: &MingleContext<Db>) -> Self {
        Self {
            db: context.database.clone(),
        }
    }

    /// Records a single notification for a user
    pub async fn notify_user(
        &self,
        user_id: PrimaryKey,
        title: &str,
        message: &str,
        event_id: Option<PrimaryKey>,
    ) -> Result<NotificationData, DatabaseError> {
        self.db
            .create_notification(NewNotification {
                title: title.to_string(),
                message: message.to_string(),
                user_id,
                event_id,
            })
            .await
    }

    /// Records one notification per registrant of an event, except the
    /// excluded user. Failures for individual recipients are logged and
    /// skipped so the rest of the fan-out still happens.
    pub async fn notify_event_participants(
        &self,
        event_id: PrimaryKey,
        title: &str,
        message: &str,
        exclude_user_id: Option<PrimaryKey>,
    ) -> Result<Vec<NotificationData>, DatabaseError> {
        let registrations = self.db.registrations_by_event(event_id).await?;

        let mut created = Vec::new();

        for registration in registrations {
            if Some(registration.user.id) == exclude_user_id {
                continue;
            }

            match self
                .notify_user(registration.user.id, title, message, Some(event_id))
                .await
            {
                Ok(notification) => created.push(notification),
                Err(e) => warn!(
                    "Could not notify user {} about event {}: {}",
                    registration.user.id, event_id, e
                ),
            }
        }

        Ok(created)
    }

    /// Marks a notification as read, if it belongs to the user
    pub async fn mark_read(
        &self,
        user_id: PrimaryKey,
        notification_id: PrimaryKey,
    ) -> Result<NotificationData, NotificationError> {
        let notification = self
            .db
            .notification_by_id(notification_id)
            .await
            .map_err(NotificationError::Db)?;

        if notification.user_id != user_id {
            return Err(NotificationError::NotRecipient);
        }

        self.db
            .mark_notification_read(notification_id)
            .await
            .map_err(NotificationError::Db)
    }

    /// Marks every unread notification of the user as read
    pub async fn mark_all_read(&self, user_id: PrimaryKey) -> Result<u64, DatabaseError> {
        self.db.mark_all_notifications_read(user_id).await
    }

    pub async fn unread_count(&self, user_id: PrimaryKey) -> Result<i64, DatabaseError> {
        self.db.unread_notification_count(user_id).await
    }

    pub async fn list(
        &self,
        user_id: PrimaryKey,
        filter: NotificationFilter,
    ) -> Result<Vec<NotificationData>, DatabaseError> {
        self.db.notifications_by_user(user_id, filter).await
    }

    /// Sends a notification to every user. Best effort, like the
    /// participant fan-out.
    pub async fn broadcast(
        &self,
        actor: &UserData,
        title: &str,
        message: &str,
        event_id: Option<PrimaryKey>,
    ) -> Result<Vec<NotificationData>, NotificationError> {
        if !actor.role.is_admin() {
            return Err(NotificationError::AdminOnly);
        }

        let users = self.db.list_users().await.map_err(NotificationError::Db)?;

        let mut created = Vec::new();

        for user in users {
            match self.notify_user(user.id, title, message, event_id).await {
                Ok(notification) => created.push(notification),
                Err(e) => warn!("Could not notify user {} in broadcast: {}", user.id, e),
            }
        }

        Ok(created)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        test_util::{create_event, create_user, test_mingle},
        UserRole,
    };

    #[tokio::test]
    async fn test_fan_out_excludes_one_user() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        let mut registrants = Vec::new();

        for n in 0..3 {
            let user = create_user(
                &mingle,
                &format!("Attendee {n}"),
                &format!("attendee{n}@example.com"),
                UserRole::Attendee,
            )
            .await;

            mingle
                .registrations
                .register(user.id, event.id)
                .await
                .expect("registration succeeds");

            registrants.push(user);
        }

        let created = mingle
            .notifications
            .notify_event_participants(
                event.id,
                "Schedule change",
                "The event moved by an hour",
                Some(registrants[0].id),
            )
            .await
            .expect("fan-out succeeds");

        assert_eq!(
            created.len(),
            2,
            "the excluded registrant should not be notified"
        );
        assert!(
            created.iter().all(|n| n.user_id != registrants[0].id),
            "no notification should target the excluded user"
        );
        assert!(
            created.iter().all(|n| n.event_id == Some(event.id)),
            "notifications should reference the event"
        );
    }

    #[tokio::test]
    async fn test_mark_read_ownership() {
        let (mingle, _dir) = test_mingle().await;

        let owner = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let other = create_user(&mingle, "Mallory", "mallory@example.com", UserRole::Attendee)
            .await;

        let notification = mingle
            .notifications
            .notify_user(owner.id, "Hello", "A message", None)
            .await
            .expect("notification is created");

        let result = mingle
            .notifications
            .mark_read(other.id, notification.id)
            .await;

        assert!(
            matches!(result, Err(NotificationError::NotRecipient)),
            "another user cannot mark the notification read"
        );

        let marked = mingle
            .notifications
            .mark_read(owner.id, notification.id)
            .await
            .expect("the recipient can mark it read");

        assert!(marked.read, "the notification should now be read");
        assert_eq!(
            mingle
                .notifications
                .unread_count(owner.id)
                .await
                .expect("count is fetched"),
            0
        );
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_user() {
        let (mingle, _dir) = test_mingle().await;

        let admin = create_user(&mingle, "Admin", "admin@example.com", UserRole::Admin).await;
        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;

        let created = mingle
            .notifications
            .broadcast(&admin, "Maintenance", "Scheduled downtime tonight", None)
            .await
            .expect("broadcast succeeds");

        assert_eq!(created.len(), 3, "every user should get a notification");

        let result = mingle
            .notifications
            .broadcast(&attendee, "Maintenance", "Scheduled downtime tonight", None)
            .await;

        assert!(
            matches!(result, Err(NotificationError::AdminOnly)),
            "a non-admin cannot broadcast"
        );
    }
}
