use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    Database, DatabaseError, DatabaseResult, MingleContext, NewRegistration, NotificationManager,
    PrimaryKey, RegistrationData, TicketError, TicketManager, UserData,
};

/// The registration workflow: the ledger of who attends what, plus the
/// orchestration that turns a registration request into a registration
/// row, a ticket, a QR artifact, and a round of notifications.
pub struct RegistrationManager<Db> {
    db: Arc<Db>,
    tickets: TicketManager<Db>,
    notifications: NotificationManager<Db>,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Only the event organizer can view the attendee list")]
    NotEventOrganizer,
    #[error(transparent)]
    Ticket(TicketError),
    #[error(transparent)]
    Db(DatabaseError),
}

impl<Db> RegistrationManager<Db>
where
    Db: Database,
{
    pub fn new(context: &MingleContext<Db>) -> Self {
        Self {
            db: context.database.clone(),
            tickets: TicketManager::new(context),
            notifications: NotificationManager::new(context),
        }
    }

    /// Registers a user for an event.
    ///
    /// The registration row and its ticket are inserted as one atomic
    /// unit, after the QR artifact is safely on disk. If the insert fails
    /// the artifact is removed again, so either both persist or neither
    /// does. Notifications happen last and are best effort.
    pub async fn register(
        &self,
        user_id: PrimaryKey,
        event_id: PrimaryKey,
    ) -> Result<RegistrationData, RegistrationError> {
        let event = self.db.event_by_id(event_id).await.map_err(RegistrationError::Db)?;

        // Surface the duplicate before doing any artifact work
        self.db
            .registration_by_pair(user_id, event_id)
            .await
            .conflict_or_ok(
                "registration",
                "user:event",
                format!("{user_id}:{event_id}").as_str(),
            )
            .map_err(RegistrationError::Db)?;

        let code = self.tickets.mint_code();

        self.tickets
            .write_artifact(&code)
            .await
            .map_err(RegistrationError::Ticket)?;

        let registration = match self
            .db
            .create_registration_with_ticket(NewRegistration { user_id, event_id }, &code)
            .await
        {
            Ok(registration) => registration,
            Err(e) => {
                self.tickets.discard_artifact(&code).await;
                return Err(RegistrationError::Db(e));
            }
        };

        info!(
            "{} registered for event '{}'",
            registration.user.name, event.title
        );

        self.notify(
            user_id,
            "Registration confirmed",
            &format!(
                "You are registered for '{}'. Your ticket code is {}.",
                event.title, code
            ),
            Some(event_id),
        )
        .await;

        if event.organizer.id != user_id {
            self.notify(
                event.organizer.id,
                "New registration",
                &format!(
                    "{} registered for your event '{}'.",
                    registration.user.name, event.title
                ),
                Some(event_id),
            )
            .await;
        }

        Ok(registration)
    }

    /// Cancels a registration, deleting it together with its ticket and
    /// returning the deleted record. The artifact file is left behind for
    /// out-of-band cleanup.
    pub async fn cancel(
        &self,
        user_id: PrimaryKey,
        event_id: PrimaryKey,
    ) -> Result<RegistrationData, RegistrationError> {
        let event = self.db.event_by_id(event_id).await.map_err(RegistrationError::Db)?;

        let registration = self
            .db
            .delete_registration(user_id, event_id)
            .await
            .map_err(RegistrationError::Db)?;

        info!(
            "{} cancelled their registration for event '{}'",
            registration.user.name, event.title
        );

        self.notify(
            user_id,
            "Registration cancelled",
            &format!("Your registration for '{}' has been cancelled.", event.title),
            Some(event_id),
        )
        .await;

        if event.organizer.id != user_id {
            self.notify(
                event.organizer.id,
                "Registration cancelled",
                &format!(
                    "{} cancelled their registration for your event '{}'.",
                    registration.user.name, event.title
                ),
                Some(event_id),
            )
            .await;
        }

        Ok(registration)
    }

    /// Lists the registrations for an event, including ticket codes.
    /// Restricted to the owning organizer and admins.
    pub async fn list_attendees(
        &self,
        actor: &UserData,
        event_id: PrimaryKey,
    ) -> Result<Vec<RegistrationData>, RegistrationError> {
        let event = self.db.event_by_id(event_id).await.map_err(RegistrationError::Db)?;

        if event.organizer.id != actor.id && !actor.role.is_admin() {
            return Err(RegistrationError::NotEventOrganizer);
        }

        self.db
            .registrations_by_event(event_id)
            .await
            .map_err(RegistrationError::Db)
    }

    /// Lists everything a user is registered for
    pub async fn list_for_user(
        &self,
        user_id: PrimaryKey,
    ) -> Result<Vec<RegistrationData>, DatabaseError> {
        self.db.registrations_by_user(user_id).await
    }

    async fn notify(
        &self,
        user_id: PrimaryKey,
        title: &str,
        message: &str,
        event_id: Option<PrimaryKey>,
    ) {
        if let Err(e) = self
            .notifications
            .notify_user(user_id, title, message, event_id)
            .await
        {
            warn!("Could not notify user {}: {}", user_id, e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        test_util::{create_event, create_user, test_mingle},
        tickets::artifact_exists,
        NotificationFilter, UserRole,
    };

    #[tokio::test]
    async fn test_register_issues_a_ticket() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        let registration = mingle
            .registrations
            .register(attendee.id, event.id)
            .await
            .expect("registration succeeds");

        let ticket = registration.ticket.expect("a ticket is attached");
        assert_eq!(ticket.code.len(), 32, "the code is a full token");
        assert!(
            ticket.code.chars().all(|c| c.is_ascii_alphanumeric()),
            "the code is alphanumeric"
        );

        assert!(
            artifact_exists(&mingle.tickets.artifact_path(&ticket.code)).await,
            "the QR artifact should be on disk"
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        mingle
            .registrations
            .register(attendee.id, event.id)
            .await
            .expect("first registration succeeds");

        let result = mingle.registrations.register(attendee.id, event.id).await;

        assert!(
            matches!(
                result,
                Err(RegistrationError::Db(DatabaseError::Conflict { .. }))
            ),
            "registering twice for the same event should conflict"
        );
    }

    #[tokio::test]
    async fn test_register_for_missing_event() {
        let (mingle, _dir) = test_mingle().await;

        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;

        let result = mingle.registrations.register(attendee.id, 999).await;

        assert!(
            matches!(
                result,
                Err(RegistrationError::Db(DatabaseError::NotFound { .. }))
            ),
            "registering for a missing event should fail"
        );
    }

    #[tokio::test]
    async fn test_cancel_then_register_again() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        let first = mingle
            .registrations
            .register(attendee.id, event.id)
            .await
            .expect("registration succeeds");

        mingle
            .registrations
            .cancel(attendee.id, event.id)
            .await
            .expect("cancellation succeeds");

        let result = mingle.registrations.cancel(attendee.id, event.id).await;
        assert!(
            matches!(
                result,
                Err(RegistrationError::Db(DatabaseError::NotFound { .. }))
            ),
            "cancelling twice should fail"
        );

        let second = mingle
            .registrations
            .register(attendee.id, event.id)
            .await
            .expect("registering again succeeds");

        let first_code = first.ticket.expect("ticket is attached").code;
        let second_code = second.ticket.expect("ticket is attached").code;

        assert_ne!(
            first_code, second_code,
            "every issued ticket should have a fresh code"
        );
    }

    #[tokio::test]
    async fn test_registration_notifies_both_parties() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        mingle
            .registrations
            .register(attendee.id, event.id)
            .await
            .expect("registration succeeds");

        let attendee_notifications = mingle
            .notifications
            .list(attendee.id, NotificationFilter::default())
            .await
            .expect("notifications are listed");

        assert_eq!(attendee_notifications.len(), 1);
        assert_eq!(attendee_notifications[0].title, "Registration confirmed");
        assert!(
            attendee_notifications[0]
                .message
                .contains("Your ticket code is"),
            "the confirmation should carry the ticket code"
        );

        let organizer_notifications = mingle
            .notifications
            .list(organizer.id, NotificationFilter::default())
            .await
            .expect("notifications are listed");

        assert_eq!(organizer_notifications.len(), 1);
        assert_eq!(organizer_notifications[0].title, "New registration");
    }

    #[tokio::test]
    async fn test_organizer_registering_is_notified_once() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        mingle
            .registrations
            .register(organizer.id, event.id)
            .await
            .expect("registration succeeds");

        assert_eq!(
            mingle
                .notifications
                .unread_count(organizer.id)
                .await
                .expect("count is fetched"),
            1,
            "the organizer should only get the confirmation"
        );
    }

    #[tokio::test]
    async fn test_attendee_listing_permissions() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let a = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let b = create_user(&mingle, "Mary", "mary@example.com", UserRole::Attendee).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        let first = mingle
            .registrations
            .register(a.id, event.id)
            .await
            .expect("registration succeeds");
        let second = mingle
            .registrations
            .register(b.id, event.id)
            .await
            .expect("registration succeeds");

        let result = mingle.registrations.list_attendees(&a, event.id).await;
        assert!(
            matches!(result, Err(RegistrationError::NotEventOrganizer)),
            "attendees cannot view the attendee list"
        );

        let attendees = mingle
            .registrations
            .list_attendees(&organizer, event.id)
            .await
            .expect("the organizer can view the attendee list");

        assert_eq!(attendees.len(), 2);

        let codes: Vec<_> = attendees
            .iter()
            .map(|r| r.ticket.as_ref().expect("ticket is attached").code.clone())
            .collect();

        for registration in [&first, &second] {
            let code = &registration.ticket.as_ref().expect("ticket is attached").code;
            assert!(
                codes.contains(code),
                "the listing should carry the issued ticket codes"
            );
        }
    }

    #[tokio::test]
    async fn test_list_for_user() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;

        let first = create_event(&mingle, &organizer, "Rust Meetup").await;
        let second = create_event(&mingle, &organizer, "Rust Conference").await;

        mingle
            .registrations
            .register(attendee.id, first.id)
            .await
            .expect("registration succeeds");
        mingle
            .registrations
            .register(attendee.id, second.id)
            .await
            .expect("registration succeeds");

        let registrations = mingle
            .registrations
            .list_for_user(attendee.id)
            .await
            .expect("registrations are listed");

        assert_eq!(registrations.len(), 2);

        let event_ids: Vec<_> = registrations.iter().map(|r| r.event_id).collect();
        assert!(event_ids.contains(&first.id));
        assert!(event_ids.contains(&second.id));
    }
}
