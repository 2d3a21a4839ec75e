use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    Database, DatabaseError, EventData, EventFilter, MingleContext, NewEvent,
    NotificationManager, PrimaryKey, UpdatedEvent, UserData,
};

/// Creates, lists, and maintains events.
pub struct EventManager<Db> {
    db: Arc<Db>,
    notifications: NotificationManager<Db>,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Only organizers can create events")]
    NotOrganizerRole,
    #[error("Only the event organizer can modify this event")]
    NotEventOrganizer,
    #[error(transparent)]
    Db(DatabaseError),
}

/// The fields a caller provides when creating an event
#[derive(Debug)]
pub struct NewEventInput {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

impl<Db> EventManager<Db>
where
    Db: Database,
{
    pub fn new(context: &MingleContext<Db>) -> Self {
        Self {
            db: context.database.clone(),
            notifications: NotificationManager::new(context),
        }
    }

    /// Creates a new event owned by the acting user
    pub async fn create(
        &self,
        actor: &UserData,
        input: NewEventInput,
    ) -> Result<EventData, EventError> {
        if !actor.role.can_organize() {
            return Err(EventError::NotOrganizerRole);
        }

        let event = self
            .db
            .create_event(NewEvent {
                title: input.title,
                description: input.description,
                date: input.date,
                organizer_id: actor.id,
            })
            .await
            .map_err(EventError::Db)?;

        info!("{} created event '{}'", actor.name, event.title);

        Ok(event)
    }

    pub async fn get(&self, event_id: PrimaryKey) -> Result<EventData, DatabaseError> {
        self.db.event_by_id(event_id).await
    }

    pub async fn list(&self, filter: EventFilter) -> Result<Vec<EventData>, DatabaseError> {
        self.db.list_events(filter).await
    }

    /// Updates an event. Only the owning organizer may do this, and every
    /// registrant is told about the change.
    pub async fn update(
        &self,
        actor: &UserData,
        updated_event: UpdatedEvent,
    ) -> Result<EventData, EventError> {
        let event = self
            .db
            .event_by_id(updated_event.id)
            .await
            .map_err(EventError::Db)?;

        if event.organizer.id != actor.id {
            return Err(EventError::NotEventOrganizer);
        }

        let updated = self
            .db
            .update_event(updated_event)
            .await
            .map_err(EventError::Db)?;

        if let Err(e) = self
            .notifications
            .notify_event_participants(
                updated.id,
                "Event updated",
                &format!("The event '{}' has been updated.", updated.title),
                Some(actor.id),
            )
            .await
        {
            warn!(
                "Could not notify participants of event {} about the update: {}",
                updated.id, e
            );
        }

        Ok(updated)
    }

    /// Deletes an event and everything attached to it. Allowed for the
    /// owning organizer and for admins. Registrants are told first, since
    /// the cascade would otherwise take their notifications with it.
    pub async fn delete(&self, actor: &UserData, event_id: PrimaryKey) -> Result<(), EventError> {
        let event = self.db.event_by_id(event_id).await.map_err(EventError::Db)?;

        if event.organizer.id != actor.id && !actor.role.is_admin() {
            return Err(EventError::NotEventOrganizer);
        }

        let registrations = self
            .db
            .registrations_by_event(event_id)
            .await
            .map_err(EventError::Db)?;

        let message = format!("The event '{}' has been cancelled.", event.title);

        for registration in registrations {
            if registration.user.id == actor.id {
                continue;
            }

            if let Err(e) = self
                .notifications
                .notify_user(registration.user.id, "Event cancelled", &message, None)
                .await
            {
                warn!(
                    "Could not notify user {} about the cancellation of event {}: {}",
                    registration.user.id, event_id, e
                );
            }
        }

        self.db.delete_event(event_id).await.map_err(EventError::Db)?;

        info!("{} deleted event '{}'", actor.name, event.title);

        Ok(())
    }
}
