use log::warn;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    CommentData, Database, DatabaseError, MingleContext, NewComment, NotificationManager, Page,
    PrimaryKey, UserData,
};

pub struct CommentManager<Db> {
    db: Arc<Db>,
    notifications: NotificationManager<Db>,
}

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Only the comment author or an admin can delete this comment")]
    NotCommentAuthor,
    #[error(transparent)]
    Db(DatabaseError),
}

/// How much of the comment the organizer sees in their notification
const PREVIEW_LENGTH: usize = 50;

impl<Db> CommentManager<Db>
where
    Db: Database,
{
    pub fn new(context: &MingleContext<Db>) -> Self {
        Self {
            db: context.database.clone(),
            notifications: NotificationManager::new(context),
        }
    }

    /// Posts a comment on an event, letting the organizer know unless
    /// they wrote it themselves
    pub async fn create(
        &self,
        actor: &UserData,
        event_id: PrimaryKey,
        content: String,
    ) -> Result<CommentData, CommentError> {
        let event = self.db.event_by_id(event_id).await.map_err(CommentError::Db)?;

        let comment = self
            .db
            .create_comment(NewComment {
                content,
                user_id: actor.id,
                event_id,
            })
            .await
            .map_err(CommentError::Db)?;

        if event.organizer.id != actor.id {
            let message = format!(
                "{} commented on '{}': {}",
                actor.name,
                event.title,
                preview(&comment.content)
            );

            if let Err(e) = self
                .notifications
                .notify_user(
                    event.organizer.id,
                    "New comment on your event",
                    &message,
                    Some(event_id),
                )
                .await
            {
                warn!(
                    "Could not notify organizer {} about a comment: {}",
                    event.organizer.id, e
                );
            }
        }

        Ok(comment)
    }

    pub async fn list(
        &self,
        event_id: PrimaryKey,
        page: Page,
    ) -> Result<Vec<CommentData>, DatabaseError> {
        // Surface a missing event instead of an empty listing
        let _ = self.db.event_by_id(event_id).await?;

        self.db.comments_by_event(event_id, page).await
    }

    /// Deletes a comment. Allowed for its author and for admins.
    pub async fn delete(
        &self,
        actor: &UserData,
        comment_id: PrimaryKey,
    ) -> Result<(), CommentError> {
        let comment = self
            .db
            .comment_by_id(comment_id)
            .await
            .map_err(CommentError::Db)?;

        if comment.user.id != actor.id && !actor.role.is_admin() {
            return Err(CommentError::NotCommentAuthor);
        }

        self.db
            .delete_comment(comment_id)
            .await
            .map_err(CommentError::Db)
    }
}

fn preview(content: &str) -> String {
    let truncated: String = content.chars().take(PREVIEW_LENGTH).collect();

    if content.chars().count() > PREVIEW_LENGTH {
        format!("{truncated}...")
    } else {
        truncated
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
    async fn test_comment_notifies_organizer() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        mingle
            .comments
            .create(&attendee, event.id, "Looking forward to it!".to_string())
            .await
            .expect("comment is created");

        assert_eq!(
            mingle
                .notifications
                .unread_count(organizer.id)
                .await
                .expect("count is fetched"),
            1,
            "the organizer should be notified about the comment"
        );

        mingle
            .comments
            .create(&organizer, event.id, "See you all there".to_string())
            .await
            .expect("comment is created");

        assert_eq!(
            mingle
                .notifications
                .unread_count(organizer.id)
                .await
                .expect("count is fetched"),
            1,
            "organizers should not be notified about their own comments"
        );
    }

    #[tokio::test]
    async fn test_long_comments_are_previewed() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let attendee = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        let content = "x".repeat(80);

        mingle
            .comments
            .create(&attendee, event.id, content)
            .await
            .expect("comment is created");

        let notifications = mingle
            .notifications
            .list(organizer.id, Default::default())
            .await
            .expect("notifications are listed");

        let message = &notifications[0].message;
        assert!(
            message.ends_with("..."),
            "a long comment should be truncated in the notification"
        );
        assert!(
            !message.contains(&"x".repeat(51)),
            "no more than the preview length should be included"
        );
    }

    #[tokio::test]
    async fn test_delete_permissions() {
        let (mingle, _dir) = test_mingle().await;

        let organizer =
            create_user(&mingle, "Jane", "jane@example.com", UserRole::Organizer).await;
        let author = create_user(&mingle, "John", "john@example.com", UserRole::Attendee).await;
        let other = create_user(&mingle, "Mallory", "mallory@example.com", UserRole::Attendee)
            .await;
        let admin = create_user(&mingle, "Admin", "admin@example.com", UserRole::Admin).await;
        let event = create_event(&mingle, &organizer, "Rust Meetup").await;

        let comment = mingle
            .comments
            .create(&author, event.id, "First!".to_string())
            .await
            .expect("comment is created");

        let result = mingle.comments.delete(&other, comment.id).await;
        assert!(
            matches!(result, Err(CommentError::NotCommentAuthor)),
            "an unrelated user cannot delete the comment"
        );

        mingle
            .comments
            .delete(&author, comment.id)
            .await
            .expect("the author can delete their comment");

        let comment = mingle
            .comments
            .create(&author, event.id, "Second!".to_string())
            .await
            .expect("comment is created");

        mingle
            .comments
            .delete(&admin, comment.id)
            .await
            .expect("an admin can delete any comment");

        let remaining = mingle
            .comments
            .list(event.id, Default::default())
            .await
            .expect("comments are listed");

        assert!(remaining.is_empty(), "both comments should be gone");
    }
}
