use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    error::DatabaseError as SqlxDatabaseError,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Error as SqlxError, Executor, Row, SqliteConnection, SqlitePool,
};

use crate::{
    CommentData, Database, DatabaseError, DatabaseResult, EventData, EventFilter,
    IntoDatabaseError, NewComment, NewEvent, NewNotification, NewRegistration, NewSession,
    NewUser, NotificationData, NotificationFilter, Page, PrimaryKey, RegistrationData, Result,
    SessionData, TicketData, UpdatedEvent, UserData, UserRole,
};

const SCHEMA: &str = include_str!("schema.sql");

type SqlxResult<T> = std::result::Result<T, SqlxError>;

/// A SQLite database implementation for mingle
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| e.any())?
            .create_if_missing(true)
            .foreign_keys(true);

        // SQLite serializes writers anyway, and a single connection keeps
        // `sqlite::memory:` databases consistent across the whole pool
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| e.any())?;

        pool.execute(SCHEMA).await.map_err(|e| e.any())?;

        Ok(Self { pool })
    }

    async fn registration_by_clause(
        &self,
        clause: &str,
        binds: &[PrimaryKey],
    ) -> SqlxResult<Vec<RegistrationData>> {
        let sql = registration_select(clause);
        let mut query = sqlx::query(&sql);

        for bind in binds {
            query = query.bind(*bind);
        }

        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(registration_from_row).collect()
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn check_for_admin(&self) -> Result<bool> {
        let result = sqlx::query("SELECT id FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => match e {
                SqlxError::RowNotFound => Ok(false),
                e => Err(e.any()),
            },
        }
    }

    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))?;

        user_from_row(&row, "").map_err(|e| e.any())
    }

    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "email"))?;

        user_from_row(&row, "").map_err(|e| e.any())
    }

    async fn list_users(&self) -> Result<Vec<UserData>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(|row| user_from_row(row, ""))
            .collect::<SqlxResult<_>>()
            .map_err(|e| e.any())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        self.user_by_email(&new_user.email)
            .await
            .conflict_or_ok("user", "email", &new_user.email)?;

        let row = sqlx::query(
            "INSERT INTO users (name, email, password, role) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(new_user.name)
        .bind(new_user.email.clone())
        .bind(new_user.password)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.conflict_or_any("user", "email", &new_user.email))?;

        user_from_row(&row, "").map_err(|e| e.any())
    }

    async fn update_user_role(&self, user_id: PrimaryKey, role: UserRole) -> Result<UserData> {
        let _ = self.user_by_id(user_id).await?;

        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.user_by_id(user_id).await
    }

    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()> {
        let _ = self.user_by_id(user_id).await?;

        let organized_rows = sqlx::query("SELECT id FROM events WHERE organizer_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        // Events without their organizer would be invalid, so they go too
        for row in organized_rows {
            let event_id: PrimaryKey = row.try_get("id").map_err(|e| e.any())?;
            cascade_event(&mut tx, event_id).await.map_err(|e| e.any())?;
        }

        for sql in [
            "DELETE FROM tickets WHERE registration_id IN
                (SELECT id FROM registrations WHERE user_id = ?)",
            "DELETE FROM registrations WHERE user_id = ?",
            "DELETE FROM comments WHERE user_id = ?",
            "DELETE FROM notifications WHERE user_id = ?",
            "DELETE FROM sessions WHERE user_id = ?",
            "DELETE FROM users WHERE id = ?",
        ] {
            sqlx::query(sql)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| e.any())?;
        }

        tx.commit().await.map_err(|e| e.any())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let row = sqlx::query(
            "SELECT
                sessions.id,
                sessions.token,
                sessions.expires_at,
                users.id AS user_id,
                users.name AS user_name,
                users.email AS user_email,
                users.password AS user_password,
                users.role AS user_role
            FROM sessions
                INNER JOIN users ON sessions.user_id = users.id
            WHERE token = ?",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("session", "token"))?;

        session_from_row(&row).map_err(|e| e.any())
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        let record = sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?) RETURNING token",
        )
        .bind(new_session.token)
        .bind(new_session.user_id)
        .bind(new_session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        let token: String = record.try_get("token").map_err(|e| e.any())?;
        self.session_by_token(&token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        // Ensure session exists
        let _ = self.session_by_token(token).await?;

        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn event_by_id(&self, event_id: PrimaryKey) -> Result<EventData> {
        let sql = event_select("WHERE events.id = ?");

        let row = sqlx::query(&sql)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("event", "id"))?;

        event_from_row(&row).map_err(|e| e.any())
    }

    async fn list_events(&self, filter: EventFilter) -> Result<Vec<EventData>> {
        let sql = event_select(
            "WHERE (?1 IS NULL OR events.title LIKE '%' || ?1 || '%')
                AND (?2 IS NULL OR events.date >= ?2)
                AND (?3 IS NULL OR events.date <= ?3)
            ORDER BY events.date
            LIMIT ?4 OFFSET ?5",
        );

        let rows = sqlx::query(&sql)
            .bind(filter.search)
            .bind(filter.from)
            .bind(filter.until)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(event_from_row)
            .collect::<SqlxResult<_>>()
            .map_err(|e| e.any())
    }

    async fn create_event(&self, new_event: NewEvent) -> Result<EventData> {
        let organizer = self.user_by_id(new_event.organizer_id).await?;

        let row = sqlx::query(
            "INSERT INTO events (title, description, date, organizer_id)
            VALUES (?, ?, ?, ?)
            RETURNING id",
        )
        .bind(new_event.title)
        .bind(new_event.description)
        .bind(new_event.date)
        .bind(organizer.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        let event_id: PrimaryKey = row.try_get("id").map_err(|e| e.any())?;
        self.event_by_id(event_id).await
    }

    async fn update_event(&self, updated_event: UpdatedEvent) -> Result<EventData> {
        let event = self.event_by_id(updated_event.id).await?;

        sqlx::query(
            "UPDATE events SET
                title = ?,
                description = ?,
                date = ?
            WHERE id = ?",
        )
        .bind(updated_event.title.unwrap_or(event.title))
        .bind(updated_event.description.or(event.description))
        .bind(updated_event.date.unwrap_or(event.date))
        .bind(updated_event.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.event_by_id(updated_event.id).await
    }

    async fn delete_event(&self, event_id: PrimaryKey) -> Result<()> {
        // Ensure event exists
        let _ = self.event_by_id(event_id).await?;

        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        cascade_event(&mut tx, event_id).await.map_err(|e| e.any())?;

        tx.commit().await.map_err(|e| e.any())
    }

    async fn registration_by_pair(
        &self,
        user_id: PrimaryKey,
        event_id: PrimaryKey,
    ) -> Result<RegistrationData> {
        let sql = registration_select(
            "WHERE registrations.user_id = ? AND registrations.event_id = ?",
        );

        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("registration", "user:event"))?;

        registration_from_row(&row).map_err(|e| e.any())
    }

    async fn registrations_by_event(&self, event_id: PrimaryKey) -> Result<Vec<RegistrationData>> {
        self.registration_by_clause(
            "WHERE registrations.event_id = ? ORDER BY registrations.id",
            &[event_id],
        )
        .await
        .map_err(|e| e.any())
    }

    async fn registrations_by_user(&self, user_id: PrimaryKey) -> Result<Vec<RegistrationData>> {
        self.registration_by_clause(
            "WHERE registrations.user_id = ? ORDER BY registrations.id",
            &[user_id],
        )
        .await
        .map_err(|e| e.any())
    }

    async fn create_registration_with_ticket(
        &self,
        new_registration: NewRegistration,
        ticket_code: &str,
    ) -> Result<RegistrationData> {
        let NewRegistration { user_id, event_id } = new_registration;

        let _ = self.user_by_id(user_id).await?;

        sqlx::query("SELECT id FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("event", "id"))?;

        self.registration_by_pair(user_id, event_id)
            .await
            .conflict_or_ok(
                "registration",
                "user:event",
                format!("{user_id}:{event_id}").as_str(),
            )?;

        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        let row = sqlx::query(
            "INSERT INTO registrations (user_id, event_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id",
        )
        .bind(user_id)
        .bind(event_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // Two racing attempts can both pass the pre-check above,
            // the unique index decides between them
            e.conflict_or_any(
                "registration",
                "user:event",
                format!("{user_id}:{event_id}").as_str(),
            )
        })?;

        let registration_id: PrimaryKey = row.try_get("id").map_err(|e| e.any())?;

        sqlx::query("INSERT INTO tickets (code, registration_id) VALUES (?, ?)")
            .bind(ticket_code)
            .bind(registration_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.conflict_or_any("ticket", "code", ticket_code))?;

        tx.commit().await.map_err(|e| e.any())?;

        self.registration_by_pair(user_id, event_id).await
    }

    async fn delete_registration(
        &self,
        user_id: PrimaryKey,
        event_id: PrimaryKey,
    ) -> Result<RegistrationData> {
        let registration = self.registration_by_pair(user_id, event_id).await?;

        let mut tx = self.pool.begin().await.map_err(|e| e.any())?;

        sqlx::query("DELETE FROM tickets WHERE registration_id = ?")
            .bind(registration.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        sqlx::query("DELETE FROM registrations WHERE id = ?")
            .bind(registration.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| e.any())?;

        tx.commit().await.map_err(|e| e.any())?;

        Ok(registration)
    }

    async fn ticket_by_code(&self, code: &str) -> Result<TicketData> {
        let row = sqlx::query("SELECT * FROM tickets WHERE code = ?")
            .bind(code)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("ticket", "code"))?;

        ticket_from_row(&row).map_err(|e| e.any())
    }

    async fn comment_by_id(&self, comment_id: PrimaryKey) -> Result<CommentData> {
        let sql = comment_select("WHERE comments.id = ?");

        let row = sqlx::query(&sql)
            .bind(comment_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("comment", "id"))?;

        comment_from_row(&row).map_err(|e| e.any())
    }

    async fn comments_by_event(
        &self,
        event_id: PrimaryKey,
        page: Page,
    ) -> Result<Vec<CommentData>> {
        let sql = comment_select(
            "WHERE comments.event_id = ? ORDER BY comments.id LIMIT ? OFFSET ?",
        );

        let rows = sqlx::query(&sql)
            .bind(event_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(comment_from_row)
            .collect::<SqlxResult<_>>()
            .map_err(|e| e.any())
    }

    async fn create_comment(&self, new_comment: NewComment) -> Result<CommentData> {
        let _ = self.user_by_id(new_comment.user_id).await?;

        sqlx::query("SELECT id FROM events WHERE id = ?")
            .bind(new_comment.event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("event", "id"))?;

        let row = sqlx::query(
            "INSERT INTO comments (content, created_at, user_id, event_id)
            VALUES (?, ?, ?, ?)
            RETURNING id",
        )
        .bind(new_comment.content)
        .bind(Utc::now())
        .bind(new_comment.user_id)
        .bind(new_comment.event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        let comment_id: PrimaryKey = row.try_get("id").map_err(|e| e.any())?;
        self.comment_by_id(comment_id).await
    }

    async fn delete_comment(&self, comment_id: PrimaryKey) -> Result<()> {
        // Ensure comment exists
        let _ = self.comment_by_id(comment_id).await?;

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn notification_by_id(&self, notification_id: PrimaryKey) -> Result<NotificationData> {
        let row = sqlx::query("SELECT * FROM notifications WHERE id = ?")
            .bind(notification_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("notification", "id"))?;

        notification_from_row(&row).map_err(|e| e.any())
    }

    async fn notifications_by_user(
        &self,
        user_id: PrimaryKey,
        filter: NotificationFilter,
    ) -> Result<Vec<NotificationData>> {
        let rows = sqlx::query(
            "SELECT * FROM notifications
            WHERE user_id = ?1 AND (?2 = 0 OR read = 0)
            ORDER BY id DESC
            LIMIT ?3 OFFSET ?4",
        )
        .bind(user_id)
        .bind(filter.unread_only)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        rows.iter()
            .map(notification_from_row)
            .collect::<SqlxResult<_>>()
            .map_err(|e| e.any())
    }

    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<NotificationData> {
        let _ = self.user_by_id(new_notification.user_id).await?;

        let row = sqlx::query(
            "INSERT INTO notifications (title, message, read, created_at, user_id, event_id)
            VALUES (?, ?, 0, ?, ?, ?)
            RETURNING id",
        )
        .bind(new_notification.title)
        .bind(new_notification.message)
        .bind(Utc::now())
        .bind(new_notification.user_id)
        .bind(new_notification.event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        let notification_id: PrimaryKey = row.try_get("id").map_err(|e| e.any())?;
        self.notification_by_id(notification_id).await
    }

    async fn mark_notification_read(
        &self,
        notification_id: PrimaryKey,
    ) -> Result<NotificationData> {
        // Ensure notification exists
        let _ = self.notification_by_id(notification_id).await?;

        sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(notification_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.notification_by_id(notification_id).await
    }

    async fn mark_all_notifications_read(&self, user_id: PrimaryKey) -> Result<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(result.rows_affected())
    }

    async fn unread_notification_count(&self, user_id: PrimaryKey) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM notifications WHERE user_id = ? AND read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        row.try_get("count").map_err(|e| e.any())
    }
}

/// Deletes an event and everything that hangs off it, in deletion order
async fn cascade_event(conn: &mut SqliteConnection, event_id: PrimaryKey) -> SqlxResult<()> {
    for sql in [
        "DELETE FROM tickets WHERE registration_id IN
            (SELECT id FROM registrations WHERE event_id = ?)",
        "DELETE FROM registrations WHERE event_id = ?",
        "DELETE FROM comments WHERE event_id = ?",
        "DELETE FROM notifications WHERE event_id = ?",
        "DELETE FROM events WHERE id = ?",
    ] {
        sqlx::query(sql).bind(event_id).execute(&mut *conn).await?;
    }

    Ok(())
}

fn event_select(clause: &str) -> String {
    format!(
        "SELECT
            events.id,
            events.title,
            events.description,
            events.date,
            users.id AS organizer_id,
            users.name AS organizer_name,
            users.email AS organizer_email,
            users.password AS organizer_password,
            users.role AS organizer_role
        FROM events
            INNER JOIN users ON events.organizer_id = users.id
        {clause}"
    )
}

fn registration_select(clause: &str) -> String {
    format!(
        "SELECT
            registrations.id,
            registrations.event_id,
            registrations.created_at,
            users.id AS user_id,
            users.name AS user_name,
            users.email AS user_email,
            users.password AS user_password,
            users.role AS user_role,
            tickets.id AS ticket_id,
            tickets.code AS ticket_code,
            tickets.registration_id AS ticket_registration_id
        FROM registrations
            INNER JOIN users ON registrations.user_id = users.id
            LEFT JOIN tickets ON tickets.registration_id = registrations.id
        {clause}"
    )
}

fn comment_select(clause: &str) -> String {
    format!(
        "SELECT
            comments.id,
            comments.content,
            comments.created_at,
            comments.event_id,
            users.id AS user_id,
            users.name AS user_name,
            users.email AS user_email,
            users.password AS user_password,
            users.role AS user_role
        FROM comments
            INNER JOIN users ON comments.user_id = users.id
        {clause}"
    )
}

fn parse_role(value: String) -> SqlxResult<UserRole> {
    UserRole::from_str(&value).map_err(|e| SqlxError::Decode(Box::new(e)))
}

fn user_from_row(row: &SqliteRow, prefix: &str) -> SqlxResult<UserData> {
    let col = |name: &str| format!("{prefix}{name}");

    Ok(UserData {
        id: row.try_get(col("id").as_str())?,
        name: row.try_get(col("name").as_str())?,
        email: row.try_get(col("email").as_str())?,
        password: row.try_get(col("password").as_str())?,
        role: parse_role(row.try_get(col("role").as_str())?)?,
    })
}

fn session_from_row(row: &SqliteRow) -> SqlxResult<SessionData> {
    Ok(SessionData {
        id: row.try_get("id")?,
        token: row.try_get("token")?,
        expires_at: row.try_get("expires_at")?,
        user: user_from_row(row, "user_")?,
    })
}

fn event_from_row(row: &SqliteRow) -> SqlxResult<EventData> {
    Ok(EventData {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        organizer: user_from_row(row, "organizer_")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> SqlxResult<CommentData> {
    Ok(CommentData {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        event_id: row.try_get("event_id")?,
        user: user_from_row(row, "user_")?,
    })
}

fn registration_from_row(row: &SqliteRow) -> SqlxResult<RegistrationData> {
    let ticket_id: Option<PrimaryKey> = row.try_get("ticket_id")?;

    let ticket = match ticket_id {
        Some(id) => Some(TicketData {
            id,
            code: row.try_get("ticket_code")?,
            registration_id: row.try_get("ticket_registration_id")?,
        }),
        None => None,
    };

    Ok(RegistrationData {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        created_at: row.try_get("created_at")?,
        user: user_from_row(row, "user_")?,
        ticket,
    })
}

fn ticket_from_row(row: &SqliteRow) -> SqlxResult<TicketData> {
    Ok(TicketData {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        registration_id: row.try_get("registration_id")?,
    })
}

fn notification_from_row(row: &SqliteRow) -> SqlxResult<NotificationData> {
    Ok(NotificationData {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        read: row.try_get("read")?,
        created_at: row.try_get("created_at")?,
        user_id: row.try_get("user_id")?,
        event_id: row.try_get("event_id")?,
    })
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }

    fn conflict_or_any(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> DatabaseError {
        let is_unique_violation = self
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false);

        if is_unique_violation {
            return DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            };
        }

        self.any()
    }
}
