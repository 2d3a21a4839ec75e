use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use log::warn;
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    util::random_string, Database, DatabaseError, MingleContext, NewSession, NewUser, PrimaryKey,
    SessionData, UserData, UserRole,
};

pub struct Auth<Db> {
    db: Arc<Db>,
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("An admin already exists")]
    AdminExists,
    #[error("Only admins can manage users")]
    AdminOnly,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    const SESSION_DURATION_IN_DAYS: usize = 7;

    pub fn new(context: &MingleContext<Db>) -> Self {
        Self {
            db: context.database.clone(),
            argon: Argon2::default(),
        }
    }

    /// Logs in a user, returning a new session
    pub async fn login(&self, credentials: Credentials) -> Result<SessionData, AuthError> {
        self.clear_expired().await;

        let user = self
            .db
            .user_by_email(&credentials.email)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound {
                    resource: _,
                    identifier: _,
                } => AuthError::InvalidCredentials,
                err => AuthError::Db(err),
            })?;

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let expires_at = Utc::now() + Duration::days(Self::SESSION_DURATION_IN_DAYS as i64);

        let new_session = NewSession {
            token: random_string(32),
            user_id: user.id,
            expires_at,
        };

        let new_session = self
            .db
            .create_session(new_session)
            .await
            .map_err(AuthError::Db)?;

        Ok(new_session)
    }

    /// Deletes the associated session, if it exists
    pub async fn logout(&self, token: &str) -> Result<(), DatabaseError> {
        self.db.delete_session_by_token(token).await
    }

    /// Creates a new account. The admin role is only available while no
    /// admin exists yet, so a fresh deployment can bootstrap one.
    pub async fn register(&self, new_user: NewPlainUser) -> Result<UserData, AuthError> {
        if new_user.role.is_admin() {
            let has_admin = self.db.check_for_admin().await.map_err(AuthError::Db)?;

            if has_admin {
                return Err(AuthError::AdminExists);
            }
        }

        self.create_user(new_user).await
    }

    /// Returns a session if it exists and hasn't expired
    pub async fn session(&self, token: &str) -> Result<SessionData, DatabaseError> {
        let session = self.db.session_by_token(token).await?;

        if session.expires_at < Utc::now() {
            return Err(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            });
        }

        Ok(session)
    }

    /// Lists every account
    pub async fn list_users(&self, actor: &UserData) -> Result<Vec<UserData>, AuthError> {
        self.ensure_admin(actor)?;

        self.db.list_users().await.map_err(AuthError::Db)
    }

    /// Changes the role of a user
    pub async fn change_role(
        &self,
        actor: &UserData,
        user_id: PrimaryKey,
        role: UserRole,
    ) -> Result<UserData, AuthError> {
        self.ensure_admin(actor)?;

        self.db
            .update_user_role(user_id, role)
            .await
            .map_err(AuthError::Db)
    }

    /// Deletes a user completely, along with everything they own
    pub async fn delete_user(
        &self,
        actor: &UserData,
        user_id: PrimaryKey,
    ) -> Result<(), AuthError> {
        self.ensure_admin(actor)?;

        self.db.delete_user(user_id).await.map_err(AuthError::Db)
    }

    fn ensure_admin(&self, actor: &UserData) -> Result<(), AuthError> {
        if !actor.role.is_admin() {
            return Err(AuthError::AdminOnly);
        }

        Ok(())
    }

    async fn create_user(&self, new_user: NewPlainUser) -> Result<UserData, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = self
            .argon
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.db
            .create_user(NewUser {
                name: new_user.name,
                email: new_user.email,
                password: hashed_password,
                role: new_user.role,
            })
            .await
            .map_err(AuthError::Db)
    }

    async fn clear_expired(&self) {
        if let Err(e) = self.db.clear_expired_sessions().await {
            warn!("Could not clear expired sessions: {}", e);
        }
    }
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewPlainUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}
