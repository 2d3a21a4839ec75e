mod auth;
mod comments;
mod db;
mod events;
mod notifications;
mod registrations;
mod tickets;
mod util;

use std::{path::PathBuf, sync::Arc};

pub use auth::*;
pub use comments::*;
pub use db::*;
pub use events::*;
pub use notifications::*;
pub use registrations::*;
pub use tickets::*;

/// The mingle system, facilitating accounts, events, registrations,
/// tickets, and notifications.
pub struct Mingle<Db> {
    pub auth: Auth<Db>,
    pub events: EventManager<Db>,
    pub registrations: RegistrationManager<Db>,
    pub tickets: TicketManager<Db>,
    pub notifications: NotificationManager<Db>,
    pub comments: CommentManager<Db>,

    pub context: MingleContext<Db>,
}

/// A type passed to the managers of the system, to access the store and
/// shared configuration. The store handle is constructed explicitly and
/// handed in, never reached through a global.
pub struct MingleContext<Db> {
    pub database: Arc<Db>,
    /// Where ticket QR artifacts are written
    pub artifact_dir: PathBuf,
}

impl<Db> Mingle<Db>
where
    Db: Database,
{
    pub fn new(database: Db, artifact_dir: impl Into<PathBuf>) -> Self {
        let context = MingleContext {
            database: Arc::new(database),
            artifact_dir: artifact_dir.into(),
        };

        Self {
            auth: Auth::new(&context),
            events: EventManager::new(&context),
            registrations: RegistrationManager::new(&context),
            tickets: TicketManager::new(&context),
            notifications: NotificationManager::new(&context),
            comments: CommentManager::new(&context),
            context,
        }
    }
}

impl<Db> Clone for MingleContext<Db> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            artifact_dir: self.artifact_dir.clone(),
        }
    }
}
