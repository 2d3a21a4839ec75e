use std::sync::Arc;

use axum::extract::FromRef;
use mingle_core::{Mingle, SqliteDatabase};

/// The concrete mingle system this server fronts
pub type ServedMingle = Mingle<SqliteDatabase>;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub mingle: Arc<ServedMingle>,
}
