use log::warn;
use qrcode::{render::svg, QrCode};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::fs;

use crate::{util::random_string, Database, DatabaseError, MingleContext, TicketData};

/// Issues and retrieves proof-of-registration tickets.
///
/// A ticket is an opaque unique code plus a QR artifact rendered once at
/// issuance and kept on disk under a path derived from the code.
pub struct TicketManager<Db> {
    db: Arc<Db>,
    artifact_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Could not write ticket artifact: {0}")]
    ArtifactWrite(String),
    #[error(transparent)]
    Db(DatabaseError),
}

impl<Db> TicketManager<Db>
where
    Db: Database,
{
    const CODE_LENGTH: usize = 32;

    pub fn new(context: &MingleContext<Db>) -> Self {
        Self {
            db: context.database.clone(),
            artifact_dir: context.artifact_dir.clone(),
        }
    }

    /// Mints a fresh opaque ticket code
    pub fn mint_code(&self) -> String {
        random_string(Self::CODE_LENGTH)
    }

    /// The artifact location for a code, derived deterministically
    pub fn artifact_path(&self, code: &str) -> PathBuf {
        self.artifact_dir.join(format!("{code}.svg"))
    }

    /// Renders the QR artifact for a code and writes it to disk
    pub async fn write_artifact(&self, code: &str) -> Result<PathBuf, TicketError> {
        let image = render_qr_svg(code)?;
        let path = self.artifact_path(code);

        fs::create_dir_all(&self.artifact_dir)
            .await
            .map_err(|e| TicketError::ArtifactWrite(e.to_string()))?;

        fs::write(&path, image)
            .await
            .map_err(|e| TicketError::ArtifactWrite(e.to_string()))?;

        Ok(path)
    }

    /// Removes a previously written artifact. Used to compensate when the
    /// registration transaction fails after the artifact was written.
    pub async fn discard_artifact(&self, code: &str) {
        if let Err(e) = fs::remove_file(self.artifact_path(code)).await {
            warn!("Could not remove ticket artifact for {}: {}", code, e);
        }
    }

    /// Looks up a ticket by its code, returning the artifact location
    pub async fn retrieve(&self, code: &str) -> Result<(TicketData, PathBuf), TicketError> {
        let ticket = self.db.ticket_by_code(code).await.map_err(TicketError::Db)?;
        let path = self.artifact_path(&ticket.code);

        Ok((ticket, path))
    }
}

fn render_qr_svg(code: &str) -> Result<String, TicketError> {
    let qr = QrCode::new(code.as_bytes()).map_err(|e| TicketError::ArtifactWrite(e.to_string()))?;

    let image = qr
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .build();

    Ok(image)
}

/// Checks whether an artifact exists at the given location
pub async fn artifact_exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}
