use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/tickets/{code}",
    tag = "tickets",
    responses(
        (status = 200, description = "The QR code artifact for the ticket, as SVG"),
        (status = 404, description = "No ticket with this code exists")
    )
)]
pub(crate) async fn ticket_artifact(
    State(context): State<ServerContext>,
    Path(code): Path<String>,
) -> ServerResult<Response> {
    let (_, path) = context.mingle.tickets.retrieve(&code).await?;

    let bytes = fs::read(&path)
        .await
        .map_err(|e| ServerError::Unknown(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], bytes).into_response())
}

pub fn router() -> Router {
    Router::new().route("/:code", get(ticket_artifact))
}
