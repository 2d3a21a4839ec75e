mod admin;
mod auth;
mod comments;
mod context;
mod docs;
mod errors;
mod events;
mod logging;
mod notifications;
mod schemas;
mod serialized;
mod tickets;

use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
};

use axum::routing::get;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use context::*;
pub use errors::*;
pub use logging::init_logger;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9050;

pub(crate) type Router = axum::Router<ServerContext>;

/// Builds the full application router around a context
pub fn router(context: ServerContext) -> axum::Router {
    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/events", events::router().merge(comments::event_router()))
        .nest("/comments", comments::router())
        .nest("/notifications", notifications::router())
        .nest("/admin", admin::router())
        .nest("/tickets", tickets::router());

    Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .with_state(context)
}

/// Starts the mingle server
pub async fn run_server(context: ServerContext) {
    let port = env::var("MINGLE_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(context).layer(cors);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    info!("Listening on port {}", port);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server runs");
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request},
        Router,
    };
    use http_body_util::BodyExt;
    use mingle_core::{Mingle, SqliteDatabase};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::{router, ServerContext};

    pub async fn test_app() -> (Router, TempDir) {
        let dir = TempDir::new().expect("temp dir is created");

        let database = SqliteDatabase::new("sqlite::memory:")
            .await
            .expect("database is created");

        let mingle = Mingle::new(database, dir.path());

        let app = router(ServerContext {
            mingle: Arc::new(mingle),
        });

        (app, dir)
    }

    /// Fires a request at the app and returns the status plus the JSON
    /// body, or Null for empty and non-JSON bodies
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (u16, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request is built");

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("request is handled");

        let status = response.status().as_u16();

        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body is read")
            .to_bytes();

        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    /// Creates an account and logs it in, returning the session token
    pub async fn register_and_login(app: &Router, name: &str, email: &str, role: &str) -> String {
        let (status, _) = send(
            app,
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "name": name,
                "email": email,
                "password": "hunter2hunter2",
                "role": role,
            })),
        )
        .await;

        assert_eq!(status, 200, "registration succeeds");

        let (status, body) = send(
            app,
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": "hunter2hunter2" })),
        )
        .await;

        assert_eq!(status, 200, "login succeeds");

        body["token"]
            .as_str()
            .expect("token is present")
            .to_string()
    }

    /// Creates a future-dated event through the API, returning its id
    pub async fn create_event(app: &Router, organizer_token: &str, title: &str) -> i64 {
        let (status, body) = send(
            app,
            "POST",
            "/v1/events",
            Some(organizer_token),
            Some(json!({
                "title": title,
                "description": "Monthly meetup",
                "date": "2030-01-01T18:00:00Z",
            })),
        )
        .await;

        assert_eq!(status, 200, "event creation succeeds");

        body["id"].as_i64().expect("event has an id")
    }
}
