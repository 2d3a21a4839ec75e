use std::{env, sync::Arc};

use log::{error, info};
use mingle_core::{Mingle, SqliteDatabase};
use mingle_server::{init_logger, run_server, ServerContext};

const DEFAULT_DATABASE_URL: &str = "sqlite://mingle.db";
const DEFAULT_TICKET_DIR: &str = "tickets";

#[tokio::main]
async fn main() {
    init_logger();

    let database_url =
        env::var("MINGLE_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let ticket_dir =
        env::var("MINGLE_TICKET_DIR").unwrap_or_else(|_| DEFAULT_TICKET_DIR.to_string());

    info!("Connecting to database...");

    let database = match SqliteDatabase::new(&database_url).await {
        Ok(database) => database,
        Err(e) => {
            error!("Could not open the database at {}: {}", database_url, e);
            return;
        }
    };

    let mingle = Mingle::new(database, ticket_dir);

    let context = ServerContext {
        mingle: Arc::new(mingle),
    };

    info!("Initialized successfully.");

    run_server(context).await
}
