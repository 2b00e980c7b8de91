use std::path::Path;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use opsboard_app::AppConfig;
use opsboard_db::Db;
use opsboard_server::HttpState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if let Err(err) = setup_db(&config.db_path) {
        error!(path = %config.db_path.display(), "failed to initialize database: {err}");
        std::process::exit(1);
    }
    let bind = config.bind.clone();
    let state = HttpState::new(config);
    let app = opsboard_server::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .expect("bind server");
    info!(addr = %bind, "listening");
    axum::serve(listener, app).await.expect("serve");
}

fn setup_db(path: &Path) -> Result<(), opsboard_db::DbError> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
