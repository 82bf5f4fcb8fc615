use std::env;
use std::sync::Arc;

use log::info;
use qr_print_server::error::AppError;
use qr_print_server::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let bind = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let state = Arc::new(AppState::from_env());

    info!("qr print server listening on {bind}");
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, web::router(state)).await?;

    Ok(())
}
