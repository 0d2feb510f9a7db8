// src/handlers/sistema.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{common::error::AppError, config::AppState};

// GET /api/health
pub async fn health() -> &'static str {
    "OK"
}

// GET /api/info — o mesmo conteúdo que o respondedor UDP anuncia, para quem
// prefere descobrir o servidor por HTTP.
pub async fn info(State(estado): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let porta = estado
        .config
        .bind_addr
        .rsplit(':')
        .next()
        .unwrap_or("8000")
        .to_string();
    let ip = local_ip_address::local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    Ok(Json(json!({
        "nome": env!("CARGO_PKG_NAME"),
        "versao": env!("CARGO_PKG_VERSION"),
        "url": format!("http://{}:{}", ip, porta),
    })))
}
