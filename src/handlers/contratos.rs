// src/handlers/contratos.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::contrato::ContratoIn};

// POST /api/contratos
pub async fn gerar(
    State(estado): State<AppState>,
    Json(payload): Json<ContratoIn>,
) -> Result<impl IntoResponse, AppError> {
    // A edição do DOCX é I/O de arquivo local e rápida; roda inline mesmo.
    let saida = estado.contratos.gerar(payload)?;
    Ok((StatusCode::CREATED, Json(saida)))
}
