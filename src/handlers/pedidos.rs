// src/handlers/pedidos.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::filtro_de,
    models::{
        orcamento::{FiltroQuery, Lista},
        pedido::PedidoIn,
    },
};

// POST /api/pedidos
pub async fn criar(
    State(estado): State<AppState>,
    Json(payload): Json<PedidoIn>,
) -> Result<impl IntoResponse, AppError> {
    let registro = estado.pedidos.criar(payload).await?;
    Ok((StatusCode::CREATED, Json(registro)))
}

// GET /api/pedidos?cnpj=&vendedor=&start=&end=
pub async fn listar(
    State(estado): State<AppState>,
    Query(q): Query<FiltroQuery>,
) -> Result<impl IntoResponse, AppError> {
    let linhas = estado.pedidos.listar(&filtro_de(q)).await?;
    Ok(Json(Lista::de(linhas)))
}
