// src/handlers/cadastros.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::filtro_de,
    models::{
        cadastro::{CadastroIn, DescontoAutomatico, OkResposta},
        orcamento::{FiltroQuery, Lista},
    },
};

// POST /api/cadastros (upsert)
pub async fn salvar(
    State(estado): State<AppState>,
    Json(payload): Json<CadastroIn>,
) -> Result<impl IntoResponse, AppError> {
    estado.cadastros.salvar(payload).await?;
    Ok((StatusCode::CREATED, Json(OkResposta { ok: true })))
}

// GET /api/cadastros?cnpj=&vendedor=&start=&end=
pub async fn listar(
    State(estado): State<AppState>,
    Query(q): Query<FiltroQuery>,
) -> Result<impl IntoResponse, AppError> {
    let linhas = estado.cadastros.listar(&filtro_de(q)).await?;
    Ok(Json(Lista::de(linhas)))
}

// GET /api/cadastros/{documento}
pub async fn por_documento(
    State(estado): State<AppState>,
    Path(documento): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let linha = estado.cadastros.buscar_por_documento(&documento).await?;
    Ok(Json(linha))
}

// GET /api/cadastros/{documento}/desconto-automatico
pub async fn desconto_automatico(
    State(estado): State<AppState>,
    Path(documento): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ativo = estado.cadastros.desconto_automatico(&documento).await?;
    Ok(Json(DescontoAutomatico { desconto_automatico: ativo }))
}
