// src/handlers/usuarios.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        cadastro::OkResposta,
        usuario::{LoginIn, TrocaSenhaIn, UsuarioIn},
    },
};

// POST /api/login
pub async fn login(
    State(estado): State<AppState>,
    Json(payload): Json<LoginIn>,
) -> Result<impl IntoResponse, AppError> {
    let perfil = estado.usuarios.login(payload).await?;
    Ok(Json(perfil))
}

// GET /api/usuarios
pub async fn listar(State(estado): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let usuarios = estado.usuarios.listar().await?;
    Ok(Json(usuarios))
}

// POST /api/usuarios (upsert)
pub async fn upsert(
    State(estado): State<AppState>,
    Json(payload): Json<UsuarioIn>,
) -> Result<impl IntoResponse, AppError> {
    estado.usuarios.upsert(payload).await?;
    Ok((StatusCode::CREATED, Json(OkResposta { ok: true })))
}

// POST /api/usuarios/change-senha
pub async fn trocar_senha(
    State(estado): State<AppState>,
    Json(payload): Json<TrocaSenhaIn>,
) -> Result<impl IntoResponse, AppError> {
    estado.usuarios.trocar_senha(payload).await?;
    Ok(Json(OkResposta { ok: true }))
}
