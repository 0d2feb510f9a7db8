// src/handlers/orcamentos.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::filtro_de,
    models::orcamento::{FiltroQuery, Lista, OrcamentoIn, ProximoId, TipoServico},
};

#[derive(Debug, Deserialize)]
pub struct ProximoIdQuery {
    pub tipo_servico: Option<String>,
}

fn tipo_de(texto: Option<&str>) -> TipoServico {
    match texto {
        Some(t) if t.trim().to_lowercase().starts_with("imp") => TipoServico::Impressao,
        Some(_) => TipoServico::Digitalizacao,
        None => TipoServico::Impressao,
    }
}

// GET /api/proximo-id?tipo_servico=Impressão
// Atenção: espiar o próximo id consome um número da sequência.
pub async fn proximo_id(
    State(estado): State<AppState>,
    Query(q): Query<ProximoIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = estado
        .orcamentos
        .proximo_id(tipo_de(q.tipo_servico.as_deref()))
        .await?;
    Ok(Json(ProximoId { id }))
}

// POST /api/orcamentos
pub async fn criar(
    State(estado): State<AppState>,
    Json(payload): Json<OrcamentoIn>,
) -> Result<impl IntoResponse, AppError> {
    let saida = estado.orcamentos.criar(payload).await?;
    Ok((StatusCode::CREATED, Json(saida)))
}

// GET /api/orcamentos?id=&cnpj=&vendedor=&start=&end=
pub async fn listar(
    State(estado): State<AppState>,
    Query(q): Query<FiltroQuery>,
) -> Result<impl IntoResponse, AppError> {
    // Filtro por id exato vira a busca pontual; id desconhecido é lista
    // vazia, não 404 (o 404 fica para GET /api/orcamentos/{id}).
    if let Some(id) = q.id.as_deref().filter(|i| !i.is_empty()) {
        let linhas = estado.orcamentos.por_id_em_lista(id).await?;
        return Ok(Json(Lista::de(linhas)));
    }
    let linhas = estado.orcamentos.listar(&filtro_de(q)).await?;
    Ok(Json(Lista::de(linhas)))
}

// GET /api/orcamentos/{id}
pub async fn por_id(
    State(estado): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let linha = estado.orcamentos.por_id(&id).await?;
    Ok(Json(linha))
}

// GET /api/orcamentos/{id}/pdf
pub async fn pdf(
    State(estado): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let linha = estado.orcamentos.por_id(&id).await?;
    let bytes = estado.documentos.gerar_pdf_orcamento(&linha)?;
    let nome = format!("{}.pdf", id);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", nome),
            ),
        ],
        bytes,
    ))
}
