use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A taxonomia cobre os dois backends de armazenamento: erros de banco (sqlx)
// e erros da planilha remota (reqwest/Graph) chegam aqui por `#[from]`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Campo inválido: {0}")]
    Validacao(String),

    #[error("{0}")]
    NaoEncontrado(String),

    #[error("Usuário ou senha inválidos")]
    CredenciaisInvalidas,

    // Banco indisponível ou sessão/autenticação do Graph falhou.
    // Quando o erro chega aqui ele é definitivo: não existe fallback
    // silencioso para outro destino de armazenamento.
    #[error("Backend de armazenamento indisponível: {0}")]
    BackendIndisponivel(String),

    #[error("Operação não suportada neste backend: {0}")]
    OperacaoNaoSuportada(&'static str),

    // Template de contrato ausente/ilegível ou saída não gravável.
    #[error("Erro no template do contrato: {0}")]
    Template(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de comunicação com a API remota: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação derivada (validator).
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Validacao(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NaoEncontrado(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::CredenciaisInvalidas => {
                (StatusCode::UNAUTHORIZED, "Usuário ou senha inválidos".to_string())
            }
            AppError::BackendIndisponivel(msg) => {
                tracing::error!("Backend indisponível: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::OperacaoNaoSuportada(op) => (
                StatusCode::NOT_IMPLEMENTED,
                format!("Operação não suportada neste backend: {}", op),
            ),
            AppError::Template(msg) => {
                tracing::error!("Erro de template: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }

            // Todos os outros erros (DatabaseError, HttpError, etc.) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
