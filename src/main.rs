//src/main.rs

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

mod common;
mod config;
mod db;
mod descoberta;
mod docx;
mod domain;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Cria tabelas/índices/views (ou valida a planilha remota) no boot.
    app_state
        .storage
        .preparar_esquema()
        .await
        .expect("Falha ao preparar o esquema de armazenamento.");
    tracing::info!("✅ Esquema de armazenamento pronto!");

    app_state
        .usuarios
        .garantir_admin(app_state.config.admin.as_ref())
        .await
        .expect("Falha ao semear o usuário administrador.");

    // Respondedor de descoberta na rede local, em segundo plano.
    let porta_http = app_state
        .config
        .bind_addr
        .rsplit(':')
        .next()
        .unwrap_or("8000")
        .to_string();
    tokio::spawn(descoberta::iniciar(app_state.config.discovery_port, porta_http));

    // Sem ALLOWED_ORIGINS a API fica aberta (uso em rede local).
    let cors = if app_state.config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origens: Vec<HeaderValue> = app_state
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origens)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .route("/api/health", get(handlers::sistema::health))
        .route("/api/info", get(handlers::sistema::info))
        .route("/api/proximo-id", get(handlers::orcamentos::proximo_id))
        .route(
            "/api/orcamentos",
            post(handlers::orcamentos::criar).get(handlers::orcamentos::listar),
        )
        .route("/api/orcamentos/{id}", get(handlers::orcamentos::por_id))
        .route("/api/orcamentos/{id}/pdf", get(handlers::orcamentos::pdf))
        .route(
            "/api/cadastros",
            post(handlers::cadastros::salvar).get(handlers::cadastros::listar),
        )
        .route(
            "/api/cadastros/{documento}",
            get(handlers::cadastros::por_documento),
        )
        .route(
            "/api/cadastros/{documento}/desconto-automatico",
            get(handlers::cadastros::desconto_automatico),
        )
        .route(
            "/api/pedidos",
            post(handlers::pedidos::criar).get(handlers::pedidos::listar),
        )
        .route("/api/contratos", post(handlers::contratos::gerar))
        .route("/api/login", post(handlers::usuarios::login))
        .route(
            "/api/usuarios",
            post(handlers::usuarios::upsert).get(handlers::usuarios::listar),
        )
        .route(
            "/api/usuarios/change-senha",
            post(handlers::usuarios::trocar_senha),
        )
        .layer(cors)
        .with_state(app_state.clone());

    let listener = TcpListener::bind(&app_state.config.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
