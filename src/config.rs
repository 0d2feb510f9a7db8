// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use crate::{
    db::{
        graph::{GraphConfig, GraphStorage},
        postgres::PostgresStorage,
        Storage,
    },
    services::{
        cadastro_service::CadastroService, contrato_service::ContratoService,
        documento_service::DocumentoService, orcamento_service::OrcamentoService,
        pedido_service::PedidoService, usuario_service::UsuarioService,
    },
};

fn var_ou(nome: &str, padrao: &str) -> String {
    env::var(nome).unwrap_or_else(|_| padrao.to_string())
}

#[derive(Clone)]
pub struct AdminSeed {
    pub usuario: String,
    pub nome: String,
    pub email: String,
    pub setor: String,
    pub cargo: String,
    pub senha: String,
}

#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
    pub discovery_port: u16,
    pub admin: Option<AdminSeed>,
}

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub orcamentos: OrcamentoService,
    pub cadastros: CadastroService,
    pub pedidos: PedidoService,
    pub usuarios: UsuarioService,
    pub contratos: ContratoService,
    pub documentos: DocumentoService,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // A escolha do backend acontece uma vez, aqui. Depois disso a
        // aplicação inteira só enxerga o trait.
        let backend = var_ou("STORAGE_BACKEND", "db");
        let storage: Arc<dyn Storage> = match backend.as_str() {
            "db" => {
                let url = env::var("DATABASE_URL")
                    .map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;
                Arc::new(PostgresStorage::conectar(&url).await?)
            }
            "graph" => {
                let config = GraphConfig {
                    tenant_id: env::var("TENANT_ID")
                        .map_err(|_| anyhow::anyhow!("TENANT_ID deve ser definida"))?,
                    client_id: env::var("CLIENT_ID")
                        .map_err(|_| anyhow::anyhow!("CLIENT_ID deve ser definida"))?,
                    caminho_planilha: env::var("EXCEL_RELATIVE_PATH")
                        .map_err(|_| anyhow::anyhow!("EXCEL_RELATIVE_PATH deve ser definida"))?,
                    tabela_orcamentos: var_ou("EXCEL_TABLE_ORCAMENTOS", "Orcamentos"),
                    tabela_cadastros: var_ou("EXCEL_TABLE_CADASTROS", "Cadastros"),
                    tabela_pedidos: var_ou("EXCEL_TABLE_PEDIDOS", "Pedidos"),
                    cache_token: PathBuf::from(var_ou("GRAPH_TOKEN_CACHE", "token_cache.json")),
                };
                Arc::new(GraphStorage::new(config)?)
            }
            outro => anyhow::bail!("STORAGE_BACKEND desconhecido: {}", outro),
        };
        tracing::info!("Armazenamento selecionado: {}", backend);

        let pct_comissao_vendedor = var_ou("PCT_COMISSAO_VENDEDOR", "5")
            .replace(',', ".")
            .parse::<f64>()
            .unwrap_or(5.0);

        let admin = match (env::var("ADMIN_USUARIO"), env::var("ADMIN_SENHA")) {
            (Ok(usuario), Ok(senha)) if !usuario.is_empty() && !senha.is_empty() => {
                Some(AdminSeed {
                    usuario,
                    nome: var_ou("ADMIN_NOME", "Administrador"),
                    email: var_ou("ADMIN_EMAIL", ""),
                    setor: var_ou("ADMIN_SETOR", ""),
                    cargo: var_ou("ADMIN_CARGO", ""),
                    senha,
                })
            }
            _ => None,
        };

        let config = Arc::new(Config {
            bind_addr: var_ou("BIND_ADDR", "0.0.0.0:8000"),
            allowed_origins: var_ou("ALLOWED_ORIGINS", "")
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            discovery_port: var_ou("DISCOVERY_PORT", "56789").parse().unwrap_or(56789),
            admin,
        });

        Ok(Self {
            orcamentos: OrcamentoService::new(storage.clone()),
            cadastros: CadastroService::new(storage.clone()),
            pedidos: PedidoService::new(storage.clone(), pct_comissao_vendedor),
            usuarios: UsuarioService::new(storage.clone()),
            contratos: ContratoService::new(
                PathBuf::from(var_ou("CONTRATO_TEMPLATE", "templates/contrato.docx")),
                PathBuf::from(var_ou("PASTA_SAIDA", "saida")),
            ),
            documentos: DocumentoService::new(PathBuf::from(var_ou("PASTA_FONTES", "./fonts"))),
            storage,
            config,
        })
    }
}
