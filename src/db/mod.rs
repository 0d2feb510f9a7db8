// src/db/mod.rs
//
// Contrato polimórfico de persistência. Dois backends intercambiáveis:
// banco relacional (Postgres/sqlx) e planilha remota (API Graph). A aplicação
// depende só deste trait; a escolha acontece na configuração, uma vez, no boot.

pub mod graph;
pub mod mapeamento;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::common::error::AppError;
use crate::models::usuario::{Usuario, UsuarioIn, UsuarioPublico};

pub use mapeamento::Registro;

/// Filtros das listagens. Datas em DD/MM/YYYY, intervalo inclusivo por dia.
#[derive(Debug, Default, Clone)]
pub struct Filtro {
    pub documento_digitos: Option<String>,
    pub vendedor: Option<String>,
    pub inicio: Option<String>,
    pub fim: Option<String>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Cria tabelas/índices/views (ou valida a estrutura remota). Idempotente.
    async fn preparar_esquema(&self) -> Result<(), AppError>;

    // ---- Orçamentos ----
    async fn salvar_orcamento(&self, registro: &Registro) -> Result<(), AppError>;
    async fn orcamento_por_id(&self, id: &str) -> Result<Option<Registro>, AppError>;
    async fn listar_orcamentos(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError>;

    // ---- Cadastros ----
    async fn salvar_cadastro(&self, registro: &Registro) -> Result<(), AppError>;
    async fn cadastro_por_documento(&self, digitos: &str) -> Result<Option<Registro>, AppError>;
    async fn listar_cadastros(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError>;

    // ---- Pedidos ----
    async fn salvar_pedido(&self, registro: &Registro) -> Result<(), AppError>;
    async fn listar_pedidos(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError>;
    async fn ultimo_pedido_data(&self, digitos: &str) -> Result<Option<String>, AppError>;

    // ---- Sequências ----
    /// Próximo número de pedido. Estritamente crescente, nunca reusado.
    async fn proximo_numero_pedido(&self) -> Result<i64, AppError>;
    /// Próximo sequencial de orçamento para a sigla ("IM" | "DG").
    async fn proximo_sequencial_orcamento(&self, sigla: &str) -> Result<i64, AppError>;

    // ---- Usuários ----
    async fn upsert_usuario(&self, u: &UsuarioIn, senha_hash: Option<String>)
        -> Result<(), AppError>;
    async fn listar_usuarios(&self) -> Result<Vec<UsuarioPublico>, AppError>;
    async fn usuario_por_nome(&self, usuario: &str) -> Result<Option<Usuario>, AppError>;
    async fn definir_senha(&self, usuario: &str, senha_hash: &str) -> Result<(), AppError>;
}

fn parse_dia(texto: &str) -> Option<NaiveDate> {
    // Aceita "DD/MM/YYYY" e "DD/MM/YYYY HH:MM:SS" (usa só a parte da data).
    let dia = texto.trim().split_whitespace().next()?;
    NaiveDate::parse_from_str(dia, "%d/%m/%Y").ok()
}

/// Predicado único de intervalo de datas, aplicado pós-consulta pelos dois
/// backends. Linha sem data parseável fica de fora quando há filtro ativo.
pub fn filtrar_por_data(
    linhas: Vec<Registro>,
    campo: &str,
    inicio: Option<&str>,
    fim: Option<&str>,
) -> Vec<Registro> {
    let d_inicio = inicio.and_then(parse_dia);
    let d_fim = fim.and_then(parse_dia);
    if d_inicio.is_none() && d_fim.is_none() {
        return linhas;
    }
    linhas
        .into_iter()
        .filter(|r| {
            let Some(dia) = r.get(campo).and_then(|v| parse_dia(v)) else {
                return false;
            };
            if let Some(ini) = d_inicio {
                if dia < ini {
                    return false;
                }
            }
            if let Some(fim) = d_fim {
                if dia > fim {
                    return false;
                }
            }
            true
        })
        .collect()
}
