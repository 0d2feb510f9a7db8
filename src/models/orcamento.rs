// src/models/orcamento.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::mapeamento::Registro;

// Conjuntos fechados vindos do formulário. A serialização usa exatamente os
// rótulos que a planilha sempre usou.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoServico {
    #[serde(rename = "Impressão")]
    Impressao,
    #[serde(rename = "Digitalização")]
    Digitalizacao,
}

impl TipoServico {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipoServico::Impressao => "Impressão",
            TipoServico::Digitalizacao => "Digitalização",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCliente {
    #[serde(rename = "Sem desconto")]
    SemDesconto,
    #[serde(rename = "Novo")]
    Novo,
    #[serde(rename = "Ativo")]
    Ativo,
    #[serde(rename = "Inativo")]
    Inativo,
}

impl StatusCliente {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCliente::SemDesconto => "Sem desconto",
            StatusCliente::Novo => "Novo",
            StatusCliente::Ativo => "Ativo",
            StatusCliente::Inativo => "Inativo",
        }
    }

    /// Novo/Ativo pagam o preço com desconto por metro.
    pub fn tem_desconto(&self) -> bool {
        matches!(self, StatusCliente::Novo | StatusCliente::Ativo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unidade {
    #[serde(rename = "Centímetros")]
    Centimetros,
    #[serde(rename = "Metro")]
    Metro,
}

impl Unidade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unidade::Centimetros => "Centímetros",
            Unidade::Metro => "Metro",
        }
    }
}

// Corpo do POST /api/orcamentos. Os opcionais vêm da UI web e, quando
// presentes, sobrescrevem os cálculos padrão.
#[derive(Debug, Deserialize, Validate)]
pub struct OrcamentoIn {
    pub tipo_servico: TipoServico,
    #[validate(length(min = 1, message = "O cliente é obrigatório."))]
    pub cliente: String,
    #[validate(length(min = 1, message = "O documento é obrigatório."))]
    pub cnpj: String,
    pub email: String,
    pub status: StatusCliente,
    pub unidade: Unidade,
    pub quantidade: String,
    pub vendedor: Option<String>,
    pub forma_pagamento: Option<String>,
    pub preco_por_metro_opc: Option<String>,
    pub metros_opc: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrcamentoOut {
    pub id_orcamento: String,
    pub data_hora: String,
    pub tipo_servico: String,
    pub cliente: String,
    pub cnpj: String,
    pub email: String,
    pub status: String,
    pub quantidade: String,
    pub unidade: String,
    pub metros: String,
    pub preco_por_metro: String,
    pub valor_total: String,
}

// Filtros dos GETs de listagem (datas em DD/MM/YYYY, intervalo inclusivo).
#[derive(Debug, Default, Deserialize)]
pub struct FiltroQuery {
    pub id: Option<String>,
    pub cnpj: Option<String>,
    pub vendedor: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Lista {
    pub count: usize,
    pub rows: Vec<Registro>,
}

impl Lista {
    pub fn de(rows: Vec<Registro>) -> Self {
        Self { count: rows.len(), rows }
    }
}

#[derive(Debug, Serialize)]
pub struct ProximoId {
    pub id: String,
}
