// src/models/contrato.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

// Contexto para a geração do contrato DOCX (POST /api/contratos).
// Valores monetários chegam como texto pt-BR ("1.234,56"), do mesmo jeito
// que ficam persistidos no orçamento.
#[derive(Debug, Deserialize, Validate)]
pub struct ContratoIn {
    #[validate(length(min = 1, message = "O id do orçamento é obrigatório."))]
    pub id_orc: String,
    #[validate(length(min = 1, message = "O cliente é obrigatório."))]
    pub cliente: String,
    pub doc_valor: String,
    pub end_entrega: String,
    pub telefone: String,
    pub email: String,
    pub empresa_razao: String,
    pub empresa_cnpj: String,
    pub empresa_endereco_concat: String,
    pub tipo_servico: Option<String>,
    pub total_metros: Option<String>,
    pub valor_unit: Option<String>,
    pub valor_total: Option<String>,
    pub forma_pgto: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContratoOut {
    pub caminho: String,
}
