// src/models/cadastro.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

// Corpo do POST /api/cadastros. A chave primária é o documento; todos os
// demais campos são opcionais porque o cadastro pode nascer incompleto
// (primeiro orçamento) e ser completado depois.
#[derive(Debug, Deserialize, Validate)]
pub struct CadastroIn {
    pub documento: Option<String>,
    #[validate(length(min = 1, message = "O CNPJ/CPF é obrigatório."))]
    pub cnpj_cpf: String,
    pub razao_social_nome: Option<String>,
    pub nome_fantasia: Option<String>,
    pub contato: Option<String>,
    pub email_cnpj: Option<String>,
    pub email_manual: Option<String>,
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    pub bairro: Option<String>,
    pub municipio: Option<String>,
    pub uf: Option<String>,
    pub entrega_cep: Option<String>,
    pub entrega_endereco: Option<String>,
    pub entrega_numero: Option<String>,
    pub entrega_complemento: Option<String>,
    pub entrega_bairro: Option<String>,
    pub entrega_municipio: Option<String>,
    pub entrega_uf: Option<String>,
    pub desconto_duracao: Option<String>,
    pub desconto_unidade: Option<String>,
    pub telefone1: Option<String>,
    pub telefone2: Option<String>,
    pub vendedor: Option<String>,
}

impl CadastroIn {
    /// Pares (coluna, valor) apenas dos campos presentes, na ordem do schema.
    pub fn campos_presentes(&self) -> Vec<(&'static str, String)> {
        let mut out: Vec<(&'static str, String)> = Vec::new();
        let mut push = |col: &'static str, v: &Option<String>| {
            if let Some(v) = v {
                out.push((col, v.clone()));
            }
        };
        push("documento", &self.documento);
        push("razao_social_nome", &self.razao_social_nome);
        push("nome_fantasia", &self.nome_fantasia);
        push("contato", &self.contato);
        push("email_cnpj", &self.email_cnpj);
        push("email_manual", &self.email_manual);
        push("cep", &self.cep);
        push("endereco", &self.endereco);
        push("numero", &self.numero);
        push("complemento", &self.complemento);
        push("bairro", &self.bairro);
        push("municipio", &self.municipio);
        push("uf", &self.uf);
        push("entrega_cep", &self.entrega_cep);
        push("entrega_endereco", &self.entrega_endereco);
        push("entrega_numero", &self.entrega_numero);
        push("entrega_complemento", &self.entrega_complemento);
        push("entrega_bairro", &self.entrega_bairro);
        push("entrega_municipio", &self.entrega_municipio);
        push("entrega_uf", &self.entrega_uf);
        push("desconto_duracao", &self.desconto_duracao);
        push("desconto_unidade", &self.desconto_unidade);
        push("telefone1", &self.telefone1);
        push("telefone2", &self.telefone2);
        push("vendedor", &self.vendedor);
        out
    }
}

#[derive(Debug, Serialize)]
pub struct OkResposta {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct DescontoAutomatico {
    pub desconto_automatico: bool,
}
