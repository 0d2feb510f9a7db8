// src/models/pedido.rs

use serde::Deserialize;
use validator::Validate;

// Corpo do POST /api/pedidos. `id` e `pedido` podem vir ausentes: o serviço
// aloca o próximo número de pedido e sintetiza o id "CT-{n}". As comissões
// ausentes são calculadas a partir do valor total.
#[derive(Debug, Deserialize, Validate)]
pub struct PedidoIn {
    pub id: Option<String>,
    pub pedido: Option<i64>,
    pub tipo_servico: Option<String>,
    pub status_cliente: Option<String>,
    pub quantidade_m: Option<String>,
    pub valor_unitario: Option<String>,
    pub valor_total: Option<String>,
    pub data_hora_criacao: Option<String>,
    pub id_orcamento: Option<String>,
    pub documento: Option<String>,
    #[validate(length(min = 1, message = "O CNPJ/CPF é obrigatório."))]
    pub cnpj_cpf: String,
    pub cliente: Option<String>,
    pub vendedor: Option<String>,
    pub forma_pgto_orcamento: Option<String>,
    pub forma_pgto_contrato: Option<String>,
    pub pct_comissao_vendedor: Option<String>,
    pub valor_comissao_vendedor: Option<String>,
    pub pct_comissao_adm: Option<String>,
    pub valor_comissao_adm: Option<String>,
}
