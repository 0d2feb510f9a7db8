pub mod cadastro;
pub mod contrato;
pub mod orcamento;
pub mod pedido;
pub mod usuario;
