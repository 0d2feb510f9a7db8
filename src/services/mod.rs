pub mod cadastro_service;
pub mod contrato_service;
pub mod documento_service;
pub mod orcamento_service;
pub mod pedido_service;
pub mod usuario_service;

#[cfg(test)]
pub mod memoria;
