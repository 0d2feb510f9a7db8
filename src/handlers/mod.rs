pub mod cadastros;
pub mod contratos;
pub mod orcamentos;
pub mod pedidos;
pub mod sistema;
pub mod usuarios;

use crate::db::Filtro;
use crate::domain::documentos::apenas_digitos;
use crate::models::orcamento::FiltroQuery;

/// Traduz a query string das listagens para o filtro do backend.
pub fn filtro_de(q: FiltroQuery) -> Filtro {
    Filtro {
        documento_digitos: q.cnpj.as_deref().map(apenas_digitos),
        vendedor: q.vendedor,
        inicio: q.start,
        fim: q.end,
    }
}
