// src/docx/mod.rs
//
// Edição de contratos DOCX por substituição de placeholders. `spans` faz a
// troca pura sobre trechos estilizados; `arquivo` abre o pacote ZIP, edita o
// word/document.xml e regrava o arquivo.

pub mod arquivo;
pub mod spans;

pub use arquivo::substituir_no_docx;
