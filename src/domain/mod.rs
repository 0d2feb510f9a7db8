pub mod documentos;
pub mod extenso;
pub mod moeda;
