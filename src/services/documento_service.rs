// src/services/documento_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Alignment, Element};

use crate::{common::error::AppError, db::Registro};

// Campos do orçamento na ordem em que saem no PDF.
const CAMPOS: &[&str] = &[
    "Data/Hora",
    "Tipo de Serviço",
    "Cliente (Valor)",
    "CNPJ/CPF",
    "E-mail",
    "Vendedor",
    "Desconto",
    "Quantidade",
    "Unidade",
    "Metros",
    "Preço por metro",
    "Forma de Pagamento",
];

#[derive(Clone)]
pub struct DocumentoService {
    pasta_fontes: PathBuf,
}

impl DocumentoService {
    pub fn new(pasta_fontes: PathBuf) -> Self {
        Self { pasta_fontes }
    }

    /// Renderiza o PDF do orçamento em memória. Cabeçalho, tabela de campos e
    /// total em destaque; estética de página fica por conta do modelo padrão.
    pub fn gerar_pdf_orcamento(&self, registro: &Registro) -> Result<Vec<u8>, AppError> {
        let campo = |label: &str| registro.get(label).cloned().unwrap_or_default();
        let id = campo("ID Orçamento");

        let fontes = genpdf::fonts::from_files(&self.pasta_fontes, "Roboto", None)
            .map_err(|_| {
                AppError::Template(format!(
                    "Fonte Roboto não encontrada em {}",
                    self.pasta_fontes.display()
                ))
            })?;

        let mut doc = genpdf::Document::new(fontes);
        doc.set_title(format!("Orçamento {}", id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new("Fashion Tech - Audaces RJ e ES")
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Break::new(1.0));
        doc.push(
            elements::Paragraph::new(format!("ORÇAMENTO {}", id))
                .styled(style::Style::new().bold().with_font_size(13)),
        );
        doc.push(elements::Break::new(1.5));

        let mut tabela = elements::TableLayout::new(vec![2, 4]);
        tabela.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        let negrito = style::Style::new().bold();
        for label in CAMPOS {
            let etiqueta = if *label == "Cliente (Valor)" {
                campo("Cliente (Etiqueta PDF)")
            } else {
                (*label).to_string()
            };
            tabela
                .row()
                .element(elements::Paragraph::new(etiqueta).styled(negrito))
                .element(elements::Paragraph::new(campo(label)))
                .push()
                .map_err(|e| AppError::Template(format!("Erro ao montar o PDF: {}", e)))?;
        }
        doc.push(tabela);
        doc.push(elements::Break::new(2.0));

        let mut total =
            elements::Paragraph::new(format!("VALOR TOTAL: R$ {}", campo("Valor Total")));
        total.set_alignment(Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(12)));

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::Template(format!("Erro ao renderizar o PDF: {}", e)))?;
        Ok(buffer)
    }
}
