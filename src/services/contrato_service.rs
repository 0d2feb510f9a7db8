// src/services/contrato_service.rs

use std::fs;
use std::path::PathBuf;

use validator::Validate;

use crate::{
    common::error::AppError,
    docx,
    domain::{documentos, extenso, moeda},
    models::contrato::{ContratoIn, ContratoOut},
};

#[derive(Clone)]
pub struct ContratoService {
    template: PathBuf,
    pasta_saida: PathBuf,
}

/// Remove os caracteres proibidos em nomes de arquivo no Windows e normaliza
/// os espaços.
fn sanitizar_nome(nome: &str) -> String {
    let trocado: String = nome
        .trim()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            outro => outro,
        })
        .collect();
    trocado.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl ContratoService {
    pub fn new(template: PathBuf, pasta_saida: PathBuf) -> Self {
        Self { template, pasta_saida }
    }

    /// Gera o contrato DOCX a partir do contexto do orçamento. Os textos dos
    /// placeholders são os do modelo comercial usado pela loja; por isso eles
    /// são frases "INCLUIR ..." e não tokens sintéticos.
    pub fn gerar(&self, payload: ContratoIn) -> Result<ContratoOut, AppError> {
        payload.validate()?;

        if !self.template.exists() {
            return Err(AppError::Template(format!(
                "Template do contrato não encontrado em {}. Verifique CONTRATO_TEMPLATE.",
                self.template.display()
            )));
        }
        fs::create_dir_all(&self.pasta_saida).map_err(|e| {
            AppError::Template(format!(
                "Não consegui criar a pasta de saída {}: {}",
                self.pasta_saida.display(),
                e
            ))
        })?;

        let agora = chrono::Local::now();
        let data_hoje = agora.format("%d/%m/%Y").to_string();
        let forma_pgto = payload.forma_pgto.clone().unwrap_or_default().trim().to_string();
        let valor_unit = format!("R$ {}", payload.valor_unit.clone().unwrap_or_default().trim());
        let valor_total_txt = payload.valor_total.clone().unwrap_or_default();
        let valor_total = format!("R$ {}", valor_total_txt.trim());
        let total_extenso = extenso::numero_por_extenso_reais(moeda::parse_ptbr(&valor_total_txt));
        let endereco_empresa =
            documentos::garantir_tipo_logradouro("Rua", &payload.empresa_endereco_concat);

        // Ordem importa: chaves mais longas primeiro dentro de cada grupo
        // ("(INCLUIR FORMA DE PAGAMENTO)" contém "FORMA DE PAGAMENTO").
        let trocas: Vec<(String, String)> = [
            ("(INCLUIR Razão SOCIAL DO CLIENTE)", payload.cliente.clone()),
            ("(INCLUIR CNPJ OU CPF DO CLIENTE)", payload.doc_valor.clone()),
            (
                "(INCLUIR Endereço DE ENTREGA DO CLIENTE)",
                payload.end_entrega.clone(),
            ),
            (
                "+55 (INCLUIR Número DE TELEFONE DO CLIENTE)",
                format!("+55 {}", payload.telefone),
            ),
            ("(INCLUIR E-mail do CLIENTE)", payload.email.clone()),
            ("INCLUIR Razão SOCIAL DA EMPRESA", payload.empresa_razao.clone()),
            ("INCLUIR Número DO CNPJ DA EMPRESA", payload.empresa_cnpj.clone()),
            (
                "INCLUIR Endereço DA EMPRESA COMPLETO CONCATENADO",
                endereco_empresa,
            ),
            ("EDITAR DATA", data_hoje.clone()),
            ("(EDITAR DATA)", data_hoje),
            ("(INCLUIR FORMA DE PAGAMENTO)", forma_pgto.clone()),
            ("(FORMA DE PAGAMENTO)", forma_pgto.clone()),
            ("FORMA DE PAGAMENTO", forma_pgto),
            ("(INCLUIR VALOR ESCRITO POR EXTENSO)", total_extenso),
            ("TIPO Serviço", payload.tipo_servico.clone().unwrap_or_default()),
            (
                "TOTAL EM METROS",
                payload.total_metros.clone().unwrap_or_default(),
            ),
            ("VALOR UNIT.", valor_unit.clone()),
            ("VALOR UNIT", valor_unit),
            ("VALOR TOTAL", valor_total),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        // Nome do arquivo: sufixo do id (depois do "OR-"), cliente e carimbo.
        let sufixo = match payload.id_orc.find('-') {
            Some(pos) => &payload.id_orc[pos + 1..],
            None => payload.id_orc.as_str(),
        };
        let nome_arquivo = format!(
            "Contrato Impressão- {}_{}_{}.docx",
            sanitizar_nome(sufixo),
            sanitizar_nome(&payload.cliente),
            agora.format("%d-%m-%Y %H-%M-%S")
        );
        let caminho = self.pasta_saida.join(nome_arquivo);

        docx::substituir_no_docx(&self.template, &caminho, &trocas)?;
        tracing::info!("✅ Contrato gerado em {}", caminho.display());
        Ok(ContratoOut { caminho: caminho.display().to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn contexto() -> ContratoIn {
        ContratoIn {
            id_orc: "OR-IM1001012025".to_string(),
            cliente: "Aurora Confecções".to_string(),
            doc_valor: "11.222.333/0001-81".to_string(),
            end_entrega: "Av. Brasil, 100 - Centro, Rio de Janeiro/RJ".to_string(),
            telefone: "(21) 99999-0000".to_string(),
            email: "compras@aurora.com.br".to_string(),
            empresa_razao: "Plotagem RJ Ltda".to_string(),
            empresa_cnpj: "00.000.000/0001-91".to_string(),
            empresa_endereco_concat: "das Laranjeiras, 55 - Laranjeiras".to_string(),
            tipo_servico: Some("Impressão".to_string()),
            total_metros: Some("2,50".to_string()),
            valor_unit: Some("8,00".to_string()),
            valor_total: Some("20,00".to_string()),
            forma_pgto: Some("PIX".to_string()),
        }
    }

    #[test]
    fn sanitizacao_de_nome_de_arquivo() {
        assert_eq!(sanitizar_nome("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitizar_nome("  dois   espaços "), "dois espaços");
    }

    #[test]
    fn template_ausente_da_erro_claro() {
        let dir = tempfile::tempdir().unwrap();
        let svc = ContratoService::new(
            dir.path().join("nao_existe.docx"),
            dir.path().join("saida"),
        );
        let erro = svc.gerar(contexto()).unwrap_err();
        assert!(matches!(erro, AppError::Template(_)));
    }

    #[test]
    fn gera_contrato_com_placeholders_trocados() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("modelo.docx");
        {
            let arq = fs::File::create(&template).unwrap();
            let mut zw = zip::ZipWriter::new(arq);
            let op = zip::write::SimpleFileOptions::default();
            zw.start_file("word/document.xml", op).unwrap();
            zw.write_all(
                r#"<w:document><w:body><w:p><w:r><w:t>Contratante: (INCLUIR Razão SOCIAL DO CLIENTE), pagamento via (INCLUIR FORMA DE PAGAMENTO), valor VALOR TOTAL ((INCLUIR VALOR ESCRITO POR EXTENSO))</w:t></w:r></w:p></w:body></w:document>"#
                    .as_bytes(),
            )
            .unwrap();
            zw.finish().unwrap();
        }

        let svc = ContratoService::new(template, dir.path().join("saida"));
        let saida = svc.gerar(contexto()).unwrap();

        let mut pacote =
            zip::ZipArchive::new(fs::File::open(&saida.caminho).unwrap()).unwrap();
        let mut corpo = String::new();
        pacote
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut corpo)
            .unwrap();
        // A troca pode repartir o texto em runs adjacentes; compara o texto
        // corrido, sem as tags.
        let texto = texto_corrido(&corpo);
        assert!(texto.contains("Contratante: Aurora Confecções"), "corpo: {}", corpo);
        assert!(texto.contains("pagamento via PIX"), "corpo: {}", corpo);
        assert!(texto.contains("R$ 20,00"), "corpo: {}", corpo);
        assert!(texto.contains("vinte reais"), "corpo: {}", corpo);
        assert!(!texto.contains("(INCLUIR"), "corpo: {}", corpo);
        assert!(saida.caminho.contains("Contrato Impressão- IM1001012025_Aurora Confecções"));
    }

    fn texto_corrido(xml: &str) -> String {
        let mut saida = String::new();
        let mut dentro = false;
        for c in xml.chars() {
            match c {
                '<' => dentro = true,
                '>' => dentro = false,
                c if !dentro => saida.push(c),
                _ => {}
            }
        }
        saida
    }
}
