// src/docx/arquivo.rs
//
// Abre o modelo DOCX (um pacote ZIP), reescreve o word/document.xml trocando
// os placeholders e grava o resultado. Parágrafos bem comportados (pPr + runs
// de texto) são reconstruídos via `spans`, o que pega placeholder partido
// entre runs e preserva a formatação de cada trecho. Parágrafos com conteúdo
// que não sabemos reconstruir (hyperlink, desenho, caixa de texto) caem num
// fallback que só troca dentro de cada nó de texto.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use zip::write::SimpleFileOptions;

use crate::common::error::AppError;
use crate::docx::spans::{self, Span};

const DOCUMENT_XML: &str = "word/document.xml";

fn erro(msg: impl Into<String>) -> AppError {
    AppError::Template(msg.into())
}

/// Gera `destino` a partir do modelo `origem` com os placeholders trocados.
/// As trocas são aplicadas na ordem do slice: chaves que contêm outras chaves
/// precisam vir primeiro. A escrita acontece num arquivo temporário ao lado
/// do destino, renomeado só no final, para nunca deixar um DOCX pela metade.
pub fn substituir_no_docx(
    origem: &Path,
    destino: &Path,
    trocas: &[(String, String)],
) -> Result<(), AppError> {
    let arquivo = fs::File::open(origem)
        .map_err(|e| erro(format!("Não consegui abrir o modelo {}: {}", origem.display(), e)))?;
    let mut pacote = zip::ZipArchive::new(arquivo)
        .map_err(|e| erro(format!("Modelo de contrato não é um DOCX válido: {}", e)))?;

    let temporario = destino.with_extension("docx.tmp");
    let saida = fs::File::create(&temporario)
        .map_err(|e| erro(format!("Não consegui criar {}: {}", temporario.display(), e)))?;
    let resultado = escrever_pacote(&mut pacote, saida, trocas)
        .and_then(|_| {
            fs::rename(&temporario, destino).map_err(|e| {
                erro(format!("Não consegui mover para {}: {}", destino.display(), e))
            })
        });
    if resultado.is_err() {
        let _ = fs::remove_file(&temporario);
    }
    resultado
}

fn escrever_pacote(
    pacote: &mut zip::ZipArchive<fs::File>,
    saida: fs::File,
    trocas: &[(String, String)],
) -> Result<(), AppError> {
    let mut escritor = zip::ZipWriter::new(saida);
    let opcoes = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for i in 0..pacote.len() {
        let mut entrada = pacote
            .by_index(i)
            .map_err(|e| erro(format!("Entrada corrompida no modelo: {}", e)))?;
        let nome = entrada.name().to_string();
        if entrada.is_dir() {
            escritor
                .add_directory(nome, opcoes)
                .map_err(|e| erro(format!("Erro ao gravar o DOCX: {}", e)))?;
            continue;
        }
        escritor
            .start_file(&nome, opcoes)
            .map_err(|e| erro(format!("Erro ao gravar o DOCX: {}", e)))?;
        if nome == DOCUMENT_XML {
            let mut xml = String::new();
            entrada
                .read_to_string(&mut xml)
                .map_err(|e| erro(format!("Erro ao ler o document.xml: {}", e)))?;
            let novo = processar_document_xml(&xml, trocas)?;
            escritor
                .write_all(novo.as_bytes())
                .map_err(|e| erro(format!("Erro ao gravar o DOCX: {}", e)))?;
        } else {
            std::io::copy(&mut entrada, &mut escritor)
                .map_err(|e| erro(format!("Erro ao copiar {}: {}", nome, e)))?;
        }
    }
    escritor
        .finish()
        .map_err(|e| erro(format!("Erro ao fechar o DOCX: {}", e)))?;
    Ok(())
}

pub fn processar_document_xml(
    xml: &str,
    trocas: &[(String, String)],
) -> Result<String, AppError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut writer = Writer::new(Vec::new());
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                let abre = e.into_owned();
                buf.clear();
                let corpo = capturar_ate_fechar(&mut reader, &mut buf, b"w:p")?;
                escrever_paragrafo(&mut writer, &abre, &corpo, trocas)?;
            }
            Ok(Event::Eof) => break,
            Ok(ev) => emitir(&mut writer, ev.into_owned())?,
            Err(e) => return Err(erro(format!("XML inválido no documento: {}", e))),
        }
        buf.clear();
    }
    String::from_utf8(writer.into_inner()).map_err(|e| erro(format!("Saída não-UTF8: {}", e)))
}

fn emitir<'a>(writer: &mut Writer<Vec<u8>>, ev: Event<'a>) -> Result<(), AppError> {
    writer
        .write_event(ev)
        .map_err(|e| erro(format!("Erro ao escrever XML: {}", e)))
}

/// Consome eventos até o fechamento do elemento `nome`, contando aninhamento
/// do mesmo nome (caixas de texto aninham `w:p` dentro de `w:p`).
fn capturar_ate_fechar(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    nome: &[u8],
) -> Result<Vec<Event<'static>>, AppError> {
    let mut profundidade = 0usize;
    let mut eventos = Vec::new();
    loop {
        match reader.read_event_into(buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == nome {
                    profundidade += 1;
                }
                eventos.push(Event::Start(e.into_owned()));
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == nome {
                    if profundidade == 0 {
                        return Ok(eventos);
                    }
                    profundidade -= 1;
                }
                eventos.push(Event::End(e.into_owned()));
            }
            Ok(Event::Eof) => return Err(erro("document.xml truncado")),
            Ok(ev) => eventos.push(ev.into_owned()),
            Err(e) => return Err(erro(format!("XML inválido no documento: {}", e))),
        }
        buf.clear();
    }
}

struct Run {
    estilo: Option<String>,
    texto: String,
}

// Marcações que podem ser descartadas sem perda ao reconstruir o parágrafo.
fn ignoravel(nome: &[u8]) -> bool {
    matches!(
        nome,
        b"w:proofErr" | b"w:bookmarkStart" | b"w:bookmarkEnd" | b"w:lastRenderedPageBreak"
    )
}

/// Índice do End que fecha o Start em `inicio`, contando aninhamento.
fn fim_da_subarvore(eventos: &[Event<'static>], inicio: usize) -> Result<usize, AppError> {
    let Event::Start(abre) = &eventos[inicio] else {
        return Err(erro("estrutura inesperada no parágrafo"));
    };
    let nome = abre.name().as_ref().to_vec();
    let mut profundidade = 0usize;
    for (i, ev) in eventos.iter().enumerate().skip(inicio + 1) {
        match ev {
            Event::Start(e) if e.name().as_ref() == nome => profundidade += 1,
            Event::End(e) if e.name().as_ref() == nome => {
                if profundidade == 0 {
                    return Ok(i);
                }
                profundidade -= 1;
            }
            _ => {}
        }
    }
    Err(erro("elemento sem fechamento no parágrafo"))
}

fn xml_bruto(eventos: &[Event<'static>]) -> Result<String, AppError> {
    let mut w = Writer::new(Vec::new());
    for ev in eventos {
        w.write_event(ev.clone())
            .map_err(|e| erro(format!("Erro ao serializar XML: {}", e)))?;
    }
    String::from_utf8(w.into_inner()).map_err(|e| erro(format!("Saída não-UTF8: {}", e)))
}

fn texto_em_branco(ev: &Event<'static>) -> bool {
    match ev {
        Event::Text(t) => t
            .unescape()
            .map(|s| s.trim().is_empty())
            .unwrap_or(false),
        _ => false,
    }
}

/// Tenta decompor o corpo do parágrafo em pPr + runs simples. `None` quando
/// aparece algo que a reconstrução perderia (hyperlink, desenho, tab, br).
fn analisar(corpo: &[Event<'static>]) -> Result<Option<(Option<String>, Vec<Run>)>, AppError> {
    let mut ppr = None;
    let mut runs: Vec<Run> = Vec::new();
    let mut i = 0;
    while i < corpo.len() {
        match &corpo[i] {
            Event::Start(e) if e.name().as_ref() == b"w:pPr" && ppr.is_none() && runs.is_empty() => {
                let fim = fim_da_subarvore(corpo, i)?;
                ppr = Some(xml_bruto(&corpo[i..=fim])?);
                i = fim + 1;
            }
            Event::Start(e) if e.name().as_ref() == b"w:r" => {
                let fim = fim_da_subarvore(corpo, i)?;
                match analisar_run(&corpo[i + 1..fim])? {
                    Some(run) => runs.push(run),
                    None => return Ok(None),
                }
                i = fim + 1;
            }
            Event::Start(e) if ignoravel(e.name().as_ref()) => {
                i = fim_da_subarvore(corpo, i)? + 1;
            }
            Event::Empty(e) if ignoravel(e.name().as_ref()) => i += 1,
            ev if texto_em_branco(ev) => i += 1,
            _ => return Ok(None),
        }
    }
    Ok(Some((ppr, runs)))
}

fn analisar_run(corpo: &[Event<'static>]) -> Result<Option<Run>, AppError> {
    let mut estilo = None;
    let mut texto = String::new();
    let mut i = 0;
    while i < corpo.len() {
        match &corpo[i] {
            Event::Start(e) if e.name().as_ref() == b"w:rPr" && estilo.is_none() => {
                let fim = fim_da_subarvore(corpo, i)?;
                estilo = Some(xml_bruto(&corpo[i..=fim])?);
                i = fim + 1;
            }
            Event::Start(e) if e.name().as_ref() == b"w:t" => {
                let fim = fim_da_subarvore(corpo, i)?;
                for ev in &corpo[i + 1..fim] {
                    match ev {
                        Event::Text(t) => texto.push_str(
                            &t.unescape()
                                .map_err(|e| erro(format!("Texto inválido: {}", e)))?,
                        ),
                        _ => return Ok(None),
                    }
                }
                i = fim + 1;
            }
            Event::Empty(e) if e.name().as_ref() == b"w:t" => i += 1,
            Event::Empty(e) if ignoravel(e.name().as_ref()) => i += 1,
            ev if texto_em_branco(ev) => i += 1,
            _ => return Ok(None),
        }
    }
    Ok(Some(Run { estilo, texto }))
}

fn escrever_paragrafo(
    writer: &mut Writer<Vec<u8>>,
    abre: &BytesStart<'static>,
    corpo: &[Event<'static>],
    trocas: &[(String, String)],
) -> Result<(), AppError> {
    if let Some((ppr, runs)) = analisar(corpo)? {
        let mut atuais: Vec<Span> = runs
            .iter()
            .map(|r| Span::new(r.texto.as_str(), r.estilo.clone()))
            .collect();
        let completo = spans::texto_completo(&atuais);
        if !trocas.iter().any(|(k, _)| completo.contains(k.as_str())) {
            return emitir_bruto(writer, abre, corpo, None);
        }
        for (de, para) in trocas {
            atuais = spans::substituir(&atuais, de, para);
        }
        emitir(writer, Event::Start(abre.clone()))?;
        if let Some(ppr) = &ppr {
            emitir(writer, Event::Text(BytesText::from_escaped(ppr.as_str())))?;
        }
        for span in &atuais {
            emitir(writer, Event::Start(BytesStart::new("w:r")))?;
            if let Some(estilo) = &span.estilo {
                emitir(writer, Event::Text(BytesText::from_escaped(estilo.as_str())))?;
            }
            let mut t = BytesStart::new("w:t");
            t.push_attribute(("xml:space", "preserve"));
            emitir(writer, Event::Start(t))?;
            emitir(writer, Event::Text(BytesText::new(&span.texto)))?;
            emitir(writer, Event::End(BytesEnd::new("w:t")))?;
            emitir(writer, Event::End(BytesEnd::new("w:r")))?;
        }
        emitir(writer, Event::End(BytesEnd::new("w:p")))
    } else {
        emitir_bruto(writer, abre, corpo, Some(trocas))
    }
}

/// Reemite o parágrafo como veio; com `trocas`, substitui dentro de cada nó
/// de texto individualmente (placeholder partido entre runs não é pego aqui).
fn emitir_bruto(
    writer: &mut Writer<Vec<u8>>,
    abre: &BytesStart<'static>,
    corpo: &[Event<'static>],
    trocas: Option<&[(String, String)]>,
) -> Result<(), AppError> {
    emitir(writer, Event::Start(abre.clone()))?;
    for ev in corpo {
        match (ev, trocas) {
            (Event::Text(t), Some(trocas)) => {
                let mut texto = t
                    .unescape()
                    .map_err(|e| erro(format!("Texto inválido: {}", e)))?
                    .to_string();
                for (de, para) in trocas {
                    texto = texto.replace(de, para);
                }
                emitir(writer, Event::Text(BytesText::new(&texto)))?;
            }
            (ev, _) => emitir(writer, ev.clone())?,
        }
    }
    emitir(writer, Event::End(BytesEnd::new("w:p")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trocas(pares: &[(&str, &str)]) -> Vec<(String, String)> {
        pares
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    /// Texto corrido do XML, sem as tags (um placeholder trocado pode sair
    /// repartido entre runs adjacentes).
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

    #[test]
    fn placeholder_partido_entre_runs_preserva_formatacao() {
        let xml = r#"<w:document><w:body><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Contratante: {{CLI</w:t></w:r><w:r><w:t>ENTE}}</w:t></w:r></w:p></w:body></w:document>"#;
        let saida =
            processar_document_xml(xml, &trocas(&[("{{CLIENTE}}", "Fulano & Cia")])).unwrap();
        assert!(saida.contains("Fulano &amp; Cia"), "saida: {}", saida);
        assert!(!saida.contains("{{CLI"));
        assert!(saida.contains("<w:b/>"));
        assert!(saida.contains(r#"<w:jc w:val="center"/>"#));
    }

    #[test]
    fn chaves_sobrepostas_aplicam_na_ordem_declarada() {
        // "(INCLUIR FORMA DE PAGAMENTO)" contém "FORMA DE PAGAMENTO"; a troca
        // mais longa tem que vencer, senão sobra "(INCLUIR PIX)" no contrato.
        let xml = r#"<w:body><w:p><w:r><w:t>Pagamento: (INCLUIR FORMA DE PAGAMENTO)</w:t></w:r></w:p></w:body>"#;
        let mapa = trocas(&[
            ("(INCLUIR FORMA DE PAGAMENTO)", "PIX"),
            ("(FORMA DE PAGAMENTO)", "PIX"),
            ("FORMA DE PAGAMENTO", "PIX"),
        ]);
        for _ in 0..16 {
            let saida = processar_document_xml(xml, &mapa).unwrap();
            let texto = texto_corrido(&saida);
            assert!(texto.contains("Pagamento: PIX"), "saida: {}", saida);
            assert!(!texto.contains("(INCLUIR"), "saida: {}", saida);
        }
    }

    #[test]
    fn paragrafo_sem_placeholder_passa_intacto() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>Sem mudanca</w:t></w:r></w:p></w:body></w:document>"#;
        let saida = processar_document_xml(xml, &trocas(&[("{{X}}", "y")])).unwrap();
        assert_eq!(saida, xml);
    }

    #[test]
    fn paragrafo_em_celula_de_tabela_tambem_troca() {
        let xml = r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{{VALOR_TOTAL}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
        let saida = processar_document_xml(xml, &trocas(&[("{{VALOR_TOTAL}}", "R$ 1.234,56")]))
            .unwrap();
        assert!(saida.contains("R$ 1.234,56"));
        assert!(saida.contains("<w:tbl>") && saida.contains("</w:tbl>"));
    }

    #[test]
    fn conteudo_nao_reconstruivel_cai_no_fallback() {
        let xml = r#"<w:body><w:p><w:hyperlink><w:r><w:t>{{EMAIL}}</w:t></w:r></w:hyperlink></w:p></w:body>"#;
        let saida =
            processar_document_xml(xml, &trocas(&[("{{EMAIL}}", "a@b.com")])).unwrap();
        assert!(saida.contains("a@b.com"));
        assert!(saida.contains("<w:hyperlink>"));
    }

    #[test]
    fn docx_completo_de_ida_e_volta() {
        let dir = tempfile::tempdir().unwrap();
        let origem = dir.path().join("modelo.docx");
        let destino = dir.path().join("contrato.docx");

        let xml = r#"<w:document><w:body><w:p><w:r><w:t>Cliente: {{CLIENTE}}</w:t></w:r></w:p></w:body></w:document>"#;
        {
            let arq = fs::File::create(&origem).unwrap();
            let mut zw = zip::ZipWriter::new(arq);
            let op = SimpleFileOptions::default();
            zw.start_file("[Content_Types].xml", op).unwrap();
            zw.write_all(b"<Types/>").unwrap();
            zw.start_file("word/document.xml", op).unwrap();
            zw.write_all(xml.as_bytes()).unwrap();
            zw.finish().unwrap();
        }

        substituir_no_docx(&origem, &destino, &trocas(&[("{{CLIENTE}}", "Beltrano")]))
            .unwrap();

        let mut pacote = zip::ZipArchive::new(fs::File::open(&destino).unwrap()).unwrap();
        let mut corpo = String::new();
        pacote
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut corpo)
            .unwrap();
        assert!(texto_corrido(&corpo).contains("Cliente: Beltrano"), "corpo: {}", corpo);
        assert!(pacote.by_name("[Content_Types].xml").is_ok());
        assert!(!destino.with_extension("docx.tmp").exists());
    }

    #[test]
    fn erro_no_meio_nao_deixa_temporario_para_tras() {
        let dir = tempfile::tempdir().unwrap();
        let origem = dir.path().join("modelo.docx");
        let destino = dir.path().join("contrato.docx");

        // document.xml truncado: a troca falha depois do temporário existir.
        {
            let arq = fs::File::create(&origem).unwrap();
            let mut zw = zip::ZipWriter::new(arq);
            let op = SimpleFileOptions::default();
            zw.start_file("word/document.xml", op).unwrap();
            zw.write_all(b"<w:body><w:p><w:r><w:t>{{X}}</w:t>").unwrap();
            zw.finish().unwrap();
        }

        let erro = substituir_no_docx(&origem, &destino, &trocas(&[("{{X}}", "y")]))
            .unwrap_err();
        assert!(matches!(erro, AppError::Template(_)));
        assert!(!destino.exists());
        assert!(!destino.with_extension("docx.tmp").exists());
    }
}
