// src/docx/spans.rs
//
// Substituição de texto sobre uma sequência de trechos estilizados. O Word
// fragmenta um parágrafo em "runs" arbitrários, então um placeholder pode
// estar partido no meio ("{{CLI" + "ENTE}}"). Aqui a troca acontece sobre o
// texto concatenado do parágrafo, e os pedaços não atingidos preservam o
// estilo original; o texto novo herda o estilo do trecho onde o placeholder
// começa.

/// Um trecho de texto com formatação opaca (o XML do `w:rPr`, quando existe).
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub texto: String,
    pub estilo: Option<String>,
}

impl Span {
    pub fn new(texto: impl Into<String>, estilo: Option<String>) -> Self {
        Self { texto: texto.into(), estilo }
    }
}

pub fn texto_completo(spans: &[Span]) -> String {
    spans.iter().map(|s| s.texto.as_str()).collect()
}

/// Estilo do trecho que contém o byte `pos` do texto concatenado.
fn estilo_em(spans: &[Span], pos: usize) -> Option<String> {
    let mut inicio = 0;
    for s in spans {
        let fim = inicio + s.texto.len();
        if pos >= inicio && pos < fim {
            return s.estilo.clone();
        }
        inicio = fim;
    }
    spans.last().and_then(|s| s.estilo.clone())
}

/// Fatia o intervalo de bytes [de, ate) do texto concatenado, preservando os
/// estilos dos trechos originais.
fn fatiar(spans: &[Span], de: usize, ate: usize, saida: &mut Vec<Span>) {
    let mut inicio = 0;
    for s in spans {
        let fim = inicio + s.texto.len();
        let a = de.max(inicio);
        let b = ate.min(fim);
        if a < b {
            saida.push(Span::new(&s.texto[a - inicio..b - inicio], s.estilo.clone()));
        }
        inicio = fim;
    }
}

/// Substitui todas as ocorrências de `de` por `para`, mesmo quando a
/// ocorrência cruza a fronteira entre trechos.
pub fn substituir(spans: &[Span], de: &str, para: &str) -> Vec<Span> {
    let completo = texto_completo(spans);
    if de.is_empty() || !completo.contains(de) {
        return spans.to_vec();
    }

    let mut saida = Vec::new();
    let mut pos = 0;
    let ocorrencias: Vec<usize> = completo.match_indices(de).map(|(i, _)| i).collect();
    for inicio in ocorrencias {
        if inicio < pos {
            // Ocorrência sobreposta à anterior já consumida.
            continue;
        }
        fatiar(spans, pos, inicio, &mut saida);
        saida.push(Span::new(para, estilo_em(spans, inicio)));
        pos = inicio + de.len();
    }
    fatiar(spans, pos, completo.len(), &mut saida);
    saida.retain(|s| !s.texto.is_empty());
    saida
}
