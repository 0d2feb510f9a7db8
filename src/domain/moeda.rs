// src/domain/moeda.rs
//
// Formatação numérica pt-BR ("1.234,56") usada em todas as colunas de valor.
// As colunas persistidas são texto nesse formato; as views tipadas do banco
// fazem o caminho inverso para ferramentas analíticas.

/// Formata com duas casas, ponto de milhar e vírgula decimal.
pub fn formatar_ptbr(n: f64) -> String {
    let negativo = n < 0.0;
    let abs = if negativo { -n } else { n };
    let texto = format!("{:.2}", abs);
    let (inteiro, decimais) = texto.split_once('.').unwrap_or((texto.as_str(), "00"));

    let mut milhares = String::new();
    let digitos: Vec<char> = inteiro.chars().collect();
    for (i, c) in digitos.iter().enumerate() {
        if i > 0 && (digitos.len() - i) % 3 == 0 {
            milhares.push('.');
        }
        milhares.push(*c);
    }

    let sinal = if negativo { "-" } else { "" };
    format!("{}{},{}", sinal, milhares, decimais)
}

/// Converte "1.234,56" -> 1234.56. Entrada irreconhecível vira 0.0 (a regra
/// herdada do fluxo de digitação: quantidade inválida é tratada adiante).
pub fn parse_ptbr(txt: &str) -> f64 {
    let limpo = txt.trim().replace('.', "").replace(',', ".");
    limpo.parse::<f64>().unwrap_or(0.0)
}
