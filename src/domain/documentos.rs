// src/domain/documentos.rs
//
// Validação e formatação de documentos brasileiros (CNPJ/CPF), CEP e e-mail.
// Todas as funções são puras: retornam bool/String e nunca dão panic.
// Formatadores são tolerantes: se a contagem de dígitos não bate, devolvem a
// entrada como veio.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@[\w.-]+\.[A-Za-z]{2,}(?:\.[A-Za-z]{2,})*$").unwrap()
});

/// Mantém apenas os dígitos da string.
pub fn apenas_digitos(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn todos_iguais(n: &str) -> bool {
    let mut chars = n.chars();
    match chars.next() {
        Some(primeiro) => chars.all(|c| c == primeiro),
        None => true,
    }
}

fn digito(c: char) -> u32 {
    c.to_digit(10).unwrap_or(0)
}

/// Valida o CNPJ pelos dois dígitos verificadores (módulo 11).
pub fn validar_cnpj(cnpj: &str) -> bool {
    let n = apenas_digitos(cnpj);
    if n.len() != 14 || todos_iguais(&n) {
        return false;
    }
    let d: Vec<u32> = n.chars().map(digito).collect();
    let p1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    let r1 = (0..12).map(|i| d[i] * p1[i]).sum::<u32>() % 11;
    let dv1 = if r1 < 2 { 0 } else { 11 - r1 };
    // Segunda passada usa o mesmo vetor de pesos com 6 na frente.
    let r2 = (d[0] * 6 + (0..12).map(|i| d[i + 1] * p1[i]).sum::<u32>()) % 11;
    let dv2 = if r2 < 2 { 0 } else { 11 - r2 };
    d[12] == dv1 && d[13] == dv2
}

/// Valida o CPF. `restringir_rj` aplica a regra de negócio da região fiscal:
/// o 9º dígito precisa ser 7 (não é regra do algoritmo genérico de CPF).
pub fn validar_cpf(cpf: &str, restringir_rj: bool) -> bool {
    let n = apenas_digitos(cpf);
    if n.len() != 11 || todos_iguais(&n) {
        return false;
    }
    let d: Vec<u32> = n.chars().map(digito).collect();
    if restringir_rj && d[8] != 7 {
        return false;
    }
    let s1: u32 = (0..9).map(|i| d[i] * (10 - i as u32)).sum();
    let mut dv1 = (s1 * 10) % 11;
    if dv1 == 10 {
        dv1 = 0;
    }
    let s2: u32 = (0..10).map(|i| d[i] * (11 - i as u32)).sum();
    let mut dv2 = (s2 * 10) % 11;
    if dv2 == 10 {
        dv2 = 0;
    }
    d[9] == dv1 && d[10] == dv2
}

/// Formata `11222333000181` -> `11.222.333/0001-81`. Com contagem errada de
/// dígitos devolve a entrada intacta.
pub fn formatar_cnpj(cnpj: &str) -> String {
    let mut n = apenas_digitos(cnpj);
    n.truncate(14);
    if n.len() == 14 {
        format!("{}.{}.{}/{}-{}", &n[..2], &n[2..5], &n[5..8], &n[8..12], &n[12..])
    } else {
        cnpj.to_string()
    }
}

/// Formata `12345678907` -> `123.456.789-07`.
pub fn formatar_cpf(cpf: &str) -> String {
    let mut n = apenas_digitos(cpf);
    n.truncate(11);
    if n.len() == 11 {
        format!("{}.{}.{}-{}", &n[..3], &n[3..6], &n[6..9], &n[9..])
    } else {
        cpf.to_string()
    }
}

/// Formata `20000000` -> `20000-000`.
pub fn formatar_cep(cep: &str) -> String {
    let mut n = apenas_digitos(cep);
    n.truncate(8);
    if n.len() == 8 {
        format!("{}-{}", &n[..5], &n[5..])
    } else {
        cep.to_string()
    }
}

pub fn validar_email(email: &str) -> bool {
    RE_EMAIL.is_match(email)
}

/// Despacha pela espécie do documento ("CNPJ" | "CPF").
pub fn formatar_doc(tipo: &str, valor: &str) -> String {
    match tipo {
        "CNPJ" => formatar_cnpj(valor),
        "CPF" => formatar_cpf(valor),
        _ => valor.to_string(),
    }
}

pub fn validar_doc(tipo: &str, valor: &str) -> bool {
    match tipo {
        "CNPJ" => validar_cnpj(valor),
        "CPF" => validar_cpf(valor, true),
        _ => false,
    }
}

/// Monta "LOGRADOURO, Número, COMPLEMENTO, BAIRRO, Município/UF, CEP: 00000-000"
/// a partir de um cadastro (labels de exibição). Campos de entrega têm
/// prioridade; na ausência, caem para os campos de cobrança.
pub fn montar_endereco_entrega(cad: &HashMap<String, String>) -> String {
    let pega = |entrega: &str, base: &str| -> String {
        let v = cad.get(entrega).map(|s| s.trim()).unwrap_or("");
        if !v.is_empty() {
            return v.to_string();
        }
        cad.get(base).map(|s| s.trim().to_string()).unwrap_or_default()
    };

    let log = pega("Entrega Endereço", "Endereço");
    let num = pega("Entrega Número", "Número");
    let comp = pega("Entrega Complemento", "Complemento");
    let bai = pega("Entrega Bairro", "Bairro");
    let mun = pega("Entrega Município", "Município");
    let uf = pega("Entrega UF", "UF");
    let cep_raw = pega("Entrega CEP", "CEP");

    let mut partes: Vec<String> = Vec::new();
    for p in [log, num, comp, bai] {
        if !p.is_empty() {
            partes.push(p);
        }
    }
    if !mun.is_empty() || !uf.is_empty() {
        let munuf = if uf.is_empty() { mun } else { format!("{}/{}", mun, uf) };
        partes.push(munuf);
    }
    if !cep_raw.is_empty() {
        partes.push(format!("CEP: {}", formatar_cep(&cep_raw)));
    }
    partes.join(", ")
}

const TIPOS_LOGRADOURO: &[&str] = &[
    "rua", "avenida", "av.", "av", "estrada", "rodovia", "travessa", "alameda",
    "praça", "largo", "vielas", "viela", "rod.", "r.", "r",
];

/// Garante que o endereço comece com um tipo de logradouro; quando não tem,
/// antepõe o prefixo preferencial (ex.: "Rua ").
pub fn garantir_tipo_logradouro(prefixo: &str, endereco: &str) -> String {
    let e = endereco.trim();
    if e.is_empty() {
        return e.to_string();
    }
    let primeira = e
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c| c == '.' || c == ',')
        .to_lowercase();
    if TIPOS_LOGRADOURO.contains(&primeira.as_str()) {
        return e.to_string();
    }
    let mut pref = prefixo.trim().to_string();
    if pref.is_empty() {
        pref = "Rua".to_string();
    }
    format!("{} {}", pref, e)
}
