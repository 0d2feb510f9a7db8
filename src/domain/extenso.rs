// src/domain/extenso.rs
//
// Valor monetário por extenso em português, usado no contrato DOCX
// ("mil e duzentos e trinta e quatro reais e cinquenta e seis centavos").

const UNIDADES: [&str; 10] = [
    "", "um", "dois", "três", "quatro", "cinco", "seis", "sete", "oito", "nove",
];
const DEZ_A_DEZENOVE: [&str; 10] = [
    "dez", "onze", "doze", "treze", "quatorze", "quinze", "dezesseis",
    "dezessete", "dezoito", "dezenove",
];
const DEZENAS: [&str; 10] = [
    "", "", "vinte", "trinta", "quarenta", "cinquenta", "sessenta", "setenta",
    "oitenta", "noventa",
];
const CENTENAS: [&str; 10] = [
    "", "cento", "duzentos", "trezentos", "quatrocentos", "quinhentos",
    "seiscentos", "setecentos", "oitocentos", "novecentos",
];

fn centena_por_extenso(n: u64) -> String {
    debug_assert!(n <= 999);
    if n == 0 {
        return String::new();
    }
    if n == 100 {
        return "cem".to_string();
    }
    let c = (n / 100) as usize;
    let d = ((n % 100) / 10) as usize;
    let u = (n % 10) as usize;
    let mut partes: Vec<&str> = Vec::new();
    if c > 0 {
        partes.push(CENTENAS[c]);
    }
    if d == 1 {
        if !partes.is_empty() {
            partes.push("e");
        }
        partes.push(DEZ_A_DEZENOVE[u]);
        return partes.join(" ");
    }
    if d >= 2 {
        if !partes.is_empty() {
            partes.push("e");
        }
        partes.push(DEZENAS[d]);
    }
    if u > 0 {
        if !partes.is_empty() {
            partes.push("e");
        }
        partes.push(UNIDADES[u]);
    }
    partes.join(" ")
}

fn grupo_milhao(n: u64) -> String {
    match n {
        0 => String::new(),
        1 => "um milhão".to_string(),
        _ => format!("{} milhões", centena_por_extenso(n)),
    }
}

/// Escreve o valor em reais por extenso. Centavos arredondados para duas
/// casas; 100 centavos transbordam para a parte inteira.
pub fn numero_por_extenso_reais(valor: f64) -> String {
    if valor < 0.0 {
        return format!("menos {}", numero_por_extenso_reais(-valor));
    }
    let mut inteiro = valor.trunc() as u64;
    let mut centavos = ((valor - valor.trunc()) * 100.0).round() as u64;
    if centavos == 100 {
        inteiro += 1;
        centavos = 0;
    }

    let mi = inteiro / 1_000_000;
    let milhar = (inteiro % 1_000_000) / 1000;
    let resto = inteiro % 1000;

    let mut partes: Vec<String> = Vec::new();
    if mi > 0 {
        partes.push(grupo_milhao(mi));
    }
    if milhar > 0 {
        if milhar == 1 {
            partes.push("mil".to_string());
        } else {
            partes.push(format!("{} mil", centena_por_extenso(milhar)));
        }
    }
    if resto > 0 {
        if !partes.is_empty() {
            partes.push("e".to_string());
        }
        partes.push(centena_por_extenso(resto));
    }
    if partes.is_empty() {
        partes.push("zero".to_string());
    }

    let reais = if inteiro == 1 { "real" } else { "reais" };
    let mut frase = format!("{} {}", partes.join(" "), reais);

    if centavos > 0 {
        let cent = if centavos == 1 { "centavo" } else { "centavos" };
        frase.push_str(&format!(" e {} {}", centena_por_extenso(centavos), cent));
    }
    frase
}
