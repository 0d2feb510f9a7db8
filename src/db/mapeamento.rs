// src/db/mapeamento.rs
//
// Mapeamento bidirecional entre os labels de exibição (cabeçalhos da antiga
// planilha, ex.: "ID Orçamento") e os nomes de coluna normalizados do banco
// (ex.: id_orcamento). O sentido reverso é construído mecanicamente a partir
// da mesma tabela; nunca é mantido à mão.

use std::collections::HashMap;

/// Registro com chaves de exibição, como trafega nos handlers.
pub type Registro = HashMap<String, String>;

/// Tabela fixa e ordenada label -> coluna para uma espécie de registro.
pub struct Mapeamento {
    pares: &'static [(&'static str, &'static str)],
}

// Atenção: "Status" e "Desconto" apontam ambos para a coluna `desconto`.
// É um resquício de renomeação herdado da planilha; o último par aplicado
// ganha, e o reverso mecânico devolve "Desconto". Mantido de propósito.
pub const ORCAMENTOS: Mapeamento = Mapeamento {
    pares: &[
        ("ID Orçamento", "id_orcamento"),
        ("Data/Hora", "data_hora"),
        ("Tipo de Serviço", "tipo_servico"),
        ("Cliente (Etiqueta PDF)", "cliente_label"),
        ("Cliente (Valor)", "cliente_valor"),
        ("Documento", "documento"),
        ("CNPJ/CPF", "cnpj_cpf"),
        ("E-mail", "email"),
        ("Vendedor", "vendedor"),
        ("Status", "desconto"),
        ("Desconto", "desconto"),
        ("Quantidade", "quantidade"),
        ("Unidade", "unidade"),
        ("Metros", "metros"),
        ("Preço por metro", "preco_por_metro"),
        ("Forma de Pagamento", "forma_pagamento"),
        ("Valor Total", "valor_total"),
    ],
};

pub const CADASTROS: Mapeamento = Mapeamento {
    pares: &[
        ("Documento", "documento"),
        ("CNPJ/CPF", "cnpj_cpf"),
        ("Razão Social/Nome", "razao_social_nome"),
        ("Nome Fantasia", "nome_fantasia"),
        ("Contato", "contato"),
        ("E-mail (CNPJ)", "email_cnpj"),
        ("E-mail (Manual)", "email_manual"),
        ("CEP", "cep"),
        ("Endereço", "endereco"),
        ("Número", "numero"),
        ("Complemento", "complemento"),
        ("Bairro", "bairro"),
        ("Município", "municipio"),
        ("UF", "uf"),
        ("Entrega CEP", "entrega_cep"),
        ("Entrega Endereço", "entrega_endereco"),
        ("Entrega Número", "entrega_numero"),
        ("Entrega Complemento", "entrega_complemento"),
        ("Entrega Bairro", "entrega_bairro"),
        ("Entrega Município", "entrega_municipio"),
        ("Entrega UF", "entrega_uf"),
        ("Desconto Duração", "desconto_duracao"),
        ("Desconto Unidade", "desconto_unidade"),
        ("Telefone 1", "telefone1"),
        ("Telefone 2", "telefone2"),
        ("Vendedor", "vendedor"),
        ("Criado em", "criado_em"),
        ("Atualizado em", "atualizado_em"),
    ],
};

pub const PEDIDOS: Mapeamento = Mapeamento {
    pares: &[
        ("ID", "id"),
        ("Pedido", "pedido"),
        ("Tipo de Serviço", "tipo_servico"),
        ("Status do Cliente", "status_cliente"),
        ("Quantidade (m)", "quantidade_m"),
        ("Valor Unitário", "valor_unitario"),
        ("Valor Total", "valor_total"),
        ("Data/Hora da criação do pedido", "data_hora_criacao"),
        ("ID Orçamento", "id_orcamento"),
        ("Documento", "documento"),
        ("CNPJ/CPF", "cnpj_cpf"),
        ("Cliente", "cliente"),
        ("Vendedor", "vendedor"),
        ("Forma de Pagamento Orçamento", "forma_pgto_orcamento"),
        ("Forma de Pagamento Contrato", "forma_pgto_contrato"),
        ("% Comissão Vendedor", "pct_comissao_vendedor"),
        ("Valor Comissão Vendedor", "valor_comissao_vendedor"),
        ("% Comissão ADM", "pct_comissao_adm"),
        ("Valor Comissão ADM", "valor_comissao_adm"),
    ],
};

impl Mapeamento {
    /// Pares label -> coluna na ordem declarada.
    pub fn pares(&self) -> &'static [(&'static str, &'static str)] {
        self.pares
    }

    /// Colunas na ordem declarada, sem repetição (a segunda ocorrência de uma
    /// coluna duplicada é descartada — ela já foi preenchida pelo par anterior
    /// ou será sobrescrita por `para_colunas`).
    pub fn colunas(&self) -> Vec<&'static str> {
        let mut vistas = Vec::new();
        for (_, col) in self.pares {
            if !vistas.contains(col) {
                vistas.push(*col);
            }
        }
        vistas
    }

    /// Traduz um registro de labels para colunas. Chaves fora da tabela são
    /// descartadas; com labels duplicados, o último aplicado ganha.
    pub fn para_colunas(&self, registro: &Registro) -> HashMap<&'static str, String> {
        let mut saida: HashMap<&'static str, String> = HashMap::new();
        for (label, coluna) in self.pares {
            if let Some(v) = registro.get(*label) {
                saida.insert(*coluna, v.clone());
            } else {
                saida.entry(*coluna).or_default();
            }
        }
        saida
    }

    /// Traduz um mapa de colunas de volta para labels. Todo label configurado
    /// aparece na saída; coluna ausente vira string vazia.
    pub fn para_labels(&self, colunas: &HashMap<String, String>) -> Registro {
        let mut saida = Registro::new();
        for (label, coluna) in self.pares {
            let valor = colunas.get(*coluna).cloned().unwrap_or_default();
            saida.insert((*label).to_string(), valor);
        }
        saida
    }
}
