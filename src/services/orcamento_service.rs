// src/services/orcamento_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{Filtro, Registro, Storage},
    domain::{documentos, moeda},
    models::orcamento::{OrcamentoIn, OrcamentoOut, StatusCliente, TipoServico, Unidade},
};

// Preço do metro: com desconto para clientes Novo/Ativo.
const PRECO_COM_DESCONTO: f64 = 8.00;
const PRECO_SEM_DESCONTO: f64 = 8.50;

#[derive(Clone)]
pub struct OrcamentoService {
    storage: Arc<dyn Storage>,
}

impl OrcamentoService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn sigla(tipo: TipoServico) -> &'static str {
        // "IM" quando o tipo de serviço começa com "Imp"; o resto é "DG".
        if tipo.as_str().to_lowercase().starts_with("imp") {
            "IM"
        } else {
            "DG"
        }
    }

    /// Aloca e formata o próximo id: `OR-{IM|DG}{seq}{DDMMYYYY}`. A alocação
    /// consome um número da sequência mesmo que o orçamento não seja salvo;
    /// buracos na numeração são aceitáveis.
    pub async fn proximo_id(&self, tipo: TipoServico) -> Result<String, AppError> {
        let sigla = Self::sigla(tipo);
        let seq = self.storage.proximo_sequencial_orcamento(sigla).await?;
        let hoje = chrono::Local::now().format("%d%m%Y");
        Ok(format!("OR-{}{}{}", sigla, seq, hoje))
    }

    pub async fn criar(&self, payload: OrcamentoIn) -> Result<OrcamentoOut, AppError> {
        payload.validate()?;

        if !documentos::validar_email(payload.email.trim()) {
            return Err(AppError::Validacao("E-mail inválido.".to_string()));
        }
        let digitos = documentos::apenas_digitos(&payload.cnpj);
        if digitos.len() != 11 && digitos.len() != 14 {
            return Err(AppError::Validacao(
                "O documento precisa ter 11 (CPF) ou 14 (CNPJ) dígitos.".to_string(),
            ));
        }

        let quantidade = moeda::parse_ptbr(&payload.quantidade);
        if quantidade <= 0.0 {
            return Err(AppError::Validacao(
                "A quantidade deve ser maior que zero.".to_string(),
            ));
        }

        let mut metros = match payload.unidade {
            Unidade::Centimetros => quantidade / 100.0,
            Unidade::Metro => quantidade,
        };
        if let Some(m) = payload.metros_opc.as_deref().filter(|m| !m.trim().is_empty()) {
            metros = moeda::parse_ptbr(m);
        }

        let mut preco = if payload.status.tem_desconto() {
            PRECO_COM_DESCONTO
        } else {
            PRECO_SEM_DESCONTO
        };
        if let Some(p) = payload
            .preco_por_metro_opc
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        {
            preco = moeda::parse_ptbr(p);
        }

        let total = metros * preco;

        let tipo_doc = if digitos.len() == 14 { "CNPJ" } else { "CPF" };
        let etiqueta_cliente = if tipo_doc == "CPF" { "Nome" } else { "Razão Social" };
        let doc_formatado = documentos::formatar_doc(tipo_doc, &digitos);

        let id = self.proximo_id(payload.tipo_servico).await?;
        let data_hora = chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string();

        let mut registro = Registro::new();
        let mut poe = |label: &str, valor: String| {
            registro.insert(label.to_string(), valor);
        };
        poe("ID Orçamento", id.clone());
        poe("Data/Hora", data_hora.clone());
        poe("Tipo de Serviço", payload.tipo_servico.as_str().to_string());
        poe("Cliente (Etiqueta PDF)", etiqueta_cliente.to_string());
        poe("Cliente (Valor)", payload.cliente.clone());
        poe("Documento", tipo_doc.to_string());
        poe("CNPJ/CPF", doc_formatado.clone());
        poe("E-mail", payload.email.trim().to_string());
        poe("Vendedor", payload.vendedor.clone().unwrap_or_default());
        poe("Desconto", payload.status.as_str().to_string());
        poe("Quantidade", payload.quantidade.clone());
        poe("Unidade", payload.unidade.as_str().to_string());
        poe("Metros", moeda::formatar_ptbr(metros));
        poe("Preço por metro", moeda::formatar_ptbr(preco));
        poe(
            "Forma de Pagamento",
            payload.forma_pagamento.clone().unwrap_or_default(),
        );
        poe("Valor Total", moeda::formatar_ptbr(total));

        self.storage.salvar_orcamento(&registro).await?;
        tracing::info!("✅ Orçamento {} salvo ({})", id, payload.cliente);

        Ok(OrcamentoOut {
            id_orcamento: id,
            data_hora,
            tipo_servico: payload.tipo_servico.as_str().to_string(),
            cliente: payload.cliente,
            cnpj: doc_formatado,
            email: payload.email.trim().to_string(),
            status: payload.status.as_str().to_string(),
            quantidade: payload.quantidade,
            unidade: payload.unidade.as_str().to_string(),
            metros: moeda::formatar_ptbr(metros),
            preco_por_metro: moeda::formatar_ptbr(preco),
            valor_total: moeda::formatar_ptbr(total),
        })
    }

    pub async fn listar(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        self.storage.listar_orcamentos(filtro).await
    }

    pub async fn por_id(&self, id: &str) -> Result<Registro, AppError> {
        self.storage
            .orcamento_por_id(id)
            .await?
            .ok_or_else(|| AppError::NaoEncontrado(format!("Orçamento '{}' não encontrado.", id)))
    }

    /// Busca pontual usada pela listagem com `?id=`: id desconhecido não é
    /// erro, devolve a lista vazia.
    pub async fn por_id_em_lista(&self, id: &str) -> Result<Vec<Registro>, AppError> {
        Ok(self.storage.orcamento_por_id(id).await?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memoria::MemStorage;

    fn payload() -> OrcamentoIn {
        OrcamentoIn {
            tipo_servico: TipoServico::Impressao,
            cliente: "Confecções Aurora Ltda".to_string(),
            cnpj: "11.222.333/0001-81".to_string(),
            email: "compras@aurora.com.br".to_string(),
            status: StatusCliente::Novo,
            unidade: Unidade::Centimetros,
            quantidade: "250".to_string(),
            vendedor: Some("Maria".to_string()),
            forma_pagamento: Some("PIX".to_string()),
            preco_por_metro_opc: None,
            metros_opc: None,
        }
    }

    #[tokio::test]
    async fn criar_calcula_metros_preco_e_total() {
        let svc = OrcamentoService::new(Arc::new(MemStorage::default()));
        let saida = svc.criar(payload()).await.unwrap();
        // 250 cm -> 2,50 m; cliente Novo paga 8,00; total 20,00.
        assert_eq!(saida.metros, "2,50");
        assert_eq!(saida.preco_por_metro, "8,00");
        assert_eq!(saida.valor_total, "20,00");
        assert!(saida.id_orcamento.starts_with("OR-IM1"));
        assert_eq!(saida.cnpj, "11.222.333/0001-81");
    }

    #[tokio::test]
    async fn status_sem_desconto_usa_preco_cheio() {
        let svc = OrcamentoService::new(Arc::new(MemStorage::default()));
        let mut p = payload();
        p.status = StatusCliente::SemDesconto;
        p.unidade = Unidade::Metro;
        p.quantidade = "2".to_string();
        let saida = svc.criar(p).await.unwrap();
        assert_eq!(saida.preco_por_metro, "8,50");
        assert_eq!(saida.valor_total, "17,00");
    }

    #[tokio::test]
    async fn overrides_de_metros_e_preco() {
        let svc = OrcamentoService::new(Arc::new(MemStorage::default()));
        let mut p = payload();
        p.metros_opc = Some("10,00".to_string());
        p.preco_por_metro_opc = Some("12,50".to_string());
        let saida = svc.criar(p).await.unwrap();
        assert_eq!(saida.valor_total, "125,00");
    }

    #[tokio::test]
    async fn quantidade_zero_e_rejeitada() {
        let svc = OrcamentoService::new(Arc::new(MemStorage::default()));
        let mut p = payload();
        p.quantidade = "0".to_string();
        assert!(matches!(
            svc.criar(p).await,
            Err(AppError::Validacao(_))
        ));
    }

    #[tokio::test]
    async fn email_invalido_e_rejeitado() {
        let svc = OrcamentoService::new(Arc::new(MemStorage::default()));
        let mut p = payload();
        p.email = "sem-arroba".to_string();
        assert!(matches!(svc.criar(p).await, Err(AppError::Validacao(_))));
    }

    #[tokio::test]
    async fn busca_em_lista_devolve_vazio_para_id_desconhecido() {
        let svc = OrcamentoService::new(Arc::new(MemStorage::default()));
        let criado = svc.criar(payload()).await.unwrap();

        let achado = svc.por_id_em_lista(&criado.id_orcamento).await.unwrap();
        assert_eq!(achado.len(), 1);
        let vazio = svc.por_id_em_lista("OR-IM9901012099").await.unwrap();
        assert!(vazio.is_empty());
        // A busca pontual continua sendo 404.
        assert!(matches!(
            svc.por_id("OR-IM9901012099").await,
            Err(AppError::NaoEncontrado(_))
        ));
    }

    #[tokio::test]
    async fn dois_proximo_id_nunca_repetem() {
        let svc = OrcamentoService::new(Arc::new(MemStorage::default()));
        let a = svc.proximo_id(TipoServico::Impressao).await.unwrap();
        let b = svc.proximo_id(TipoServico::Impressao).await.unwrap();
        assert_ne!(a, b);
        // A sigla de digitalização tem contador próprio.
        let c = svc.proximo_id(TipoServico::Digitalizacao).await.unwrap();
        assert!(c.starts_with("OR-DG1"));
    }
}
