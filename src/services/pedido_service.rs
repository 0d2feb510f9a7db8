// src/services/pedido_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{Filtro, Registro, Storage},
    domain::{documentos, moeda},
    models::pedido::PedidoIn,
};

// Comissão administrativa fixa; a do vendedor é configurável.
const PCT_COMISSAO_ADM: f64 = 1.0;

#[derive(Clone)]
pub struct PedidoService {
    storage: Arc<dyn Storage>,
    pct_comissao_vendedor: f64,
}

impl PedidoService {
    pub fn new(storage: Arc<dyn Storage>, pct_comissao_vendedor: f64) -> Self {
        Self { storage, pct_comissao_vendedor }
    }

    /// Converte um orçamento em pedido. Número e id ("CT-{n}") são alocados
    /// quando ausentes; comissões faltantes são calculadas do valor total.
    pub async fn criar(&self, payload: PedidoIn) -> Result<Registro, AppError> {
        payload.validate()?;

        let digitos = documentos::apenas_digitos(&payload.cnpj_cpf);
        if digitos.len() != 11 && digitos.len() != 14 {
            return Err(AppError::Validacao(
                "O documento precisa ter 11 (CPF) ou 14 (CNPJ) dígitos.".to_string(),
            ));
        }

        let numero = match payload.pedido {
            Some(n) => n,
            None => self.storage.proximo_numero_pedido().await?,
        };
        let id = payload
            .id
            .clone()
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| format!("CT-{}", numero));

        let total = moeda::parse_ptbr(payload.valor_total.as_deref().unwrap_or(""));

        let pct_vendedor = payload
            .pct_comissao_vendedor
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(moeda::parse_ptbr)
            .unwrap_or(self.pct_comissao_vendedor);
        let valor_vendedor = payload
            .valor_comissao_vendedor
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| moeda::formatar_ptbr(total * pct_vendedor / 100.0));

        let pct_adm = payload
            .pct_comissao_adm
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(moeda::parse_ptbr)
            .unwrap_or(PCT_COMISSAO_ADM);
        let valor_adm = payload
            .valor_comissao_adm
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| moeda::formatar_ptbr(total * pct_adm / 100.0));

        let data_hora = payload
            .data_hora_criacao
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string());
        let tipo_doc = if digitos.len() == 14 { "CNPJ" } else { "CPF" };
        let documento = payload
            .documento
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| tipo_doc.to_string());

        let mut registro = Registro::new();
        let mut poe = |label: &str, valor: String| {
            registro.insert(label.to_string(), valor);
        };
        poe("ID", id.clone());
        poe("Pedido", numero.to_string());
        poe("Tipo de Serviço", payload.tipo_servico.clone().unwrap_or_default());
        poe("Status do Cliente", payload.status_cliente.clone().unwrap_or_default());
        poe("Quantidade (m)", payload.quantidade_m.clone().unwrap_or_default());
        poe("Valor Unitário", payload.valor_unitario.clone().unwrap_or_default());
        poe("Valor Total", payload.valor_total.clone().unwrap_or_default());
        poe("Data/Hora da criação do pedido", data_hora);
        poe("ID Orçamento", payload.id_orcamento.clone().unwrap_or_default());
        poe("Documento", documento);
        poe("CNPJ/CPF", digitos);
        poe("Cliente", payload.cliente.clone().unwrap_or_default());
        poe("Vendedor", payload.vendedor.clone().unwrap_or_default());
        poe(
            "Forma de Pagamento Orçamento",
            payload.forma_pgto_orcamento.clone().unwrap_or_default(),
        );
        poe(
            "Forma de Pagamento Contrato",
            payload.forma_pgto_contrato.clone().unwrap_or_default(),
        );
        poe("% Comissão Vendedor", moeda::formatar_ptbr(pct_vendedor));
        poe("Valor Comissão Vendedor", valor_vendedor);
        poe("% Comissão ADM", moeda::formatar_ptbr(pct_adm));
        poe("Valor Comissão ADM", valor_adm);

        self.storage.salvar_pedido(&registro).await?;
        tracing::info!("✅ Pedido {} salvo", id);
        Ok(registro)
    }

    pub async fn listar(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        self.storage.listar_pedidos(filtro).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memoria::MemStorage;

    fn payload() -> PedidoIn {
        PedidoIn {
            id: None,
            pedido: None,
            tipo_servico: Some("Impressão".to_string()),
            status_cliente: Some("Novo".to_string()),
            quantidade_m: Some("2,50".to_string()),
            valor_unitario: Some("8,00".to_string()),
            valor_total: Some("1.000,00".to_string()),
            data_hora_criacao: None,
            id_orcamento: Some("OR-IM101012025".to_string()),
            documento: None,
            cnpj_cpf: "111.444.777-35".to_string(),
            cliente: Some("Fulano".to_string()),
            vendedor: Some("Maria".to_string()),
            forma_pgto_orcamento: None,
            forma_pgto_contrato: Some("PIX".to_string()),
            pct_comissao_vendedor: None,
            valor_comissao_vendedor: None,
            pct_comissao_adm: None,
            valor_comissao_adm: None,
        }
    }

    #[tokio::test]
    async fn criar_aloca_numero_id_e_comissoes() {
        let svc = PedidoService::new(Arc::new(MemStorage::default()), 5.0);
        let registro = svc.criar(payload()).await.unwrap();
        assert_eq!(registro.get("ID").map(String::as_str), Some("CT-1"));
        assert_eq!(registro.get("Pedido").map(String::as_str), Some("1"));
        // 5% e 1% de 1.000,00.
        assert_eq!(
            registro.get("Valor Comissão Vendedor").map(String::as_str),
            Some("50,00")
        );
        assert_eq!(
            registro.get("Valor Comissão ADM").map(String::as_str),
            Some("10,00")
        );
        assert_eq!(registro.get("CNPJ/CPF").map(String::as_str), Some("11144477735"));
        assert_eq!(registro.get("Documento").map(String::as_str), Some("CPF"));
    }

    #[tokio::test]
    async fn numeros_de_pedido_sao_crescentes() {
        let svc = PedidoService::new(Arc::new(MemStorage::default()), 5.0);
        let a = svc.criar(payload()).await.unwrap();
        let b = svc.criar(payload()).await.unwrap();
        let na: i64 = a.get("Pedido").unwrap().parse().unwrap();
        let nb: i64 = b.get("Pedido").unwrap().parse().unwrap();
        assert!(nb > na);
    }

    #[tokio::test]
    async fn reenvio_do_mesmo_id_nao_duplica() {
        let mem = Arc::new(MemStorage::default());
        let svc = PedidoService::new(mem.clone(), 5.0);
        let mut p = payload();
        p.id = Some("CT-77".to_string());
        p.pedido = Some(77);
        svc.criar(p).await.unwrap();

        let mut repetido = payload();
        repetido.id = Some("CT-77".to_string());
        repetido.pedido = Some(77);
        svc.criar(repetido).await.unwrap();

        let todos = svc.listar(&Filtro::default()).await.unwrap();
        assert_eq!(todos.len(), 1);
    }

    #[tokio::test]
    async fn comissoes_explicitas_sao_respeitadas() {
        let svc = PedidoService::new(Arc::new(MemStorage::default()), 5.0);
        let mut p = payload();
        p.pct_comissao_vendedor = Some("7,5".to_string());
        p.valor_comissao_vendedor = Some("75,00".to_string());
        let registro = svc.criar(p).await.unwrap();
        assert_eq!(
            registro.get("% Comissão Vendedor").map(String::as_str),
            Some("7,50")
        );
        assert_eq!(
            registro.get("Valor Comissão Vendedor").map(String::as_str),
            Some("75,00")
        );
    }
}
