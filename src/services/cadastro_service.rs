// src/services/cadastro_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{mapeamento, Filtro, Registro, Storage},
    domain::documentos,
    models::cadastro::CadastroIn,
};

#[derive(Clone)]
pub struct CadastroService {
    storage: Arc<dyn Storage>,
}

impl CadastroService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Upsert do cadastro. A chave é sempre o documento em dígitos; o tipo
    /// (CNPJ/CPF) é inferido do tamanho quando o formulário não informa.
    pub async fn salvar(&self, payload: CadastroIn) -> Result<(), AppError> {
        payload.validate()?;

        let digitos = documentos::apenas_digitos(&payload.cnpj_cpf);
        if digitos.len() != 11 && digitos.len() != 14 {
            return Err(AppError::Validacao(
                "O documento precisa ter 11 (CPF) ou 14 (CNPJ) dígitos.".to_string(),
            ));
        }
        let tipo_doc = if digitos.len() == 14 { "CNPJ" } else { "CPF" };

        let mut colunas: HashMap<String, String> = HashMap::new();
        colunas.insert("cnpj_cpf".to_string(), digitos.clone());
        for (col, valor) in payload.campos_presentes() {
            colunas.insert(col.to_string(), valor);
        }
        colunas
            .entry("documento".to_string())
            .and_modify(|d| {
                if d.trim().is_empty() {
                    *d = tipo_doc.to_string();
                }
            })
            .or_insert_with(|| tipo_doc.to_string());

        let registro = mapeamento::CADASTROS.para_labels(&colunas);
        self.storage.salvar_cadastro(&registro).await?;
        tracing::info!("✅ Cadastro {} salvo", digitos);
        Ok(())
    }

    pub async fn buscar_por_documento(&self, documento: &str) -> Result<Registro, AppError> {
        let digitos = documentos::apenas_digitos(documento);
        self.storage
            .cadastro_por_documento(&digitos)
            .await?
            .ok_or_else(|| {
                AppError::NaoEncontrado(format!("Cadastro '{}' não encontrado.", digitos))
            })
    }

    pub async fn listar(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        self.storage.listar_cadastros(filtro).await
    }

    /// Um cliente ganha desconto automático enquanto o último pedido dele for
    /// mais recente que a janela de desconto do cadastro (duração em meses ou
    /// anos, contada em dias corridos de 30/365).
    pub async fn desconto_automatico(&self, documento: &str) -> Result<bool, AppError> {
        let digitos = documentos::apenas_digitos(documento);
        let Some(cadastro) = self.storage.cadastro_por_documento(&digitos).await? else {
            return Ok(false);
        };

        let duracao = cadastro
            .get("Desconto Duração")
            .and_then(|d| d.trim().parse::<i64>().ok())
            .unwrap_or(0);
        if duracao <= 0 {
            return Ok(false);
        }
        let unidade = cadastro
            .get("Desconto Unidade")
            .map(|u| u.trim().to_lowercase())
            .unwrap_or_default();
        let janela_dias = if unidade.starts_with("ano") {
            duracao * 365
        } else {
            duracao * 30
        };

        let Some(ultimo) = self.storage.ultimo_pedido_data(&digitos).await? else {
            return Ok(false);
        };
        let Ok(ultimo) = chrono::NaiveDateTime::parse_from_str(&ultimo, "%d/%m/%Y %H:%M:%S") else {
            return Ok(false);
        };
        let idade = chrono::Local::now().naive_local() - ultimo;
        Ok(idade.num_days() <= janela_dias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memoria::MemStorage;

    fn payload(doc: &str) -> CadastroIn {
        CadastroIn {
            documento: None,
            cnpj_cpf: doc.to_string(),
            razao_social_nome: Some("Aurora Ltda".to_string()),
            nome_fantasia: None,
            contato: None,
            email_cnpj: None,
            email_manual: None,
            cep: Some("20000-000".to_string()),
            endereco: None,
            numero: None,
            complemento: None,
            bairro: None,
            municipio: None,
            uf: None,
            entrega_cep: None,
            entrega_endereco: None,
            entrega_numero: None,
            entrega_complemento: None,
            entrega_bairro: None,
            entrega_municipio: None,
            entrega_uf: None,
            desconto_duracao: Some("6".to_string()),
            desconto_unidade: Some("meses".to_string()),
            telefone1: None,
            telefone2: None,
            vendedor: None,
        }
    }

    #[tokio::test]
    async fn salvar_normaliza_a_chave_e_infere_o_tipo() {
        let mem = Arc::new(MemStorage::default());
        let svc = CadastroService::new(mem.clone());
        svc.salvar(payload("11.222.333/0001-81")).await.unwrap();

        let salvo = svc.buscar_por_documento("11222333000181").await.unwrap();
        assert_eq!(salvo.get("CNPJ/CPF").map(String::as_str), Some("11222333000181"));
        assert_eq!(salvo.get("Documento").map(String::as_str), Some("CNPJ"));
        assert_eq!(salvo.get("Razão Social/Nome").map(String::as_str), Some("Aurora Ltda"));
    }

    #[tokio::test]
    async fn documento_com_tamanho_errado_e_rejeitado() {
        let svc = CadastroService::new(Arc::new(MemStorage::default()));
        assert!(matches!(
            svc.salvar(payload("12345")).await,
            Err(AppError::Validacao(_))
        ));
    }

    #[tokio::test]
    async fn desconto_automatico_depende_do_ultimo_pedido() {
        let mem = Arc::new(MemStorage::default());
        let svc = CadastroService::new(mem.clone());
        svc.salvar(payload("11222333000181")).await.unwrap();

        // Sem pedido nenhum, não há desconto.
        assert!(!svc.desconto_automatico("11222333000181").await.unwrap());

        // Pedido de agora: dentro da janela de 6 meses.
        let mut pedido = Registro::new();
        pedido.insert("ID".to_string(), "CT-1".to_string());
        pedido.insert("CNPJ/CPF".to_string(), "11222333000181".to_string());
        pedido.insert(
            "Data/Hora da criação do pedido".to_string(),
            chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string(),
        );
        mem.salvar_pedido(&pedido).await.unwrap();
        assert!(svc.desconto_automatico("11222333000181").await.unwrap());
    }

    #[tokio::test]
    async fn pedido_antigo_fora_da_janela() {
        let mem = Arc::new(MemStorage::default());
        let svc = CadastroService::new(mem.clone());
        let mut p = payload("11222333000181");
        p.desconto_duracao = Some("1".to_string());
        p.desconto_unidade = Some("meses".to_string());
        svc.salvar(p).await.unwrap();

        let mut pedido = Registro::new();
        pedido.insert("ID".to_string(), "CT-1".to_string());
        pedido.insert("CNPJ/CPF".to_string(), "11222333000181".to_string());
        pedido.insert(
            "Data/Hora da criação do pedido".to_string(),
            "01/01/2020 10:00:00".to_string(),
        );
        mem.salvar_pedido(&pedido).await.unwrap();
        assert!(!svc.desconto_automatico("11222333000181").await.unwrap());
    }

    #[tokio::test]
    async fn cadastro_inexistente_e_404() {
        let svc = CadastroService::new(Arc::new(MemStorage::default()));
        assert!(matches!(
            svc.buscar_por_documento("00000000000").await,
            Err(AppError::NaoEncontrado(_))
        ));
    }
}
