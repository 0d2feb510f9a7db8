// src/db/graph.rs
//
// Variante de Storage sobre uma pasta de trabalho remota acessada pela API
// Microsoft Graph. Autenticação por device-code com refresh token persistido;
// o item do drive é resolvido por caminho uma única vez e a sessão de edição
// tem TTL de 300 s. Todo esse estado vive dentro do backend, atrás de um
// Mutex — nada de globais de módulo.
//
// Falhas de autenticação/conectividade viram `BackendIndisponivel`; não
// existe fallback silencioso para outro destino de armazenamento.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use crate::common::error::AppError;
use crate::db::mapeamento::{self, Mapeamento, Registro};
use crate::db::{filtrar_por_data, Filtro, Storage};
use crate::domain::documentos::apenas_digitos;
use crate::models::usuario::{Usuario, UsuarioIn, UsuarioPublico};

const GRAPH: &str = "https://graph.microsoft.com/v1.0";
const ESCOPO: &str = "https://graph.microsoft.com/Files.ReadWrite.All offline_access";
const SESSAO_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    /// Caminho relativo da planilha no drive (ex.: "Controle/Orcamentos.xlsx").
    pub caminho_planilha: String,
    pub tabela_orcamentos: String,
    pub tabela_cadastros: String,
    pub tabela_pedidos: String,
    pub cache_token: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheToken {
    refresh_token: Option<String>,
}

struct TokenAtivo {
    access_token: String,
    expira_em: Instant,
}

struct Sessao {
    id: String,
    criada_em: Instant,
}

#[derive(Default)]
struct Estado {
    token: Option<TokenAtivo>,
    item_id: Option<String>,
    sessao: Option<Sessao>,
}

impl Estado {
    fn invalidar(&mut self) {
        self.token = None;
        self.sessao = None;
    }
}

pub struct GraphStorage {
    http: reqwest::Client,
    config: GraphConfig,
    estado: Mutex<Estado>,
    // Serializa as alocações de sequência dentro do processo: a varredura de
    // linhas remotas não tem contador atômico do lado do servidor.
    guarda_sequencia: Mutex<()>,
}

#[derive(Debug, Deserialize)]
struct RespostaDeviceCode {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default)]
    message: String,
    expires_in: u64,
    interval: u64,
}

#[derive(Debug, Deserialize)]
struct RespostaToken {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

fn indisponivel(msg: impl Into<String>) -> AppError {
    AppError::BackendIndisponivel(msg.into())
}

/// Normaliza nomes de coluna/label para casar a planilha com o mapeamento:
/// minúsculas, sem acento, "/" e espaço viram "_".
fn normalizar(s: &str) -> String {
    let mut saida = String::with_capacity(s.len());
    for c in s.trim().to_lowercase().chars() {
        let c = match c {
            'ã' | 'á' | 'à' | 'â' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'õ' | 'ó' | 'ô' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            '/' | ' ' => '_',
            _ => c,
        };
        if c.is_ascii_alphanumeric() || c == '_' {
            saida.push(c);
        }
    }
    saida
}

impl GraphStorage {
    pub fn new(config: GraphConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(AppError::HttpError)?;
        Ok(Self {
            http,
            config,
            estado: Mutex::new(Estado::default()),
            guarda_sequencia: Mutex::new(()),
        })
    }

    fn url_token(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.config.tenant_id
        )
    }

    fn carregar_cache(&self) -> CacheToken {
        std::fs::read_to_string(&self.config.cache_token)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn gravar_cache(&self, cache: &CacheToken) {
        if let Ok(texto) = serde_json::to_string(cache) {
            if let Err(e) = std::fs::write(&self.config.cache_token, texto) {
                tracing::warn!("Falha ao gravar o cache de token: {}", e);
            }
        }
    }

    async fn trocar_refresh_token(&self, refresh_token: &str) -> Result<RespostaToken, AppError> {
        let resposta = self
            .http
            .post(self.url_token())
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("scope", ESCOPO),
            ])
            .send()
            .await?
            .json::<RespostaToken>()
            .await?;
        Ok(resposta)
    }

    /// Device Code Flow: primeira autorização, interativa. O código aparece no
    /// log para o operador conceder o acesso.
    async fn fluxo_device_code(&self) -> Result<RespostaToken, AppError> {
        let url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/devicecode",
            self.config.tenant_id
        );
        let flow = self
            .http
            .post(url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("scope", ESCOPO),
            ])
            .send()
            .await?
            .json::<RespostaDeviceCode>()
            .await
            .map_err(|e| indisponivel(format!("Falha ao iniciar o Device Code Flow: {}", e)))?;

        if flow.message.is_empty() {
            tracing::warn!(
                "=== Autorização necessária: acesse {} e informe o código {} ===",
                flow.verification_uri,
                flow.user_code
            );
        } else {
            tracing::warn!("=== Autorização necessária === {}", flow.message);
        }

        let limite = Instant::now() + Duration::from_secs(flow.expires_in);
        let intervalo = Duration::from_secs(flow.interval.max(1));
        loop {
            if Instant::now() >= limite {
                return Err(indisponivel("Device Code Flow expirou sem autorização"));
            }
            tokio::time::sleep(intervalo).await;
            let resposta = self
                .http
                .post(self.url_token())
                .form(&[
                    ("client_id", self.config.client_id.as_str()),
                    ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                    ("device_code", flow.device_code.as_str()),
                ])
                .send()
                .await?
                .json::<RespostaToken>()
                .await?;
            match resposta.error.as_deref() {
                Some("authorization_pending") | Some("slow_down") => continue,
                Some(erro) => {
                    return Err(indisponivel(format!(
                        "Erro ao obter token: {} ({})",
                        erro,
                        resposta.error_description.unwrap_or_default()
                    )));
                }
                None => return Ok(resposta),
            }
        }
    }

    async fn obter_token(&self, estado: &mut Estado) -> Result<String, AppError> {
        if let Some(t) = &estado.token {
            if Instant::now() < t.expira_em {
                return Ok(t.access_token.clone());
            }
        }

        let mut cache = self.carregar_cache();
        let resposta = match cache.refresh_token.as_deref() {
            Some(rt) => {
                let r = self.trocar_refresh_token(rt).await?;
                if r.access_token.is_some() {
                    r
                } else {
                    tracing::warn!("Refresh token recusado; reiniciando o Device Code Flow.");
                    self.fluxo_device_code().await?
                }
            }
            None => self.fluxo_device_code().await?,
        };

        let access = resposta
            .access_token
            .ok_or_else(|| indisponivel("Resposta de token sem access_token"))?;
        if let Some(rt) = resposta.refresh_token {
            cache.refresh_token = Some(rt);
            self.gravar_cache(&cache);
        }
        // Renova um minuto antes do vencimento nominal.
        let validade = resposta.expires_in.unwrap_or(3600).saturating_sub(60);
        estado.token = Some(TokenAtivo {
            access_token: access.clone(),
            expira_em: Instant::now() + Duration::from_secs(validade),
        });
        Ok(access)
    }

    async fn obter_item_id(&self, estado: &mut Estado, token: &str) -> Result<String, AppError> {
        if let Some(id) = &estado.item_id {
            return Ok(id.clone());
        }
        let url = format!("{}/me/drive/root:/{}", GRAPH, self.config.caminho_planilha);
        let r = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?;
        if !r.status().is_success() {
            let corpo = r.text().await.unwrap_or_default();
            return Err(indisponivel(format!(
                "Não achei a planilha no drive ({})",
                corpo
            )));
        }
        let corpo: serde_json::Value = r.json().await?;
        let id = corpo
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| indisponivel("ID do item da planilha não retornado"))?
            .to_string();
        estado.item_id = Some(id.clone());
        Ok(id)
    }

    async fn obter_sessao(
        &self,
        estado: &mut Estado,
        token: &str,
        item_id: &str,
    ) -> Result<String, AppError> {
        if let Some(s) = &estado.sessao {
            if s.criada_em.elapsed() < SESSAO_TTL {
                return Ok(s.id.clone());
            }
        }
        let url = format!("{}/me/drive/items/{}/workbook/createSession", GRAPH, item_id);
        let r = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "persistChanges": true }))
            .send()
            .await?;
        if !r.status().is_success() {
            let corpo = r.text().await.unwrap_or_default();
            return Err(indisponivel(format!("Erro ao criar sessão da planilha: {}", corpo)));
        }
        let corpo: serde_json::Value = r.json().await?;
        let id = corpo
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| indisponivel("Sessão da planilha não retornada"))?
            .to_string();
        estado.sessao = Some(Sessao { id: id.clone(), criada_em: Instant::now() });
        Ok(id)
    }

    /// Token + item + sessão, renovando o que venceu.
    async fn contexto(&self) -> Result<(String, String, String), AppError> {
        let mut estado = self.estado.lock().await;
        let token = self.obter_token(&mut estado).await?;
        let item_id = self.obter_item_id(&mut estado, &token).await?;
        let sessao = self.obter_sessao(&mut estado, &token, &item_id).await?;
        Ok((token, item_id, sessao))
    }

    async fn invalidar_estado(&self) {
        self.estado.lock().await.invalidar();
    }

    async fn get_json(
        &self,
        url: &str,
        token: &str,
        sessao: &str,
    ) -> Result<serde_json::Value, AppError> {
        let r = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("workbook-session-id", sessao)
            .send()
            .await?;
        if r.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token/sessão caducaram: invalida para o próximo chamador refazer.
            self.invalidar_estado().await;
            return Err(indisponivel("Autorização da planilha expirou"));
        }
        if !r.status().is_success() {
            let corpo = r.text().await.unwrap_or_default();
            return Err(indisponivel(format!("Erro na API da planilha: {}", corpo)));
        }
        Ok(r.json().await?)
    }

    async fn listar_colunas(&self, tabela: &str) -> Result<Vec<String>, AppError> {
        let (token, item_id, sessao) = self.contexto().await?;
        let url = format!(
            "{}/me/drive/items/{}/workbook/tables/{}/columns",
            GRAPH, item_id, tabela
        );
        let corpo = self.get_json(&url, &token, &sessao).await?;
        let colunas = corpo
            .get("value")
            .and_then(|v| v.as_array())
            .map(|cols| {
                cols.iter()
                    .map(|c| {
                        c.get("name")
                            .and_then(|n| n.as_str())
                            .unwrap_or_default()
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(colunas)
    }

    async fn listar_linhas(&self, tabela: &str) -> Result<Vec<Vec<String>>, AppError> {
        let (token, item_id, sessao) = self.contexto().await?;
        let url = format!(
            "{}/me/drive/items/{}/workbook/tables/{}/rows",
            GRAPH, item_id, tabela
        );
        let corpo = self.get_json(&url, &token, &sessao).await?;
        let mut linhas = Vec::new();
        if let Some(valores) = corpo.get("value").and_then(|v| v.as_array()) {
            for linha in valores {
                // Cada row tem "values": [[col1, col2, ...]]
                let Some(celulas) = linha
                    .get("values")
                    .and_then(|v| v.as_array())
                    .and_then(|v| v.first())
                    .and_then(|v| v.as_array())
                else {
                    continue;
                };
                linhas.push(
                    celulas
                        .iter()
                        .map(|c| match c {
                            serde_json::Value::String(s) => s.clone(),
                            serde_json::Value::Null => String::new(),
                            outro => outro.to_string(),
                        })
                        .collect(),
                );
            }
        }
        Ok(linhas)
    }

    async fn adicionar_linha(&self, tabela: &str, valores: Vec<String>) -> Result<(), AppError> {
        let (token, item_id, sessao) = self.contexto().await?;
        let url = format!(
            "{}/me/drive/items/{}/workbook/tables/{}/rows/add",
            GRAPH, item_id, tabela
        );
        let r = self
            .http
            .post(url)
            .bearer_auth(&token)
            .header("workbook-session-id", &sessao)
            .json(&json!({ "values": [valores] }))
            .send()
            .await?;
        if r.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.invalidar_estado().await;
            return Err(indisponivel("Autorização da planilha expirou"));
        }
        if !r.status().is_success() {
            let corpo = r.text().await.unwrap_or_default();
            return Err(indisponivel(format!("Erro ao inserir linha: {}", corpo)));
        }
        Ok(())
    }

    /// Lê a tabela inteira já traduzida para registros de labels, casando as
    /// colunas remotas com o mapeamento por nome normalizado.
    async fn registros_da_tabela(
        &self,
        tabela: &str,
        mapa: &Mapeamento,
    ) -> Result<Vec<Registro>, AppError> {
        let colunas = self.listar_colunas(tabela).await?;
        let linhas = self.listar_linhas(tabela).await?;

        // coluna remota (normalizada) -> coluna do schema
        let mut indice_para_coluna: Vec<Option<&'static str>> = Vec::new();
        for nome in &colunas {
            let alvo = normalizar(nome);
            let achado = mapa
                .pares()
                .iter()
                .find(|(label, col)| normalizar(label) == alvo || *col == alvo)
                .map(|(_, col)| *col);
            indice_para_coluna.push(achado);
        }

        let mut registros = Vec::with_capacity(linhas.len());
        for linha in linhas {
            let mut por_coluna: HashMap<String, String> = HashMap::new();
            for (i, valor) in linha.into_iter().enumerate() {
                if let Some(Some(col)) = indice_para_coluna.get(i) {
                    por_coluna.insert((*col).to_string(), valor);
                }
            }
            registros.push(mapa.para_labels(&por_coluna));
        }
        Ok(registros)
    }

    /// Alinha um registro de labels à ordem das colunas remotas.
    async fn gravar_registro(
        &self,
        tabela: &str,
        mapa: &Mapeamento,
        registro: &Registro,
    ) -> Result<(), AppError> {
        let colunas = self.listar_colunas(tabela).await?;
        let por_coluna = mapa.para_colunas(registro);
        let valores = colunas
            .iter()
            .map(|nome| {
                let alvo = normalizar(nome);
                mapa.pares()
                    .iter()
                    .find(|(label, col)| normalizar(label) == alvo || *col == alvo)
                    .and_then(|(_, col)| por_coluna.get(col))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();
        self.adicionar_linha(tabela, valores).await
    }

    fn aplicar_filtro(linhas: Vec<Registro>, filtro: &Filtro, campo_data: &str) -> Vec<Registro> {
        let mut saida = linhas;
        if let Some(v) = filtro.vendedor.as_deref().filter(|v| !v.is_empty()) {
            let alvo = v.to_lowercase();
            saida.retain(|r| {
                r.get("Vendedor")
                    .map(|x| x.to_lowercase().contains(&alvo))
                    .unwrap_or(false)
            });
        }
        if let Some(d) = filtro.documento_digitos.as_deref().filter(|d| !d.is_empty()) {
            let alvo = apenas_digitos(d);
            saida.retain(|r| {
                r.get("CNPJ/CPF")
                    .map(|x| apenas_digitos(x) == alvo)
                    .unwrap_or(false)
            });
        }
        filtrar_por_data(saida, campo_data, filtro.inicio.as_deref(), filtro.fim.as_deref())
    }

    /// Linha com o "Atualizado em" mais recente, comparado como data e não
    /// como texto ("02/08" viria antes de "31/07" na ordem lexicográfica).
    /// Empate fica com a linha anexada por último; linha sem carimbo
    /// parseável só vale quando não há nenhuma com data.
    fn mais_recente(candidatas: Vec<Registro>) -> Option<Registro> {
        let mut melhor: Option<(chrono::NaiveDateTime, Registro)> = None;
        let mut sem_data: Option<Registro> = None;
        for r in candidatas {
            let carimbo = r.get("Atualizado em").and_then(|t| {
                chrono::NaiveDateTime::parse_from_str(t, "%d/%m/%Y %H:%M:%S").ok()
            });
            match carimbo {
                Some(dt) if melhor.as_ref().map(|(m, _)| dt >= *m).unwrap_or(true) => {
                    melhor = Some((dt, r));
                }
                Some(_) => {}
                None => sem_data = Some(r),
            }
        }
        melhor.map(|(_, r)| r).or(sem_data)
    }
}

#[async_trait]
impl Storage for GraphStorage {
    async fn preparar_esquema(&self) -> Result<(), AppError> {
        // A estrutura remota já existe; valida o acesso e aquece o cache de
        // item/sessão para falhar cedo com uma mensagem útil.
        let _ = self.contexto().await?;
        tracing::info!("✅ Planilha remota acessível; sessão de edição criada.");
        Ok(())
    }

    async fn salvar_orcamento(&self, registro: &Registro) -> Result<(), AppError> {
        self.gravar_registro(&self.config.tabela_orcamentos, &mapeamento::ORCAMENTOS, registro)
            .await
    }

    async fn orcamento_por_id(&self, id: &str) -> Result<Option<Registro>, AppError> {
        let linhas = self
            .registros_da_tabela(&self.config.tabela_orcamentos, &mapeamento::ORCAMENTOS)
            .await?;
        Ok(linhas
            .into_iter()
            .find(|r| r.get("ID Orçamento").map(String::as_str) == Some(id)))
    }

    async fn listar_orcamentos(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        let linhas = self
            .registros_da_tabela(&self.config.tabela_orcamentos, &mapeamento::ORCAMENTOS)
            .await?;
        Ok(Self::aplicar_filtro(linhas, filtro, "Data/Hora"))
    }

    async fn salvar_cadastro(&self, registro: &Registro) -> Result<(), AppError> {
        // Na planilha o "upsert" é um append; a leitura prefere a linha mais
        // recente pelo carimbo "Atualizado em".
        let mut registro = registro.clone();
        let agora = chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string();
        let criado = registro.entry("Criado em".to_string()).or_default();
        if criado.trim().is_empty() {
            *criado = agora.clone();
        }
        registro.insert("Atualizado em".to_string(), agora);
        if let Some(doc) = registro.get_mut("CNPJ/CPF") {
            *doc = apenas_digitos(doc);
        }
        self.gravar_registro(&self.config.tabela_cadastros, &mapeamento::CADASTROS, &registro)
            .await
    }

    async fn cadastro_por_documento(&self, digitos: &str) -> Result<Option<Registro>, AppError> {
        let alvo = apenas_digitos(digitos);
        let linhas = self
            .registros_da_tabela(&self.config.tabela_cadastros, &mapeamento::CADASTROS)
            .await?;
        let candidatas: Vec<Registro> = linhas
            .into_iter()
            .filter(|r| r.get("CNPJ/CPF").map(|d| apenas_digitos(d) == alvo).unwrap_or(false))
            .collect();
        Ok(Self::mais_recente(candidatas))
    }

    async fn listar_cadastros(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        let linhas = self
            .registros_da_tabela(&self.config.tabela_cadastros, &mapeamento::CADASTROS)
            .await?;
        Ok(Self::aplicar_filtro(linhas, filtro, "Atualizado em"))
    }

    async fn salvar_pedido(&self, registro: &Registro) -> Result<(), AppError> {
        // Insert idempotente: se o id já existe na tabela, não duplica.
        if let Some(id) = registro.get("ID").filter(|i| !i.is_empty()) {
            let existentes = self
                .registros_da_tabela(&self.config.tabela_pedidos, &mapeamento::PEDIDOS)
                .await?;
            if existentes
                .iter()
                .any(|r| r.get("ID").map(String::as_str) == Some(id.as_str()))
            {
                return Ok(());
            }
        }
        let mut registro = registro.clone();
        if let Some(doc) = registro.get_mut("CNPJ/CPF") {
            *doc = apenas_digitos(doc);
        }
        self.gravar_registro(&self.config.tabela_pedidos, &mapeamento::PEDIDOS, &registro)
            .await
    }

    async fn listar_pedidos(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        let linhas = self
            .registros_da_tabela(&self.config.tabela_pedidos, &mapeamento::PEDIDOS)
            .await?;
        Ok(Self::aplicar_filtro(
            linhas,
            filtro,
            "Data/Hora da criação do pedido",
        ))
    }

    async fn ultimo_pedido_data(&self, digitos: &str) -> Result<Option<String>, AppError> {
        let alvo = apenas_digitos(digitos);
        let linhas = self
            .registros_da_tabela(&self.config.tabela_pedidos, &mapeamento::PEDIDOS)
            .await?;
        let mut melhor: Option<(chrono::NaiveDateTime, String)> = None;
        for r in linhas {
            if r.get("CNPJ/CPF").map(|d| apenas_digitos(d) == alvo) != Some(true) {
                continue;
            }
            let Some(texto) = r
                .get("Data/Hora da criação do pedido")
                .filter(|t| !t.is_empty())
            else {
                continue;
            };
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(texto, "%d/%m/%Y %H:%M:%S") {
                if melhor.as_ref().map(|(m, _)| dt > *m).unwrap_or(true) {
                    melhor = Some((dt, texto.clone()));
                }
            }
        }
        Ok(melhor.map(|(_, t)| t))
    }

    async fn proximo_numero_pedido(&self) -> Result<i64, AppError> {
        // Varredura serializada pelo mutex do backend. A sessão do workbook
        // garante read-after-write; entre processos distintos a alocação
        // continua sem garantia de unicidade (limitação da API remota).
        let _guarda = self.guarda_sequencia.lock().await;
        let linhas = self
            .registros_da_tabela(&self.config.tabela_pedidos, &mapeamento::PEDIDOS)
            .await?;
        let maior = linhas
            .iter()
            .filter_map(|r| r.get("Pedido"))
            .filter_map(|v| v.trim().parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Ok(maior + 1)
    }

    async fn proximo_sequencial_orcamento(&self, sigla: &str) -> Result<i64, AppError> {
        let _guarda = self.guarda_sequencia.lock().await;
        let prefixo = format!("OR-{}", sigla);
        let linhas = self
            .registros_da_tabela(&self.config.tabela_orcamentos, &mapeamento::ORCAMENTOS)
            .await?;
        let quantos = linhas
            .iter()
            .filter_map(|r| r.get("ID Orçamento"))
            .filter(|id| id.starts_with(&prefixo))
            .count() as i64;
        Ok(quantos + 1)
    }

    async fn upsert_usuario(
        &self,
        _u: &UsuarioIn,
        _senha_hash: Option<String>,
    ) -> Result<(), AppError> {
        Err(AppError::OperacaoNaoSuportada("gestão de usuários na planilha remota"))
    }

    async fn listar_usuarios(&self) -> Result<Vec<UsuarioPublico>, AppError> {
        Err(AppError::OperacaoNaoSuportada("gestão de usuários na planilha remota"))
    }

    async fn usuario_por_nome(&self, _usuario: &str) -> Result<Option<Usuario>, AppError> {
        Err(AppError::OperacaoNaoSuportada("gestão de usuários na planilha remota"))
    }

    async fn definir_senha(&self, _usuario: &str, _senha_hash: &str) -> Result<(), AppError> {
        Err(AppError::OperacaoNaoSuportada("gestão de usuários na planilha remota"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizacao_de_cabecalhos() {
        assert_eq!(normalizar("ID Orçamento"), "id_orcamento");
        assert_eq!(normalizar("CNPJ/CPF"), "cnpj_cpf");
        assert_eq!(normalizar("Preço por metro"), "preco_por_metro");
        assert_eq!(normalizar("  E-mail "), "email");
    }

    fn cadastro(atualizado_em: &str, vendedor: &str) -> Registro {
        Registro::from([
            ("Atualizado em".to_string(), atualizado_em.to_string()),
            ("Vendedor".to_string(), vendedor.to_string()),
        ])
    }

    #[test]
    fn linha_mais_recente_compara_data_e_nao_texto() {
        // Virada de mês: "02/08" vem antes de "31/07" na ordem lexicográfica,
        // mas é a atualização mais nova.
        let linhas = vec![
            cadastro("31/07/2025 10:00:00", "antiga"),
            cadastro("02/08/2025 09:00:00", "nova"),
        ];
        let escolhida = GraphStorage::mais_recente(linhas).unwrap();
        assert_eq!(escolhida.get("Vendedor").map(String::as_str), Some("nova"));
    }

    #[test]
    fn linha_sem_carimbo_so_vale_na_falta_de_datas() {
        let linhas = vec![
            cadastro("", "sem_data"),
            cadastro("15/03/2025 12:00:00", "com_data"),
        ];
        let escolhida = GraphStorage::mais_recente(linhas).unwrap();
        assert_eq!(escolhida.get("Vendedor").map(String::as_str), Some("com_data"));

        let so_sem_data = vec![cadastro("", "unica")];
        let escolhida = GraphStorage::mais_recente(so_sem_data).unwrap();
        assert_eq!(escolhida.get("Vendedor").map(String::as_str), Some("unica"));
        assert!(GraphStorage::mais_recente(Vec::new()).is_none());
    }
}
