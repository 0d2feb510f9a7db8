// src/services/memoria.rs
//
// Backend de armazenamento em memória usado apenas nos testes dos serviços.
// Implementa o mesmo contrato dos backends reais, com a mesma semântica de
// upsert de cada tabela.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::error::AppError;
use crate::db::{filtrar_por_data, Filtro, Registro, Storage};
use crate::domain::documentos::apenas_digitos;
use crate::models::usuario::{Usuario, UsuarioIn, UsuarioPublico};

#[derive(Default)]
pub struct MemStorage {
    pub orcamentos: Mutex<Vec<Registro>>,
    pub cadastros: Mutex<Vec<Registro>>,
    pub pedidos: Mutex<Vec<Registro>>,
    pub usuarios: Mutex<Vec<Usuario>>,
    pub sequencias: Mutex<HashMap<String, i64>>,
}

impl MemStorage {
    async fn incrementar(&self, nome: &str) -> i64 {
        let mut seqs = self.sequencias.lock().await;
        let valor = seqs.entry(nome.to_string()).or_insert(0);
        *valor += 1;
        *valor
    }
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

#[async_trait]
impl Storage for MemStorage {
    async fn preparar_esquema(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn salvar_orcamento(&self, registro: &Registro) -> Result<(), AppError> {
        let mut linhas = self.orcamentos.lock().await;
        let id = registro.get("ID Orçamento").cloned().unwrap_or_default();
        if let Some(existente) = linhas
            .iter_mut()
            .find(|r| r.get("ID Orçamento") == Some(&id))
        {
            if let Some(dh) = registro.get("Data/Hora") {
                existente.insert("Data/Hora".to_string(), dh.clone());
            }
        } else {
            linhas.push(registro.clone());
        }
        Ok(())
    }

    async fn orcamento_por_id(&self, id: &str) -> Result<Option<Registro>, AppError> {
        let linhas = self.orcamentos.lock().await;
        Ok(linhas
            .iter()
            .find(|r| r.get("ID Orçamento").map(String::as_str) == Some(id))
            .cloned())
    }

    async fn listar_orcamentos(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        let linhas = self.orcamentos.lock().await.clone();
        Ok(aplicar_filtro(linhas, filtro, "Data/Hora"))
    }

    async fn salvar_cadastro(&self, registro: &Registro) -> Result<(), AppError> {
        let mut linhas = self.cadastros.lock().await;
        let digitos = apenas_digitos(registro.get("CNPJ/CPF").map(String::as_str).unwrap_or(""));
        if let Some(existente) = linhas
            .iter_mut()
            .find(|r| r.get("CNPJ/CPF").map(|d| apenas_digitos(d)) == Some(digitos.clone()))
        {
            let criado = existente.get("Criado em").cloned();
            *existente = registro.clone();
            if let Some(criado) = criado {
                existente.insert("Criado em".to_string(), criado);
            }
        } else {
            linhas.push(registro.clone());
        }
        Ok(())
    }

    async fn cadastro_por_documento(&self, digitos: &str) -> Result<Option<Registro>, AppError> {
        let alvo = apenas_digitos(digitos);
        let linhas = self.cadastros.lock().await;
        Ok(linhas
            .iter()
            .find(|r| r.get("CNPJ/CPF").map(|d| apenas_digitos(d) == alvo).unwrap_or(false))
            .cloned())
    }

    async fn listar_cadastros(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        let linhas = self.cadastros.lock().await.clone();
        Ok(aplicar_filtro(linhas, filtro, "Atualizado em"))
    }

    async fn salvar_pedido(&self, registro: &Registro) -> Result<(), AppError> {
        let mut linhas = self.pedidos.lock().await;
        let id = registro.get("ID").cloned().unwrap_or_default();
        if !id.is_empty() && linhas.iter().any(|r| r.get("ID") == Some(&id)) {
            return Ok(());
        }
        linhas.push(registro.clone());
        Ok(())
    }

    async fn listar_pedidos(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        let linhas = self.pedidos.lock().await.clone();
        Ok(aplicar_filtro(linhas, filtro, "Data/Hora da criação do pedido"))
    }

    async fn ultimo_pedido_data(&self, digitos: &str) -> Result<Option<String>, AppError> {
        let alvo = apenas_digitos(digitos);
        let linhas = self.pedidos.lock().await;
        let mut melhor: Option<(chrono::NaiveDateTime, String)> = None;
        for r in linhas.iter() {
            if r.get("CNPJ/CPF").map(|d| apenas_digitos(d) == alvo) != Some(true) {
                continue;
            }
            let Some(texto) = r.get("Data/Hora da criação do pedido") else {
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
        Ok(self.incrementar("pedido").await)
    }

    async fn proximo_sequencial_orcamento(&self, sigla: &str) -> Result<i64, AppError> {
        Ok(self.incrementar(&format!("orcamento_{}", sigla.to_lowercase())).await)
    }

    async fn upsert_usuario(
        &self,
        u: &UsuarioIn,
        senha_hash: Option<String>,
    ) -> Result<(), AppError> {
        let mut usuarios = self.usuarios.lock().await;
        let novo = Usuario {
            usuario: u.usuario.clone(),
            nome: Some(u.nome.clone()),
            email: Some(u.email.clone()),
            setor: Some(u.setor.clone()),
            cargo: Some(u.cargo.clone()),
            senha_hash: senha_hash.clone(),
            is_admin: u.is_admin,
            permissoes: u.permissoes.clone(),
        };
        if let Some(existente) = usuarios.iter_mut().find(|x| x.usuario == u.usuario) {
            let hash_antigo = existente.senha_hash.clone();
            *existente = novo;
            if senha_hash.is_none() {
                existente.senha_hash = hash_antigo;
            }
        } else {
            usuarios.push(novo);
        }
        Ok(())
    }

    async fn listar_usuarios(&self) -> Result<Vec<UsuarioPublico>, AppError> {
        let usuarios = self.usuarios.lock().await;
        Ok(usuarios
            .iter()
            .map(|u| UsuarioPublico {
                usuario: u.usuario.clone(),
                nome: u.nome.clone(),
                email: u.email.clone(),
                setor: u.setor.clone(),
                cargo: u.cargo.clone(),
                is_admin: u.is_admin,
                permissoes: u.permissoes.clone().unwrap_or_default(),
            })
            .collect())
    }

    async fn usuario_por_nome(&self, usuario: &str) -> Result<Option<Usuario>, AppError> {
        let usuarios = self.usuarios.lock().await;
        Ok(usuarios.iter().find(|u| u.usuario == usuario).cloned())
    }

    async fn definir_senha(&self, usuario: &str, senha_hash: &str) -> Result<(), AppError> {
        let mut usuarios = self.usuarios.lock().await;
        match usuarios.iter_mut().find(|u| u.usuario == usuario) {
            Some(u) => {
                u.senha_hash = Some(senha_hash.to_string());
                Ok(())
            }
            None => Err(AppError::NaoEncontrado(format!(
                "Usuário '{}' não encontrado.",
                usuario
            ))),
        }
    }
}
