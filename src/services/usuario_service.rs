// src/services/usuario_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    config::AdminSeed,
    db::Storage,
    models::usuario::{LoginIn, LoginOut, TrocaSenhaIn, UsuarioIn, UsuarioPublico},
};

#[derive(Clone)]
pub struct UsuarioService {
    storage: Arc<dyn Storage>,
}

impl UsuarioService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Conferência simples de credenciais; a resposta é o perfil público.
    /// Usuário inexistente e senha errada respondem a mesma coisa.
    pub async fn login(&self, payload: LoginIn) -> Result<LoginOut, AppError> {
        payload.validate()?;
        let usuario = self
            .storage
            .usuario_por_nome(payload.usuario.trim())
            .await?
            .ok_or(AppError::CredenciaisInvalidas)?;
        let hash = usuario
            .senha_hash
            .as_deref()
            .ok_or(AppError::CredenciaisInvalidas)?;
        if !bcrypt::verify(&payload.senha, hash)? {
            return Err(AppError::CredenciaisInvalidas);
        }
        tracing::info!("✅ Login de {}", usuario.usuario);
        Ok(LoginOut {
            usuario: usuario.usuario,
            nome: usuario.nome,
            email: usuario.email,
            is_admin: usuario.is_admin,
            permissoes: usuario.permissoes.unwrap_or_default(),
        })
    }

    /// Cria ou atualiza um usuário. A senha só é (re)definida quando vem no
    /// payload; o banco nunca vê a senha em claro.
    pub async fn upsert(&self, payload: UsuarioIn) -> Result<(), AppError> {
        payload.validate()?;
        let hash = match payload.senha.as_deref().filter(|s| !s.is_empty()) {
            Some(senha) => Some(bcrypt::hash(senha, bcrypt::DEFAULT_COST)?),
            None => None,
        };
        self.storage.upsert_usuario(&payload, hash).await
    }

    pub async fn trocar_senha(&self, payload: TrocaSenhaIn) -> Result<(), AppError> {
        payload.validate()?;
        if !payload.force {
            let atual = payload
                .senha_atual
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::Validacao("A senha atual é obrigatória.".to_string())
                })?;
            let usuario = self
                .storage
                .usuario_por_nome(payload.usuario.trim())
                .await?
                .ok_or(AppError::CredenciaisInvalidas)?;
            let hash = usuario
                .senha_hash
                .as_deref()
                .ok_or(AppError::CredenciaisInvalidas)?;
            if !bcrypt::verify(atual, hash)? {
                return Err(AppError::CredenciaisInvalidas);
            }
        }
        let novo_hash = bcrypt::hash(&payload.senha_nova, bcrypt::DEFAULT_COST)?;
        self.storage
            .definir_senha(payload.usuario.trim(), &novo_hash)
            .await
    }

    pub async fn listar(&self) -> Result<Vec<UsuarioPublico>, AppError> {
        self.storage.listar_usuarios().await
    }

    /// Semeia o usuário administrador no boot, quando configurado e ainda
    /// inexistente. No backend de planilha (sem tabela de usuários) o aviso
    /// vai para o log e o boot segue.
    pub async fn garantir_admin(&self, seed: Option<&AdminSeed>) -> Result<(), AppError> {
        let Some(seed) = seed else {
            return Ok(());
        };
        match self.storage.usuario_por_nome(&seed.usuario).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                let hash = bcrypt::hash(&seed.senha, bcrypt::DEFAULT_COST)?;
                let admin = UsuarioIn {
                    usuario: seed.usuario.clone(),
                    nome: seed.nome.clone(),
                    email: seed.email.clone(),
                    setor: seed.setor.clone(),
                    cargo: seed.cargo.clone(),
                    senha: None,
                    is_admin: true,
                    permissoes: Some("*".to_string()),
                };
                self.storage.upsert_usuario(&admin, Some(hash)).await?;
                tracing::info!("✅ Usuário administrador '{}' criado", seed.usuario);
                Ok(())
            }
            Err(AppError::OperacaoNaoSuportada(op)) => {
                tracing::warn!("Sem gestão de usuários neste backend ({}); seed ignorado.", op);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memoria::MemStorage;

    fn novo_usuario(nome: &str, senha: &str) -> UsuarioIn {
        UsuarioIn {
            usuario: nome.to_string(),
            nome: "Fulano".to_string(),
            email: "fulano@example.com".to_string(),
            setor: "Comercial".to_string(),
            cargo: "Vendedor".to_string(),
            senha: Some(senha.to_string()),
            is_admin: false,
            permissoes: Some("orcamentos,pedidos".to_string()),
        }
    }

    #[tokio::test]
    async fn login_com_senha_correta() {
        let svc = UsuarioService::new(Arc::new(MemStorage::default()));
        svc.upsert(novo_usuario("maria", "segredo")).await.unwrap();

        let perfil = svc
            .login(LoginIn { usuario: "maria".to_string(), senha: "segredo".to_string() })
            .await
            .unwrap();
        assert_eq!(perfil.usuario, "maria");
        assert_eq!(perfil.permissoes, "orcamentos,pedidos");
    }

    #[tokio::test]
    async fn senha_errada_e_usuario_inexistente_respondem_igual() {
        let svc = UsuarioService::new(Arc::new(MemStorage::default()));
        svc.upsert(novo_usuario("maria", "segredo")).await.unwrap();

        let errada = svc
            .login(LoginIn { usuario: "maria".to_string(), senha: "outra".to_string() })
            .await;
        let inexistente = svc
            .login(LoginIn { usuario: "jose".to_string(), senha: "x".to_string() })
            .await;
        assert!(matches!(errada, Err(AppError::CredenciaisInvalidas)));
        assert!(matches!(inexistente, Err(AppError::CredenciaisInvalidas)));
    }

    #[tokio::test]
    async fn upsert_sem_senha_preserva_o_hash() {
        let svc = UsuarioService::new(Arc::new(MemStorage::default()));
        svc.upsert(novo_usuario("maria", "segredo")).await.unwrap();

        let mut sem_senha = novo_usuario("maria", "");
        sem_senha.senha = None;
        sem_senha.cargo = "Gerente".to_string();
        svc.upsert(sem_senha).await.unwrap();

        // A senha antiga continua valendo.
        assert!(svc
            .login(LoginIn { usuario: "maria".to_string(), senha: "segredo".to_string() })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn troca_de_senha_exige_a_atual_salvo_force() {
        let svc = UsuarioService::new(Arc::new(MemStorage::default()));
        svc.upsert(novo_usuario("maria", "segredo")).await.unwrap();

        let sem_atual = svc
            .trocar_senha(TrocaSenhaIn {
                usuario: "maria".to_string(),
                senha_atual: None,
                senha_nova: "nova".to_string(),
                force: false,
            })
            .await;
        assert!(matches!(sem_atual, Err(AppError::Validacao(_))));

        svc.trocar_senha(TrocaSenhaIn {
            usuario: "maria".to_string(),
            senha_atual: None,
            senha_nova: "nova".to_string(),
            force: true,
        })
        .await
        .unwrap();
        assert!(svc
            .login(LoginIn { usuario: "maria".to_string(), senha: "nova".to_string() })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn garantir_admin_e_idempotente() {
        let svc = UsuarioService::new(Arc::new(MemStorage::default()));
        let seed = AdminSeed {
            usuario: "admin".to_string(),
            nome: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            setor: "TI".to_string(),
            cargo: "Administrador".to_string(),
            senha: "admin123".to_string(),
        };
        svc.garantir_admin(Some(&seed)).await.unwrap();
        svc.garantir_admin(Some(&seed)).await.unwrap();
        assert_eq!(svc.listar().await.unwrap().len(), 1);
        let perfil = svc
            .login(LoginIn { usuario: "admin".to_string(), senha: "admin123".to_string() })
            .await
            .unwrap();
        assert!(perfil.is_admin);
        assert_eq!(perfil.permissoes, "*");
    }
}
