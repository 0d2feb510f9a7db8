// src/models/usuario.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

// Representa um usuário vindo do banco de dados. A senha só existe como hash
// bcrypt e nunca é serializada para fora.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Usuario {
    pub usuario: String,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub setor: Option<String>,
    pub cargo: Option<String>,
    #[serde(skip_serializing)]
    pub senha_hash: Option<String>,
    pub is_admin: bool,
    pub permissoes: Option<String>,
}

// Projeção pública (listagens e resposta de login).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UsuarioPublico {
    pub usuario: String,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub setor: Option<String>,
    pub cargo: Option<String>,
    pub is_admin: bool,
    pub permissoes: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UsuarioIn {
    #[validate(length(min = 1, message = "O usuário é obrigatório."))]
    pub usuario: String,
    pub nome: String,
    pub email: String,
    pub setor: String,
    pub cargo: String,
    // Quando presente, a senha é (re)definida no upsert.
    pub senha: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    // Tags separadas por vírgula, ou "*" para todas.
    pub permissoes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginIn {
    #[validate(length(min = 1, message = "O usuário é obrigatório."))]
    pub usuario: String,
    pub senha: String,
}

#[derive(Debug, Serialize)]
pub struct LoginOut {
    pub usuario: String,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
    pub permissoes: String,
}

// Troca de senha: self-service exige a senha atual; `force` é o reset
// administrativo, que dispensa a conferência.
#[derive(Debug, Deserialize, Validate)]
pub struct TrocaSenhaIn {
    #[validate(length(min = 1, message = "O usuário é obrigatório."))]
    pub usuario: String,
    pub senha_atual: Option<String>,
    #[validate(length(min = 1, message = "A nova senha é obrigatória."))]
    pub senha_nova: String,
    #[serde(default)]
    pub force: bool,
}
