//! Perfis de usuário
//!
//! `perfil` decide quais ações do ciclo de vida são permitidas;
//! `acesso` decide se o usuário pode usar as telas protegidas.

use serde::{Deserialize, Serialize};

/// Papel do usuário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Perfil {
    Executor,
    Gestor,
}

impl std::fmt::Display for Perfil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Perfil::Executor => write!(f, "Executor"),
            Perfil::Gestor => write!(f, "Gestor"),
        }
    }
}

/// Situação de acesso (aprovação de novos cadastros)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Acesso {
    Aprovado,
    Pendente,
    Rejeitado,
}

/// Perfil armazenado de um usuário
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub uid: String,
    pub nome: String,
    pub email: String,
    pub perfil: Perfil,
    pub acesso: Acesso,
    /// ID do usuário no Discord, para mensagens diretas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,
}

impl Usuario {
    pub fn is_gestor(&self) -> bool {
        self.perfil == Perfil::Gestor
    }

    pub fn aprovado(&self) -> bool {
        self.acesso == Acesso::Aprovado
    }
}
