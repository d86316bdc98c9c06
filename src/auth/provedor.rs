//! Fronteira com o provedor de autenticação

use async_trait::async_trait;
use chamados::Perfil;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::utils::AppResult;

/// Sessão aberta por login ou cadastro
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sessao {
    pub token: String,
    pub uid: String,
    pub expira_em: DateTime<Utc>,
}

/// Dados do formulário de cadastro
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DadosCadastro {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub perfil: Option<Perfil>,
    #[serde(default)]
    pub confirmar_senha: Option<String>,
    #[serde(default)]
    pub discord_id: Option<String>,
}

/// Mudança de sessão (entrada/saída)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventoSessao {
    Entrou { uid: String },
    Saiu { uid: String },
}

#[async_trait]
pub trait ProvedorAutenticacao: Send + Sync {
    async fn entrar(&self, email: &str, senha: &str) -> AppResult<Sessao>;

    /// Cria a conta e o perfil (acesso pendente) e já abre a sessão
    async fn cadastrar(&self, email: &str, senha: &str, dados: DadosCadastro) -> AppResult<Sessao>;

    async fn sair(&self, token: &str) -> AppResult<()>;

    /// Retorna o uid dono do token
    async fn validar(&self, token: &str) -> AppResult<String>;

    fn observar(&self) -> broadcast::Receiver<EventoSessao>;
}
