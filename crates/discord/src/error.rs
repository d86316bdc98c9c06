//! Tipos de erro para o crate discord

use thiserror::Error;

/// Erros do cliente Discord
#[derive(Debug, Error)]
pub enum DiscordError {
    /// Erro de requisição HTTP
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Erro da API do Discord (status code não-2xx)
    #[error("Discord API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// O bot ainda não completou o login
    #[error("Discord client not ready: {0}")]
    NotReady(String),

    /// Erro de configuração (token ausente, cliente HTTP)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DiscordError {
    /// Recurso inexistente ou inacessível para o bot (usuário, canal)
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiscordError::ApiError { status: 404, .. })
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, DiscordError>;
