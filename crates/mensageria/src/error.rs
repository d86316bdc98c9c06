use discord::DiscordError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificacaoError {
    #[error("Discord error: {0}")]
    Discord(#[from] DiscordError),

    #[error("Recipient not found: {0}")]
    Destinatario(String),

    #[error("Directory error: {0}")]
    Diretorio(String),
}

pub type Result<T> = std::result::Result<T, NotificacaoError>;
