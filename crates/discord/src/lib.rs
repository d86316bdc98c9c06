//! Cliente REST do bot do Discord
//!
//! Cobre o necessário para as notificações do TaskFlow:
//!
//! - Login explícito do bot (`connect` / `ensure_connected` / `is_ready`)
//! - Consulta de canal e de usuário
//! - Mensagens em canal e mensagens diretas (texto ou embeds)
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use discord::{DiscordClient, MessagePayload};
//!
//! let token = std::env::var("DISCORD_TOKEN")?;
//! let client = DiscordClient::new(token)?;
//! client.ensure_connected().await?;
//! client
//!     .send_channel_message("1413886639033548872", &MessagePayload::text("Olá!"))
//!     .await?;
//! ```

// Módulos públicos
pub mod client;
pub mod error;
pub mod types;

// Re-exports principais
pub use client::DiscordClient;
pub use error::{DiscordError, Result};
pub use types::{Channel, Embed, EmbedField, Message, MessagePayload, User};
