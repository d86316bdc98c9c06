//! Cliente HTTP para a API REST do Discord

use crate::error::{DiscordError, Result};
use crate::types::{Channel, Message, MessagePayload, User};
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

const DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Cliente do bot do Discord
///
/// Construído explicitamente e injetado onde for usado. O login é feito por
/// `connect()` (valida o token em `/users/@me`); `ensure_connected()` só
/// conecta na primeira chamada.
#[derive(Clone)]
pub struct DiscordClient {
    http_client: HttpClient,
    token: String,
    base_url: String,
    ready: Arc<AtomicBool>,
    bot_user: Arc<RwLock<Option<User>>>,
    connect_lock: Arc<Mutex<()>>,
}

impl DiscordClient {
    /// Cria um novo cliente
    ///
    /// # Timeouts
    ///
    /// - Total: 30s
    /// - Connect: 5s
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DiscordError::ConfigError("Discord token is empty".to_string()));
        }

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DiscordError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            token,
            base_url: DISCORD_API_URL.to_string(),
            ready: Arc::new(AtomicBool::new(false)),
            bot_user: Arc::new(RwLock::new(None)),
            connect_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Troca a URL base (servidor de testes)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Usuário do bot, após o login
    pub async fn bot_user(&self) -> Option<User> {
        self.bot_user.read().await.clone()
    }

    /// Faz o login do bot
    pub async fn connect(&self) -> Result<User> {
        let user: User = self.get_json("/users/@me").await?;
        *self.bot_user.write().await = Some(user.clone());
        self.ready.store(true, Ordering::Release);

        tracing::info!("🤖 Bot do Discord está pronto e online: {}", user.username);
        Ok(user)
    }

    /// Conecta apenas se ainda não estiver pronto
    pub async fn ensure_connected(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        let _guard = self.connect_lock.lock().await;
        if self.is_ready() {
            return Ok(());
        }
        self.connect().await.map(|_| ())
    }

    pub async fn fetch_channel(&self, channel_id: &str) -> Result<Channel> {
        self.ensure_connected().await?;
        self.get_json(&format!("/channels/{}", channel_id)).await
    }

    pub async fn send_channel_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message> {
        self.ensure_connected().await?;
        self.post_json(&format!("/channels/{}/messages", channel_id), payload)
            .await
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<User> {
        self.ensure_connected().await?;
        self.get_json(&format!("/users/{}", user_id)).await
    }

    /// Abre (ou reaproveita) o canal de DM com o usuário e envia a mensagem
    pub async fn send_direct_message(
        &self,
        user_id: &str,
        payload: &MessagePayload,
    ) -> Result<Message> {
        self.ensure_connected().await?;
        let body = serde_json::json!({ "recipient_id": user_id });
        let dm: Channel = self.post_json("/users/@me/channels", &body).await?;

        tracing::debug!("Canal de DM {} aberto para {}", dm.id, user_id);
        self.send_channel_message(&dm.id, payload).await
    }

    /// Executa uma requisição GET e parseia JSON
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.json().await?)
    }

    /// Executa uma requisição POST e parseia JSON
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(body)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.json().await?)
    }

    /// Processa a resposta HTTP e trata erros
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!("Discord API error ({}): {}", status_code, error_body);

        // Discord responde {"message": "...", "code": 10013}
        let message = serde_json::from_str::<Value>(&error_body)
            .ok()
            .and_then(|json| json.get("message").and_then(|v| v.as_str()).map(String::from))
            .unwrap_or(error_body);

        Err(DiscordError::ApiError {
            status: status_code,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Embed;
    use httpmock::prelude::*;
    use serde_json::json;

    fn bot_json() -> Value {
        json!({"id": "900", "username": "taskflow-bot", "bot": true})
    }

    #[test]
    fn test_client_creation() {
        let client = DiscordClient::new("token").unwrap();
        assert_eq!(client.base_url(), "https://discord.com/api/v10");
        assert!(!client.is_ready());

        assert!(matches!(
            DiscordClient::new("  "),
            Err(DiscordError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_uma_vez() {
        let server = MockServer::start_async().await;
        let me = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/users/@me")
                    .header("Authorization", "Bot segredo");
                then.status(200).json_body(bot_json());
            })
            .await;

        let client = DiscordClient::new("segredo")
            .unwrap()
            .with_base_url(server.base_url());

        client.ensure_connected().await.unwrap();
        client.ensure_connected().await.unwrap();

        assert!(client.is_ready());
        assert_eq!(client.bot_user().await.unwrap().username, "taskflow-bot");
        me.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_token_invalido_nao_fica_pronto() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/@me");
                then.status(401)
                    .json_body(json!({"message": "401: Unauthorized", "code": 0}));
            })
            .await;

        let client = DiscordClient::new("ruim")
            .unwrap()
            .with_base_url(server.base_url());

        match client.ensure_connected().await {
            Err(DiscordError::ApiError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "401: Unauthorized");
            }
            outro => panic!("esperava ApiError, veio {:?}", outro),
        }
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_mensagem_em_canal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/@me");
                then.status(200).json_body(bot_json());
            })
            .await;
        let envio = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/channels/123/messages")
                    .header("Authorization", "Bot t")
                    .json_body(json!({"content": "olá"}));
                then.status(200)
                    .json_body(json!({"id": "m1", "channel_id": "123", "content": "olá"}));
            })
            .await;

        let client = DiscordClient::new("t").unwrap().with_base_url(server.base_url());
        let message = client
            .send_channel_message("123", &MessagePayload::text("olá"))
            .await
            .unwrap();

        assert_eq!(message.id, "m1");
        envio.assert_async().await;
    }

    #[tokio::test]
    async fn test_mensagem_direta_abre_canal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/@me");
                then.status(200).json_body(bot_json());
            })
            .await;
        let abre_dm = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/users/@me/channels")
                    .json_body(json!({"recipient_id": "42"}));
                then.status(200).json_body(json!({"id": "dm-42", "type": 1}));
            })
            .await;
        let envio = server
            .mock_async(|when, then| {
                when.method(POST).path("/channels/dm-42/messages");
                then.status(200)
                    .json_body(json!({"id": "m2", "channel_id": "dm-42"}));
            })
            .await;

        let client = DiscordClient::new("t").unwrap().with_base_url(server.base_url());
        let payload = MessagePayload::embed(Embed::new("Atribuído").color(0x2ecc71));
        client.send_direct_message("42", &payload).await.unwrap();

        abre_dm.assert_async().await;
        envio.assert_async().await;
    }

    #[tokio::test]
    async fn test_canal_inexistente() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/@me");
                then.status(200).json_body(bot_json());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/channels/999");
                then.status(404)
                    .json_body(json!({"message": "Unknown Channel", "code": 10003}));
            })
            .await;

        let client = DiscordClient::new("t").unwrap().with_base_url(server.base_url());
        let erro = client.fetch_channel("999").await.unwrap_err();
        assert!(erro.is_not_found());
    }
}
