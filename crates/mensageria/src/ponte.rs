//! Ponte entre o fluxo de eventos dos chamados e o Discord
//!
//! Consome `EventoChamado` de um `broadcast::Receiver`, deriva as
//! notificações e as entrega por um `CanalNotificacao`. Falhas de entrega são
//! registradas no log e nunca interrompem o laço nem afetam a operação que
//! gerou o evento.

use async_trait::async_trait;
use chamados::EventoChamado;
use discord::{DiscordClient, MessagePayload};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::error::{NotificacaoError, Result};
use crate::mensagens::{compor, Destino, Envio};
use crate::notificacao::{derivar, Notificacao};

/// Nome usado quando o solicitante não tem perfil
pub const NOME_DESCONHECIDO: &str = "Desconhecido";

/// Saída das mensagens (Discord em produção, gravador nos testes)
#[async_trait]
pub trait CanalNotificacao: Send + Sync {
    async fn enviar_canal(&self, payload: &MessagePayload) -> Result<()>;

    /// `discord_id` é o ID do usuário no Discord
    async fn enviar_direta(&self, discord_id: &str, payload: &MessagePayload) -> Result<()>;
}

/// Consulta de nomes e IDs do Discord dos usuários do TaskFlow
#[async_trait]
pub trait DiretorioUsuarios: Send + Sync {
    async fn nome(&self, uid: &str) -> Option<String>;
    async fn discord_id(&self, uid: &str) -> Option<String>;
}

/// Canal de notificação sobre o cliente REST do Discord
pub struct CanalDiscord {
    client: DiscordClient,
    canal_id: String,
}

impl CanalDiscord {
    pub fn new(client: DiscordClient, canal_id: impl Into<String>) -> Self {
        Self {
            client,
            canal_id: canal_id.into(),
        }
    }

    pub fn canal_id(&self) -> &str {
        &self.canal_id
    }
}

#[async_trait]
impl CanalNotificacao for CanalDiscord {
    async fn enviar_canal(&self, payload: &MessagePayload) -> Result<()> {
        self.client
            .send_channel_message(&self.canal_id, payload)
            .await?;
        Ok(())
    }

    async fn enviar_direta(&self, discord_id: &str, payload: &MessagePayload) -> Result<()> {
        self.client.send_direct_message(discord_id, payload).await?;
        Ok(())
    }
}

/// Serviço de notificações
#[derive(Clone)]
pub struct PonteNotificacoes {
    canal: Arc<dyn CanalNotificacao>,
    diretorio: Arc<dyn DiretorioUsuarios>,
}

impl PonteNotificacoes {
    pub fn new(canal: Arc<dyn CanalNotificacao>, diretorio: Arc<dyn DiretorioUsuarios>) -> Self {
        Self { canal, diretorio }
    }

    /// Processa um evento. Retorna quantas mensagens foram entregues.
    pub async fn processar(&self, evento: &EventoChamado) -> usize {
        let notificacoes = derivar(evento);
        if notificacoes.is_empty() {
            return 0;
        }

        let chamado = evento.chamado();
        let solicitante = self
            .diretorio
            .nome(&chamado.solicitante_id)
            .await
            .unwrap_or_else(|| NOME_DESCONHECIDO.to_string());

        let mut entregues = 0;
        for notificacao in &notificacoes {
            match self.entregar(notificacao, &solicitante).await {
                Ok(true) => entregues += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        "❌ Falha ao notificar Discord (chamado {}): {}",
                        notificacao.chamado().id,
                        e
                    );
                }
            }
        }
        entregues
    }

    /// `Ok(false)` quando o destinatário não tem Discord vinculado
    async fn entregar(&self, notificacao: &Notificacao, solicitante: &str) -> Result<bool> {
        let Envio { destino, payload } = compor(notificacao, solicitante);
        match destino {
            Destino::Canal => {
                self.canal.enviar_canal(&payload).await?;
                tracing::info!(
                    "📨 Notificação enviada ao canal (chamado {})",
                    notificacao.chamado().id
                );
                Ok(true)
            }
            Destino::Usuario(uid) => {
                let Some(discord_id) = self.diretorio.discord_id(&uid).await else {
                    tracing::debug!("Usuário {} sem discordId, DM ignorada", uid);
                    return Ok(false);
                };
                self.canal
                    .enviar_direta(&discord_id, &payload)
                    .await
                    .map_err(|e| match e {
                        NotificacaoError::Discord(erro) if erro.is_not_found() => {
                            NotificacaoError::Destinatario(discord_id.clone())
                        }
                        outro => outro,
                    })?;
                tracing::info!("📨 DM de atribuição enviada para {}", uid);
                Ok(true)
            }
        }
    }

    /// Laço principal: roda até o emissor ser fechado
    pub async fn executar(self, mut eventos: broadcast::Receiver<EventoChamado>) {
        tracing::info!("🔔 Ponte de notificações iniciada");
        loop {
            match eventos.recv().await {
                Ok(evento) => {
                    self.processar(&evento).await;
                }
                Err(RecvError::Lagged(perdidos)) => {
                    tracing::warn!("⚠️ Ponte de notificações atrasada: {} eventos descartados", perdidos);
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::info!("Ponte de notificações encerrada");
    }

    pub fn iniciar(self, eventos: broadcast::Receiver<EventoChamado>) -> JoinHandle<()> {
        tokio::spawn(self.executar(eventos))
    }
}
