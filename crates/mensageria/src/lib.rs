//! Ponte de notificações: eventos de chamados → Discord
//!
//! Comportamento:
//! - Chamado criado → anúncio no canal geral
//! - Novos responsáveis → DM para cada um (somente quem tem `discordId`)
//! - Novo comentário → aviso no canal
//! - Resolvido / Aprovado / Recusado → anúncio no canal
//!
//! Exemplo:
//! ```rust,ignore
//! let canal = Arc::new(CanalDiscord::new(client, "1413886639033548872"));
//! let ponte = PonteNotificacoes::new(canal, diretorio);
//! let handle = ponte.iniciar(repositorio.eventos());
//! ```

pub mod error;
pub mod mensagens;
pub mod notificacao;
pub mod ponte;

pub use error::{NotificacaoError, Result};
pub use mensagens::{compor, Destino, Envio};
pub use notificacao::{derivar, MudancaStatus, Notificacao};
pub use ponte::{CanalDiscord, CanalNotificacao, DiretorioUsuarios, PonteNotificacoes};
