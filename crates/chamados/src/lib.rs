//! Núcleo de domínio do TaskFlow
//!
//! Este crate concentra o ciclo de vida dos chamados e a contagem de tempo
//! colaborativa:
//!
//! - **Repositório** (`repositorio`, `memoria`): criação, atualização atômica
//!   com histórico, consultas, assinaturas e fluxo de eventos
//! - **Motor de tempo** (`tempo`): cronômetros individuais por executor,
//!   somados no `tempoGasto` do chamado
//! - **Ciclo de vida** (`ciclo`): transições de status e seus efeitos
//! - **Permissões** (`permissoes`): guardas `verificar_*` de cada ação (usadas
//!   pelo ciclo, pelo repositório via `Regra` e por `AcoesDisponiveis`) e o
//!   destaque dos cards (`pode_agir`, `acao_sugerida`), usado só pela API
//! - **Analytics** e **Agenda**: consumidores simples do núcleo
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use chamados::{CicloChamados, MemoriaChamados, RelogioSistema};
//! use std::sync::Arc;
//!
//! let relogio = Arc::new(RelogioSistema);
//! let repo = Arc::new(MemoriaChamados::new(relogio.clone()));
//! let ciclo = CicloChamados::new(repo, relogio);
//!
//! let chamado = ciclo.criar(&gestor, novo).await?;
//! ciclo.assumir(&chamado.id, &executor).await?;
//! ```

// Módulos públicos
pub mod agenda;
pub mod analytics;
pub mod ciclo;
pub mod error;
pub mod memoria;
pub mod permissoes;
pub mod persistencia;
pub mod relogio;
pub mod repositorio;
pub mod tempo;
pub mod types;

// Re-exports principais
pub use agenda::{AgendaRepository, AgendaTarefa, MemoriaAgenda, ServicoAgenda};
pub use ciclo::{CicloChamados, RelatorioMigracao};
pub use error::{ChamadoError, Result};
pub use memoria::MemoriaChamados;
pub use permissoes::AcoesDisponiveis;
pub use relogio::{Relogio, RelogioManual, RelogioSistema};
pub use repositorio::{
    Assinatura, AtualizacaoChamado, ChamadoRepository, EventoChamado, FiltroChamados,
};
pub use tempo::MotorTempo;
pub use types::*;
