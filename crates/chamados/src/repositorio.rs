//! Contrato do repositório de chamados
//!
//! O repositório é o único dono dos registros. Toda mutação passa por
//! `aplicar_atualizacao`, que aplica os campos de `AtualizacaoChamado` de forma
//! atômica e acrescenta exatamente uma entrada ao histórico. A guarda da
//! atualização (`AtualizacaoChamado::guarda`) é avaliada sobre o registro já
//! travado; se falhar, nada é gravado.
//!
//! Além de consulta pontual, o repositório oferece:
//! - `assinar`: o conjunto completo de chamados que casam com um filtro,
//!   entregue imediatamente e de novo a cada mudança
//! - `eventos`: fluxo de mudanças com as versões antes/depois (consumido pela
//!   ponte de notificações)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};

use crate::error::Result;
use crate::permissoes::Regra;
use crate::tempo;
use crate::types::{Chamado, Comentario, NovoChamado, StatusChamado, Usuario};

/// Operação sobre a lista de responsáveis
#[derive(Debug, Clone, PartialEq)]
pub enum OperacaoExecutores {
    /// Acrescenta sem duplicar (`arrayUnion`)
    Adicionar(String),
    /// Substitui a lista inteira; cronômetros de quem saiu são parados
    Substituir(Vec<String>),
}

/// Operação sobre o cronômetro de um usuário
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperacaoTimer {
    Iniciar { em: DateTime<Utc> },
    Parar { em: DateTime<Utc> },
}

/// Alterações a aplicar atomicamente em um chamado
///
/// Ordem de aplicação: responsáveis, parada geral, cronômetros individuais,
/// status, pausa por ociosidade, anotações, comentário, conversão legada.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtualizacaoChamado {
    pub executores: Option<OperacaoExecutores>,
    pub parar_todos: Option<DateTime<Utc>>,
    pub timers: Vec<(String, OperacaoTimer)>,
    pub status: Option<StatusChamado>,
    /// Se ninguém mais estiver com cronômetro correndo, vai para `Pausado`
    pub pausar_se_ocioso: bool,
    pub notas_resolucao: Option<String>,
    pub justificativa_gestor: Option<String>,
    pub recusado_anteriormente: Option<bool>,
    pub arquivado: Option<bool>,
    pub comentario: Option<Comentario>,
    pub converter_tempo_legado: bool,
    /// Detalhes opcionais da entrada de histórico
    pub detalhes: Option<String>,
    /// Regra e ator conferidos contra o estado atual antes de aplicar
    pub guarda: Option<(Regra, Usuario)>,
}

impl AtualizacaoChamado {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adicionar_executor(mut self, usuario_id: impl Into<String>) -> Self {
        self.executores = Some(OperacaoExecutores::Adicionar(usuario_id.into()));
        self
    }

    pub fn substituir_executores(mut self, ids: Vec<String>) -> Self {
        self.executores = Some(OperacaoExecutores::Substituir(ids));
        self
    }

    pub fn iniciar_timer(mut self, usuario_id: impl Into<String>, em: DateTime<Utc>) -> Self {
        self.timers.push((usuario_id.into(), OperacaoTimer::Iniciar { em }));
        self
    }

    pub fn parar_timer(mut self, usuario_id: impl Into<String>, em: DateTime<Utc>) -> Self {
        self.timers.push((usuario_id.into(), OperacaoTimer::Parar { em }));
        self
    }

    pub fn parar_todos_timers(mut self, em: DateTime<Utc>) -> Self {
        self.parar_todos = Some(em);
        self
    }

    pub fn status(mut self, status: StatusChamado) -> Self {
        self.status = Some(status);
        self
    }

    pub fn pausar_se_ocioso(mut self) -> Self {
        self.pausar_se_ocioso = true;
        self
    }

    pub fn notas_resolucao(mut self, notas: impl Into<String>) -> Self {
        self.notas_resolucao = Some(notas.into());
        self
    }

    pub fn justificativa_gestor(mut self, justificativa: impl Into<String>) -> Self {
        self.justificativa_gestor = Some(justificativa.into());
        self
    }

    pub fn recusado_anteriormente(mut self, valor: bool) -> Self {
        self.recusado_anteriormente = Some(valor);
        self
    }

    pub fn arquivado(mut self, valor: bool) -> Self {
        self.arquivado = Some(valor);
        self
    }

    pub fn comentario(mut self, comentario: Comentario) -> Self {
        self.comentario = Some(comentario);
        self
    }

    pub fn converter_tempo_legado(mut self) -> Self {
        self.converter_tempo_legado = true;
        self
    }

    pub fn detalhes(mut self, detalhes: impl Into<String>) -> Self {
        self.detalhes = Some(detalhes.into());
        self
    }

    pub fn guarda(mut self, regra: Regra, ator: &Usuario) -> Self {
        self.guarda = Some((regra, ator.clone()));
        self
    }

    /// Confere a guarda contra o estado do chamado no momento da escrita
    pub fn verificar_guarda(&self, chamado: &Chamado) -> Result<()> {
        match &self.guarda {
            Some((regra, ator)) => regra.verificar(ator, chamado),
            None => Ok(()),
        }
    }

    /// Nenhum campo a alterar? (a guarda não conta)
    pub fn is_vazia(&self) -> bool {
        let sem_guarda = Self {
            guarda: None,
            ..self.clone()
        };
        sem_guarda == Self::default()
    }

    /// Aplica as alterações sobre uma cópia do chamado
    ///
    /// `agora` carimba `resolvidoEm` e a parada dos cronômetros de quem foi
    /// removido da lista de responsáveis.
    pub fn aplicar_em(&self, chamado: &mut Chamado, agora: DateTime<Utc>) {
        let status_anterior = chamado.status;

        match &self.executores {
            Some(OperacaoExecutores::Adicionar(uid)) => {
                if !chamado.is_executor(uid) {
                    chamado.executor_ids.push(uid.clone());
                }
            }
            Some(OperacaoExecutores::Substituir(ids)) => {
                let mut novos: Vec<String> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !novos.contains(id) {
                        novos.push(id.clone());
                    }
                }
                let removidos: Vec<String> = chamado
                    .executor_ids
                    .iter()
                    .filter(|id| !novos.contains(id))
                    .cloned()
                    .collect();
                for uid in &removidos {
                    tempo::parar_timer(chamado, uid, agora);
                }
                chamado.executor_ids = novos;
            }
            None => {}
        }

        if let Some(em) = self.parar_todos {
            tempo::parar_todos_timers(chamado, em);
        }

        for (uid, operacao) in &self.timers {
            match operacao {
                OperacaoTimer::Iniciar { em } => tempo::iniciar_timer(chamado, uid, *em),
                OperacaoTimer::Parar { em } => {
                    if tempo::parar_timer(chamado, uid, *em).is_none() {
                        tracing::warn!(
                            "Cronômetro de {} no chamado {} já estava parado",
                            uid,
                            chamado.id
                        );
                    }
                }
            }
        }

        if let Some(status) = self.status {
            chamado.status = status;
            if status == StatusChamado::Resolvido && status_anterior != StatusChamado::Resolvido {
                chamado.resolvido_em = Some(agora);
            }
        }

        if self.pausar_se_ocioso
            && chamado.status == StatusChamado::EmAndamento
            && !chamado.alguem_rastreando()
        {
            chamado.status = StatusChamado::Pausado;
        }

        if let Some(notas) = &self.notas_resolucao {
            chamado.notas_resolucao = Some(notas.clone());
        }
        if let Some(justificativa) = &self.justificativa_gestor {
            chamado.justificativa_gestor = Some(justificativa.clone());
        }
        if let Some(valor) = self.recusado_anteriormente {
            chamado.recusado_anteriormente = valor;
        }
        if let Some(valor) = self.arquivado {
            chamado.arquivado = valor;
        }

        if let Some(comentario) = &self.comentario {
            chamado.comentarios.push(comentario.clone());
        }

        if self.converter_tempo_legado {
            if let Some(horas) = chamado.tempo_gasto_horas_legado.take() {
                let segundos = (horas.max(0.0) * 3600.0).round() as u64;
                chamado.tempo_gasto += segundos;
            }
        }
    }
}

/// Filtro de consulta/assinatura
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltroChamados {
    /// Igualdade em `arquivado`; `None` aceita ambos
    pub arquivado: Option<bool>,
    /// Pertinência de `status`; vazio aceita todos
    pub status: Vec<StatusChamado>,
    /// O usuário precisa estar em `executorIds`
    pub executor: Option<String>,
}

impl FiltroChamados {
    /// Chamados não arquivados (dashboard)
    pub fn ativos() -> Self {
        Self {
            arquivado: Some(false),
            ..Default::default()
        }
    }

    pub fn arquivados() -> Self {
        Self {
            arquivado: Some(true),
            ..Default::default()
        }
    }

    pub fn com_status(mut self, status: Vec<StatusChamado>) -> Self {
        self.status = status;
        self
    }

    pub fn com_executor(mut self, usuario_id: impl Into<String>) -> Self {
        self.executor = Some(usuario_id.into());
        self
    }

    pub fn aceita(&self, chamado: &Chamado) -> bool {
        if let Some(arquivado) = self.arquivado {
            if chamado.arquivado != arquivado {
                return false;
            }
        }
        if !self.status.is_empty() && !self.status.contains(&chamado.status) {
            return false;
        }
        if let Some(executor) = &self.executor {
            if !chamado.is_executor(executor) {
                return false;
            }
        }
        true
    }

    /// Seleciona e ordena por `criadoEm` decrescente
    pub fn selecionar<'a>(&self, chamados: impl Iterator<Item = &'a Chamado>) -> Vec<Chamado> {
        let mut resultado: Vec<Chamado> = chamados.filter(|c| self.aceita(c)).cloned().collect();
        resultado.sort_by(|a, b| b.criado_em.cmp(&a.criado_em).then_with(|| a.id.cmp(&b.id)));
        resultado
    }
}

/// Mudança publicada pelo repositório
#[derive(Debug, Clone)]
pub enum EventoChamado {
    Criado { depois: Chamado },
    Atualizado { antes: Chamado, depois: Chamado },
}

impl EventoChamado {
    /// Versão atual do chamado
    pub fn chamado(&self) -> &Chamado {
        match self {
            EventoChamado::Criado { depois } => depois,
            EventoChamado::Atualizado { depois, .. } => depois,
        }
    }

    pub fn id(&self) -> &str {
        &self.chamado().id
    }
}

/// Assinatura de um conjunto filtrado de chamados
///
/// Soltar a assinatura cancela o envio.
#[derive(Debug)]
pub struct Assinatura {
    receptor: watch::Receiver<Vec<Chamado>>,
}

impl Assinatura {
    pub fn new(receptor: watch::Receiver<Vec<Chamado>>) -> Self {
        Self { receptor }
    }

    /// Conjunto mais recente, sem esperar
    pub fn atual(&mut self) -> Vec<Chamado> {
        self.receptor.borrow_and_update().clone()
    }

    /// Espera a próxima mudança; `None` quando o repositório foi encerrado
    pub async fn proxima(&mut self) -> Option<Vec<Chamado>> {
        self.receptor.changed().await.ok()?;
        Some(self.receptor.borrow_and_update().clone())
    }

    pub fn cancelar(self) {}
}

/// Armazenamento de chamados
#[async_trait]
pub trait ChamadoRepository: Send + Sync {
    /// Valida e insere um novo chamado; retorna o id
    async fn criar(&self, novo: NovoChamado) -> Result<String>;

    /// Aplica `atualizacao` e acrescenta `{autor: ator_id, acao, timestamp}` ao histórico
    ///
    /// A guarda da atualização é conferida sob o mesmo lock da escrita; em
    /// caso de falha devolve o erro da guarda sem alterar o registro.
    async fn aplicar_atualizacao(
        &self,
        id: &str,
        atualizacao: AtualizacaoChamado,
        ator_id: &str,
        acao: &str,
    ) -> Result<Chamado>;

    async fn obter(&self, id: &str) -> Result<Chamado>;

    async fn listar(&self, filtro: &FiltroChamados) -> Result<Vec<Chamado>>;

    async fn listar_todos(&self) -> Result<Vec<Chamado>> {
        self.listar(&FiltroChamados::default()).await
    }

    /// Insere um registro já existente sem alterá-lo (importação de dados)
    async fn importar(&self, chamado: Chamado) -> Result<()>;

    async fn assinar(&self, filtro: FiltroChamados) -> Result<Assinatura>;

    fn eventos(&self) -> broadcast::Receiver<EventoChamado>;
}
