//! Contagem de tempo individual por executor
//!
//! Cada par (chamado, executor) tem um cronômetro com dois estados:
//! `paused` ⇄ `tracking`.
//!
//! - Iniciar grava `lastStart`; iniciar um cronômetro que já está correndo
//!   apenas re-baseia `lastStart` (o trecho anterior não é somado).
//! - Parar exige `lastStart`; a duração é `max(0, fim - início)` em segundos
//!   inteiros e é somada em `totalSeconds` e em `tempoGasto` do chamado.
//! - Parar um cronômetro que nunca foi iniciado (ou já parado) não faz nada.
//!
//! As funções puras deste módulo são aplicadas pelo repositório dentro da
//! seção atômica de `aplicar_atualizacao`, de modo que duas paradas
//! simultâneas de executores diferentes nunca perdem incremento.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::relogio::Relogio;
use crate::repositorio::{AtualizacaoChamado, ChamadoRepository};
use crate::types::{Chamado, EstadoTimer, Intervalo};

/// Duração em segundos inteiros, arredondada e nunca negativa
pub fn duracao_segundos(inicio: DateTime<Utc>, fim: DateTime<Utc>) -> u64 {
    let ms = (fim - inicio).num_milliseconds();
    if ms < 0 {
        tracing::warn!(
            "Duração negativa detectada ({}ms), definindo duração para 0",
            ms
        );
        return 0;
    }
    ((ms + 500) / 1000) as u64
}

/// Marca o cronômetro do usuário como `tracking` a partir de `em`
pub fn iniciar_timer(chamado: &mut Chamado, usuario_id: &str, em: DateTime<Utc>) {
    let timer = chamado
        .time_tracking
        .entry(usuario_id.to_string())
        .or_default();
    timer.status = EstadoTimer::Tracking;
    timer.last_start = Some(em);
}

/// Para o cronômetro do usuário e contabiliza o intervalo
///
/// Retorna a duração somada, ou `None` se não havia início registrado.
pub fn parar_timer(chamado: &mut Chamado, usuario_id: &str, em: DateTime<Utc>) -> Option<u64> {
    let timer = chamado.time_tracking.get_mut(usuario_id)?;
    let inicio = timer.last_start.take()?;

    let duracao = duracao_segundos(inicio, em);
    timer.total_seconds += duracao;
    timer.status = EstadoTimer::Paused;
    timer.intervals.push(Intervalo {
        start: inicio,
        end: em,
        duration: duracao,
    });
    chamado.tempo_gasto += duracao;

    Some(duracao)
}

/// Para todos os cronômetros que estão correndo; retorna o total somado
pub fn parar_todos_timers(chamado: &mut Chamado, em: DateTime<Utc>) -> u64 {
    chamado
        .executores_rastreando()
        .iter()
        .filter_map(|uid| parar_timer(chamado, uid, em))
        .sum()
}

/// Formata segundos como `HH:MM:SS`
pub fn formatar_duracao(total_segundos: u64) -> String {
    let horas = total_segundos / 3600;
    let minutos = (total_segundos % 3600) / 60;
    let segundos = total_segundos % 60;
    format!("{:02}:{:02}:{:02}", horas, minutos, segundos)
}

/// Motor de contagem de tempo sobre o repositório de chamados
#[derive(Clone)]
pub struct MotorTempo {
    repositorio: Arc<dyn ChamadoRepository>,
    relogio: Arc<dyn Relogio>,
}

impl MotorTempo {
    pub fn new(repositorio: Arc<dyn ChamadoRepository>, relogio: Arc<dyn Relogio>) -> Self {
        Self {
            repositorio,
            relogio,
        }
    }

    pub fn agora(&self) -> DateTime<Utc> {
        self.relogio.agora()
    }

    /// Inicia o cronômetro do usuário, junto com os efeitos em `base`
    pub async fn iniciar(
        &self,
        chamado_id: &str,
        usuario_id: &str,
        base: AtualizacaoChamado,
        acao: &str,
    ) -> Result<Chamado> {
        let atualizacao = base.iniciar_timer(usuario_id, self.agora());
        let chamado = self
            .repositorio
            .aplicar_atualizacao(chamado_id, atualizacao, usuario_id, acao)
            .await?;

        tracing::info!("⏱️ Cronômetro iniciado: chamado={} usuario={}", chamado_id, usuario_id);
        Ok(chamado)
    }

    /// Para o cronômetro do usuário, junto com os efeitos em `base`
    ///
    /// Sem início registrado e sem outros efeitos, nada é gravado e o
    /// chamado atual é devolvido.
    pub async fn parar(
        &self,
        chamado_id: &str,
        usuario_id: &str,
        base: AtualizacaoChamado,
        acao: &str,
    ) -> Result<Chamado> {
        let atual = self.repositorio.obter(chamado_id).await?;
        let total_antes = atual.total_usuario(usuario_id);

        let tem_inicio = atual
            .timer(usuario_id)
            .map(|t| t.last_start.is_some())
            .unwrap_or(false);

        if !tem_inicio {
            tracing::warn!(
                "Tentativa de parar o cronômetro sem um tempo de início: chamado={} usuario={}",
                chamado_id,
                usuario_id
            );
            if base.is_vazia() {
                return Ok(atual);
            }
        }

        let atualizacao = base.parar_timer(usuario_id, self.agora());
        let chamado = self
            .repositorio
            .aplicar_atualizacao(chamado_id, atualizacao, usuario_id, acao)
            .await?;

        let total_depois = chamado.total_usuario(usuario_id);
        tracing::info!(
            "⏱️ Cronômetro parado: chamado={} usuario={} +{}s (total {})",
            chamado_id,
            usuario_id,
            total_depois.saturating_sub(total_antes),
            formatar_duracao(total_depois)
        );
        Ok(chamado)
    }

    /// Para todos os cronômetros correndo, junto com os efeitos em `base`
    pub async fn parar_todos(
        &self,
        chamado_id: &str,
        ator_id: &str,
        base: AtualizacaoChamado,
        acao: &str,
    ) -> Result<Chamado> {
        let atualizacao = base.parar_todos_timers(self.agora());
        let chamado = self
            .repositorio
            .aplicar_atualizacao(chamado_id, atualizacao, ator_id, acao)
            .await?;

        tracing::info!(
            "⏱️ Cronômetros encerrados: chamado={} tempo total {}",
            chamado_id,
            formatar_duracao(chamado.tempo_gasto)
        );
        Ok(chamado)
    }
}
