//! Documento de chamado e seus sub-registros
//!
//! O formato JSON segue os nomes de campos da coleção original
//! (`titulo`, `executorIds`, `timeTracking`, `tempoGasto`, ...).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::status::{Prioridade, StatusChamado};
use crate::error::{ChamadoError, Result};

/// Estado do cronômetro individual de um executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoTimer {
    Tracking,
    Paused,
}

/// Intervalo de trabalho já contabilizado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervalo {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Duração em segundos (nunca negativa)
    pub duration: u64,
}

/// Cronômetro de um executor dentro de um chamado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerUsuario {
    pub status: EstadoTimer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_seconds: u64,
    #[serde(default)]
    pub intervals: Vec<Intervalo>,
}

impl Default for TimerUsuario {
    fn default() -> Self {
        Self {
            status: EstadoTimer::Paused,
            last_start: None,
            total_seconds: 0,
            intervals: Vec::new(),
        }
    }
}

impl TimerUsuario {
    pub fn rastreando(&self) -> bool {
        self.status == EstadoTimer::Tracking
    }
}

/// Comentário (lista somente de acréscimo)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comentario {
    pub texto: String,
    pub autor_nome: String,
    pub autor_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Entrada do histórico de auditoria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntradaHistorico {
    pub autor: String,
    pub acao: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detalhes: Option<String>,
}

/// Chamado (ticket)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chamado {
    pub id: String,
    pub titulo: String,
    pub descricao: String,
    pub prioridade: Prioridade,
    pub prazo: NaiveDate,
    pub status: StatusChamado,
    pub solicitante_id: String,
    #[serde(default)]
    pub executor_ids: Vec<String>,
    #[serde(default)]
    pub time_tracking: BTreeMap<String, TimerUsuario>,
    /// Tempo total do projeto, em segundos
    #[serde(default)]
    pub tempo_gasto: u64,
    /// Valor legado em horas, marcado explicitamente na importação
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo_gasto_horas_legado: Option<f64>,
    #[serde(default)]
    pub arquivado: bool,
    #[serde(default)]
    pub comentarios: Vec<Comentario>,
    #[serde(default)]
    pub historico: Vec<EntradaHistorico>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas_resolucao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justificativa_gestor: Option<String>,
    #[serde(default)]
    pub recusado_anteriormente: bool,
    pub criado_em: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolvido_em: Option<DateTime<Utc>>,
}

impl Chamado {
    /// O usuário está entre os responsáveis?
    pub fn is_executor(&self, usuario_id: &str) -> bool {
        self.executor_ids.iter().any(|id| id == usuario_id)
    }

    pub fn timer(&self, usuario_id: &str) -> Option<&TimerUsuario> {
        self.time_tracking.get(usuario_id)
    }

    /// O cronômetro do usuário está correndo?
    pub fn esta_rastreando(&self, usuario_id: &str) -> bool {
        self.timer(usuario_id).map(|t| t.rastreando()).unwrap_or(false)
    }

    /// Algum cronômetro está correndo neste chamado?
    pub fn alguem_rastreando(&self) -> bool {
        self.time_tracking.values().any(|t| t.rastreando())
    }

    /// Usuários com cronômetro correndo
    pub fn executores_rastreando(&self) -> Vec<String> {
        self.time_tracking
            .iter()
            .filter(|(_, t)| t.rastreando())
            .map(|(uid, _)| uid.clone())
            .collect()
    }

    /// Total já contabilizado do usuário (0 se nunca iniciou)
    pub fn total_usuario(&self, usuario_id: &str) -> u64 {
        self.timer(usuario_id).map(|t| t.total_seconds).unwrap_or(0)
    }
}

/// Dados de criação de um chamado
///
/// `prioridade` e `prazo` são opcionais aqui apenas para que a ausência
/// seja reportada como erro de validação, e não de desserialização.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovoChamado {
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub descricao: String,
    #[serde(default)]
    pub prioridade: Option<Prioridade>,
    #[serde(default)]
    pub prazo: Option<NaiveDate>,
    #[serde(default)]
    pub solicitante_id: String,
}

/// Campos validados de um novo chamado
#[derive(Debug, Clone, PartialEq)]
pub struct NovoChamadoValido {
    pub titulo: String,
    pub descricao: String,
    pub prioridade: Prioridade,
    pub prazo: NaiveDate,
    pub solicitante_id: String,
}

impl NovoChamado {
    /// Verifica os campos obrigatórios
    pub fn validar(self) -> Result<NovoChamadoValido> {
        if self.titulo.trim().is_empty() {
            return Err(ChamadoError::Validacao("Informe o título do chamado".to_string()));
        }
        if self.descricao.trim().is_empty() {
            return Err(ChamadoError::Validacao("Informe a descrição do chamado".to_string()));
        }
        let prioridade = self
            .prioridade
            .ok_or_else(|| ChamadoError::Validacao("Selecione uma prioridade".to_string()))?;
        let prazo = self
            .prazo
            .ok_or_else(|| ChamadoError::Validacao("Selecione um prazo para a conclusão".to_string()))?;
        if self.solicitante_id.trim().is_empty() {
            return Err(ChamadoError::Validacao("Solicitante não informado".to_string()));
        }

        Ok(NovoChamadoValido {
            titulo: self.titulo.trim().to_string(),
            descricao: self.descricao,
            prioridade,
            prazo,
            solicitante_id: self.solicitante_id,
        })
    }
}
