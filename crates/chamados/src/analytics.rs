//! Agregações do painel de analytics
//!
//! Todo tempo é tratado em segundos; a conversão para horas acontece só no
//! resultado. Registros legados contribuem apenas pelo campo explícito
//! `tempoGastoHorasLegado`.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::types::{Chamado, Prioridade, StatusChamado, Usuario};

/// Janela de tempo sobre `criadoEm`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Periodo {
    #[default]
    #[serde(rename = "all")]
    Tudo,
    #[serde(rename = "year")]
    Ano,
    #[serde(rename = "month")]
    Mes,
    #[serde(rename = "week")]
    Semana,
}

impl FromStr for Periodo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(Periodo::Tudo),
            "year" => Ok(Periodo::Ano),
            "month" => Ok(Periodo::Mes),
            "week" => Ok(Periodo::Semana),
            other => Err(format!("período desconhecido: {}", other)),
        }
    }
}

impl Periodo {
    /// Intervalo `[início do período, fim do dia de hoje]`; `None` para tudo
    ///
    /// A semana começa no domingo.
    pub fn intervalo(&self, agora: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let hoje = agora.date_naive();
        let inicio = match self {
            Periodo::Tudo => return None,
            Periodo::Ano => hoje.with_ordinal(1)?,
            Periodo::Mes => hoje.with_day(1)?,
            Periodo::Semana => hoje - Duration::days(hoje.weekday().num_days_from_sunday() as i64),
        };
        let inicio = Utc.from_utc_datetime(&inicio.and_hms_opt(0, 0, 0)?);
        let fim = Utc.from_utc_datetime(&(hoje + Duration::days(1)).and_hms_opt(0, 0, 0)?)
            - Duration::milliseconds(1);
        Some((inicio, fim))
    }

    pub fn contem(&self, instante: DateTime<Utc>, agora: DateTime<Utc>) -> bool {
        match self.intervalo(agora) {
            None => true,
            Some((inicio, fim)) => instante >= inicio && instante <= fim,
        }
    }
}

/// Tempo do chamado em segundos, somando o valor legado marcado (se houver)
pub fn segundos_normalizados(chamado: &Chamado) -> u64 {
    let legado = chamado
        .tempo_gasto_horas_legado
        .map(|h| (h.max(0.0) * 3600.0).round() as u64)
        .unwrap_or(0);
    chamado.tempo_gasto + legado
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contagem {
    pub nome: String,
    pub valor: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricaUsuario {
    pub uid: String,
    pub nome: String,
    pub chamados_resolvidos: usize,
    pub media_tempo_gasto_horas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricasAnalytics {
    pub periodo: Periodo,
    pub total_chamados: usize,
    pub media_tempo_resolucao_horas: f64,
    pub por_status: Vec<Contagem>,
    pub por_prioridade: Vec<Contagem>,
    pub por_usuario: Vec<MetricaUsuario>,
}

fn horas(total_segundos: u64, quantidade: usize) -> f64 {
    if quantidade == 0 {
        return 0.0;
    }
    total_segundos as f64 / quantidade as f64 / 3600.0
}

/// Calcula as métricas sobre todos os chamados (arquivados incluídos)
pub fn calcular(
    chamados: &[Chamado],
    usuarios: &[Usuario],
    periodo: Periodo,
    agora: DateTime<Utc>,
) -> MetricasAnalytics {
    let filtrados: Vec<&Chamado> = chamados
        .iter()
        .filter(|c| periodo.contem(c.criado_em, agora))
        .collect();

    let aprovados_com_tempo: Vec<u64> = filtrados
        .iter()
        .filter(|c| c.status == StatusChamado::Aprovado)
        .map(|c| segundos_normalizados(c))
        .filter(|s| *s > 0)
        .collect();
    let media_tempo_resolucao_horas =
        horas(aprovados_com_tempo.iter().sum(), aprovados_com_tempo.len());

    let mut por_status: BTreeMap<StatusChamado, usize> = BTreeMap::new();
    let mut por_prioridade: BTreeMap<Prioridade, usize> = BTreeMap::new();
    for c in &filtrados {
        *por_status.entry(c.status).or_default() += 1;
        *por_prioridade.entry(c.prioridade).or_default() += 1;
    }

    let mut por_usuario: Vec<MetricaUsuario> = usuarios
        .iter()
        .map(|u| {
            let resolvidos: Vec<&&Chamado> = filtrados
                .iter()
                .filter(|c| c.status == StatusChamado::Aprovado && c.is_executor(&u.uid))
                .collect();
            let total: u64 = resolvidos.iter().map(|c| c.total_usuario(&u.uid)).sum();
            MetricaUsuario {
                uid: u.uid.clone(),
                nome: u.nome.clone(),
                chamados_resolvidos: resolvidos.len(),
                media_tempo_gasto_horas: horas(total, resolvidos.len()),
            }
        })
        .collect();
    por_usuario.sort_by(|a, b| b.chamados_resolvidos.cmp(&a.chamados_resolvidos));

    MetricasAnalytics {
        periodo,
        total_chamados: filtrados.len(),
        media_tempo_resolucao_horas,
        por_status: por_status
            .into_iter()
            .map(|(s, valor)| Contagem {
                nome: s.to_string(),
                valor,
            })
            .collect(),
        por_prioridade: por_prioridade
            .into_iter()
            .map(|(p, valor)| Contagem {
                nome: p.to_string(),
                valor,
            })
            .collect(),
        por_usuario,
    }
}
