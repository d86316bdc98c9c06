//! Fonte de tempo injetável
//!
//! Todo carimbo de tempo (início/fim de cronômetro, histórico, criação) vem
//! de um `Relogio`, para que os testes possam avançar o tempo manualmente.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

pub trait Relogio: Send + Sync {
    fn agora(&self) -> DateTime<Utc>;
}

/// Relógio do sistema
#[derive(Debug, Clone, Copy, Default)]
pub struct RelogioSistema;

impl Relogio for RelogioSistema {
    fn agora(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Relógio controlado manualmente
#[derive(Debug)]
pub struct RelogioManual {
    atual: Mutex<DateTime<Utc>>,
}

impl RelogioManual {
    pub fn new(inicio: DateTime<Utc>) -> Self {
        Self {
            atual: Mutex::new(inicio),
        }
    }

    /// Avança (ou recua, com valor negativo) o relógio
    pub fn avancar(&self, segundos: i64) {
        let mut atual = self.atual.lock().unwrap_or_else(|e| e.into_inner());
        *atual += Duration::seconds(segundos);
    }

    pub fn definir(&self, instante: DateTime<Utc>) {
        let mut atual = self.atual.lock().unwrap_or_else(|e| e.into_inner());
        *atual = instante;
    }
}

impl Relogio for RelogioManual {
    fn agora(&self) -> DateTime<Utc> {
        *self.atual.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_relogio_manual_avanca() {
        let inicio = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let relogio = RelogioManual::new(inicio);
        relogio.avancar(3600);
        assert_eq!(relogio.agora(), inicio + Duration::hours(1));
        relogio.avancar(-7200);
        assert_eq!(relogio.agora(), inicio - Duration::hours(1));
    }
}
