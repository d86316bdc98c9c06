//! Status e prioridade de chamados
//!
//! Os nomes serializados são os mesmos exibidos na interface:
//! - "Aberto", "Em Andamento", "Pausado", "Resolvido", "Aprovado"
//! - "Recusado" é transitório: a recusa devolve o chamado para "Em Andamento"
//!   e nunca é gravada como status de repouso.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status de um chamado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusChamado {
    #[serde(rename = "Aberto")]
    Aberto,
    #[serde(rename = "Em Andamento")]
    EmAndamento,
    #[serde(rename = "Pausado")]
    Pausado,
    #[serde(rename = "Resolvido")]
    Resolvido,
    #[serde(rename = "Aprovado")]
    Aprovado,
    #[serde(rename = "Recusado")]
    Recusado,
}

impl StatusChamado {
    /// Nome exibido/serializado
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusChamado::Aberto => "Aberto",
            StatusChamado::EmAndamento => "Em Andamento",
            StatusChamado::Pausado => "Pausado",
            StatusChamado::Resolvido => "Resolvido",
            StatusChamado::Aprovado => "Aprovado",
            StatusChamado::Recusado => "Recusado",
        }
    }

    /// Status em que ainda há trabalho a fazer (cronômetros podem correr)
    pub fn em_trabalho(&self) -> bool {
        matches!(
            self,
            StatusChamado::Aberto | StatusChamado::EmAndamento | StatusChamado::Pausado
        )
    }
}

impl std::fmt::Display for StatusChamado {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusChamado {
    type Err = String;

    /// Aceita o nome exibido e variantes sem acento/espaço usadas em query strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "aberto" => Ok(StatusChamado::Aberto),
            "em andamento" | "emandamento" => Ok(StatusChamado::EmAndamento),
            "pausado" => Ok(StatusChamado::Pausado),
            "resolvido" => Ok(StatusChamado::Resolvido),
            "aprovado" => Ok(StatusChamado::Aprovado),
            "recusado" => Ok(StatusChamado::Recusado),
            other => Err(format!("status desconhecido: {}", other)),
        }
    }
}

/// Prioridade do chamado (imutável após a criação)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prioridade {
    #[serde(rename = "Baixa")]
    Baixa,
    #[serde(rename = "Média", alias = "Media")]
    Media,
    #[serde(rename = "Alta")]
    Alta,
}

impl Prioridade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prioridade::Baixa => "Baixa",
            Prioridade::Media => "Média",
            Prioridade::Alta => "Alta",
        }
    }
}

impl std::fmt::Display for Prioridade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
