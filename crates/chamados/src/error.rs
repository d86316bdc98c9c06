//! Tipos de erro para o crate chamados

use crate::types::StatusChamado;
use thiserror::Error;

/// Erros do núcleo de chamados
#[derive(Debug, Error)]
pub enum ChamadoError {
    /// Campo obrigatório ausente ou inválido (título, prioridade, prazo, notas, justificativa)
    #[error("Validation error: {0}")]
    Validacao(String),

    /// Perfil ou vínculo do usuário não permite a ação
    #[error("Permission denied: {0}")]
    Permissao(String),

    /// Chamado, usuário ou tarefa inexistente
    #[error("Resource not found: {0}")]
    NaoEncontrado(String),

    /// A ação não é permitida no status atual do chamado
    #[error("Invalid transition: cannot {acao} a ticket in status '{status}'")]
    TransicaoInvalida { acao: String, status: StatusChamado },

    /// Falha na camada de armazenamento
    #[error("Storage error: {0}")]
    Armazenamento(String),
}

impl From<serde_json::Error> for ChamadoError {
    fn from(err: serde_json::Error) -> Self {
        ChamadoError::Armazenamento(format!("JSON serialization failed: {}", err))
    }
}

impl From<std::io::Error> for ChamadoError {
    fn from(err: std::io::Error) -> Self {
        ChamadoError::Armazenamento(format!("I/O failed: {}", err))
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, ChamadoError>;
