// Handlers HTTP da API do TaskFlow
pub mod admin;
pub mod agenda;
pub mod analytics;
pub mod auth;
pub mod chamado;
pub mod health;
pub mod usuarios;

pub use admin::*;
pub use agenda::*;
pub use analytics::*;
pub use auth::*;
pub use chamado::*;
pub use health::*;
pub use usuarios::*;

use chamados::Usuario;

use crate::utils::{AppError, AppResult};

/// Rotas exclusivas de gestores
pub(crate) fn exigir_gestor(usuario: &Usuario) -> AppResult<()> {
    if usuario.is_gestor() {
        Ok(())
    } else {
        Err(AppError::PermissionError(
            "Apenas gestores podem acessar este recurso".to_string(),
        ))
    }
}
