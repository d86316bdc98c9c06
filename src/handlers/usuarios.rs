//! Fila de aprovação de cadastros e lista de responsáveis atribuíveis

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use chamados::{Acesso, Usuario};
use serde::Deserialize;
use std::sync::Arc;

use super::exigir_gestor;
use crate::middleware::UsuarioAutenticado;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DecisaoBody {
    pub acesso: Acesso,
}

pub async fn listar_aprovacoes(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
) -> AppResult<Json<Vec<Usuario>>> {
    exigir_gestor(&usuario)?;
    Ok(Json(state.usuarios.listar_pendentes().await?))
}

/// Aprova ou rejeita um cadastro pendente
pub async fn decidir_aprovacao(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
    Path(uid): Path<String>,
    Json(body): Json<DecisaoBody>,
) -> AppResult<Json<Usuario>> {
    exigir_gestor(&usuario)?;
    if body.acesso == Acesso::Pendente {
        return Err(AppError::ValidationError(
            "Decisão deve ser \"aprovado\" ou \"rejeitado\"".to_string(),
        ));
    }
    let atualizado = state.usuarios.atualizar_acesso(&uid, body.acesso).await?;
    log_acesso_atualizado(&uid, if atualizado.aprovado() { "aprovado" } else { "rejeitado" });
    Ok(Json(atualizado))
}

pub async fn listar_atribuiveis(
    State(state): State<Arc<AppState>>,
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
) -> AppResult<Json<Vec<Usuario>>> {
    exigir_gestor(&usuario)?;
    Ok(Json(state.usuarios.listar_atribuiveis().await?))
}
