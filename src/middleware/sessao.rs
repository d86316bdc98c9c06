//! Autenticação das rotas por token de sessão
//!
//! `exigir_sessao` aceita qualquer situação de acesso (usado em `/auth/me` e
//! `/auth/logout`); `exigir_acesso_aprovado` bloqueia perfis pendentes ou
//! rejeitados.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chamados::{Acesso, Usuario};
use serde_json::json;
use std::sync::Arc;

use crate::utils::logging::*;
use crate::utils::AppError;
use crate::AppState;

/// Rota para onde o cliente deve levar usuários ainda não aprovados
pub const ROTA_AGUARDANDO_APROVACAO: &str = "/aguardando-aprovacao";

/// Perfil do usuário da requisição
#[derive(Debug, Clone)]
pub struct UsuarioAutenticado(pub Usuario);

/// Token da requisição (para logout)
#[derive(Debug, Clone)]
pub struct TokenSessao(pub String);

fn extrair_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn resolver_usuario(state: &AppState, headers: &HeaderMap) -> Result<(String, Usuario), AppError> {
    let token = extrair_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Token de sessão ausente".to_string()))?;
    let uid = state.autenticacao.validar(token).await?;
    let usuario = state
        .usuarios
        .obter(&uid)
        .await?
        .ok_or_else(|| AppError::PermissionError("Usuário sem perfil cadastrado".to_string()))?;
    Ok((token.to_string(), usuario))
}

pub async fn exigir_sessao(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let (token, usuario) = resolver_usuario(&state, request.headers())
        .await
        .map_err(IntoResponse::into_response)?;

    request.extensions_mut().insert(TokenSessao(token));
    request.extensions_mut().insert(UsuarioAutenticado(usuario));
    Ok(next.run(request).await)
}

pub async fn exigir_acesso_aprovado(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let (token, usuario) = resolver_usuario(&state, request.headers())
        .await
        .map_err(IntoResponse::into_response)?;

    match usuario.acesso {
        Acesso::Aprovado => {
            request.extensions_mut().insert(TokenSessao(token));
            request.extensions_mut().insert(UsuarioAutenticado(usuario));
            Ok(next.run(request).await)
        }
        Acesso::Pendente => {
            log_acesso_negado(&usuario.uid, "cadastro aguardando aprovação");
            Err(aguardando_aprovacao_response())
        }
        Acesso::Rejeitado => {
            log_acesso_negado(&usuario.uid, "cadastro rejeitado");
            Err(AppError::PermissionError("Acesso negado".to_string()).into_response())
        }
    }
}

/// 403 com o redirecionamento para a tela de espera
fn aguardando_aprovacao_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "Seu cadastro está aguardando aprovação de um gestor",
            "status": 403,
            "redirect": ROTA_AGUARDANDO_APROVACAO
        })),
    )
        .into_response()
}
