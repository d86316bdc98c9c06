use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::{DadosCadastro, Sessao};
use crate::middleware::sessao::ROTA_AGUARDANDO_APROVACAO;
use crate::middleware::{TokenSessao, UsuarioAutenticado};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub senha: String,
    #[serde(flatten)]
    pub dados: DadosCadastro,
}

async fn resposta_sessao(state: &AppState, sessao: Sessao) -> AppResult<Value> {
    let usuario = state
        .usuarios
        .obter(&sessao.uid)
        .await?
        .ok_or_else(|| AppError::PermissionError("Usuário sem perfil cadastrado".to_string()))?;
    let redirect = if usuario.aprovado() {
        "/dashboard"
    } else {
        ROTA_AGUARDANDO_APROVACAO
    };
    Ok(json!({
        "sessao": sessao,
        "usuario": usuario,
        "redirect": redirect
    }))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> AppResult<Json<Value>> {
    log_request_received("/auth/login", "POST");
    let sessao = state.autenticacao.entrar(&body.email, &body.senha).await?;
    Ok(Json(resposta_sessao(&state, sessao).await?))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    log_request_received("/auth/signup", "POST");
    let sessao = state
        .autenticacao
        .cadastrar(&body.email, &body.senha, body.dados)
        .await?;
    Ok((StatusCode::CREATED, Json(resposta_sessao(&state, sessao).await?)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(TokenSessao(token)): Extension<TokenSessao>,
) -> AppResult<Json<Value>> {
    state.autenticacao.sair(&token).await?;
    Ok(Json(json!({ "success": true })))
}

/// Perfil da sessão; cadastros pendentes recebem o aviso de espera
pub async fn me(
    Extension(UsuarioAutenticado(usuario)): Extension<UsuarioAutenticado>,
) -> Json<Value> {
    let aguardando = !usuario.aprovado();
    let mut resposta = json!({
        "usuario": usuario,
        "aguardandoAprovacao": aguardando
    });
    if aguardando {
        resposta["mensagem"] = json!(
            "Seu cadastro foi recebido e está aguardando a aprovação de um gestor."
        );
    }
    Json(resposta)
}

#[cfg(test)]
mod tests {
    use super::super::testes::Ambiente;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_cadastro_fica_pendente() {
        let amb = Ambiente::novo().await;
        let (status, body) = amb
            .chamar(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({
                    "email": "ana@example.com",
                    "senha": "123456",
                    "nome": "Ana",
                    "perfil": "Executor"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["usuario"]["acesso"], "pendente");
        assert_eq!(body["redirect"], "/aguardando-aprovacao");

        let token = body["sessao"]["token"].as_str().unwrap().to_string();
        let (status, me) = amb.chamar(Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["aguardandoAprovacao"], true);

        // rotas protegidas devolvem o redirecionamento
        let (status, body) = amb.chamar(Method::GET, "/chamados", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["redirect"], "/aguardando-aprovacao");
    }

    #[tokio::test]
    async fn test_cadastro_de_gestor_recusado() {
        let amb = Ambiente::novo().await;
        let (status, _) = amb
            .chamar(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({
                    "email": "chefe@example.com",
                    "senha": "123456",
                    "nome": "Chefe",
                    "perfil": "Gestor"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_logout() {
        let amb = Ambiente::novo().await;
        let (status, _) = amb
            .chamar(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({"email": "gina@example.com", "senha": "errada"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = amb
            .chamar(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({"email": "gina@example.com", "senha": "segredo"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirect"], "/dashboard");
        let token = body["sessao"]["token"].as_str().unwrap().to_string();

        let (status, _) = amb.chamar(Method::POST, "/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = amb.chamar(Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sem_token() {
        let amb = Ambiente::novo().await;
        let (status, body) = amb.chamar(Method::GET, "/chamados", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
    }
}
