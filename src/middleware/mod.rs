/// Middleware layer para o Axum router
///
/// - Sessão (`Authorization: Bearer <token>`) e situação de acesso do perfil
/// - Chave administrativa para endpoints `/admin/*`

pub mod admin_auth;
pub mod sessao;

pub use admin_auth::require_admin_key;
pub use sessao::{exigir_acesso_aprovado, exigir_sessao, TokenSessao, UsuarioAutenticado};
