//! # Identidade e perfis
//!
//! - `provedor.rs`: trait do provedor de autenticação (login, cadastro, sessão)
//! - `memoria.rs`: provedor em memória (senhas com hash, tokens de sessão)
//! - `usuarios.rs`: repositório de perfis e diretório para notificações

pub mod memoria;
pub mod provedor;
pub mod usuarios;

pub use memoria::AutenticacaoMemoria;
pub use provedor::{DadosCadastro, EventoSessao, ProvedorAutenticacao, Sessao};
pub use usuarios::{DiretorioPerfis, MemoriaUsuarios, UsuarioRepository};
