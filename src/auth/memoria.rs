//! Provedor de autenticação em memória
//!
//! Senhas guardadas como hash Argon2 (formato PHC, com sal embutido); sessões
//! são tokens UUID com validade configurável. Sessões vencidas são descartadas
//! sempre que uma nova é aberta.

use async_trait::async_trait;
use chamados::{persistencia, Acesso, Perfil, Relogio, Usuario};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use super::provedor::{DadosCadastro, EventoSessao, ProvedorAutenticacao, Sessao};
use super::usuarios::UsuarioRepository;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

const TAMANHO_MINIMO_SENHA: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Conta {
    email: String,
    uid: String,
    /// Hash Argon2 no formato PHC
    hash: String,
}

#[derive(Debug, Clone)]
struct SessaoAtiva {
    uid: String,
    expira_em: DateTime<Utc>,
}

fn hash_senha(senha: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};
    let sal = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(senha.as_bytes(), &sal)?;
    Ok(hash.to_string())
}

fn verificar_senha(senha: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(senha.as_bytes(), &parsed)
        .is_ok()
}

fn normalizar_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AutenticacaoMemoria {
    contas: RwLock<HashMap<String, Conta>>,
    sessoes: RwLock<HashMap<String, SessaoAtiva>>,
    usuarios: Arc<dyn UsuarioRepository>,
    relogio: Arc<dyn Relogio>,
    ttl: Duration,
    eventos: broadcast::Sender<EventoSessao>,
    arquivo: Option<PathBuf>,
}

impl AutenticacaoMemoria {
    pub fn new(usuarios: Arc<dyn UsuarioRepository>, relogio: Arc<dyn Relogio>, ttl_horas: i64) -> Self {
        let (eventos, _) = broadcast::channel(64);
        Self {
            contas: RwLock::new(HashMap::new()),
            sessoes: RwLock::new(HashMap::new()),
            usuarios,
            relogio,
            ttl: Duration::hours(ttl_horas.max(1)),
            eventos,
            arquivo: None,
        }
    }

    /// Carrega as credenciais salvas em `caminho` e passa a gravá-las lá
    pub async fn abrir(
        usuarios: Arc<dyn UsuarioRepository>,
        relogio: Arc<dyn Relogio>,
        ttl_horas: i64,
        caminho: impl Into<PathBuf>,
    ) -> AppResult<Self> {
        let caminho = caminho.into();
        let contas: Vec<Conta> = persistencia::carregar(&caminho).await?;
        let mut provedor = Self::new(usuarios, relogio, ttl_horas);
        provedor.contas = RwLock::new(contas.into_iter().map(|c| (c.email.clone(), c)).collect());
        provedor.arquivo = Some(caminho);
        Ok(provedor)
    }

    async fn persistir(&self, contas: &HashMap<String, Conta>) -> AppResult<()> {
        let Some(caminho) = &self.arquivo else {
            return Ok(());
        };
        let mut registros: Vec<&Conta> = contas.values().collect();
        registros.sort_by(|a, b| a.email.cmp(&b.email));
        persistencia::salvar(caminho, &registros).await?;
        Ok(())
    }

    /// Cria (uma vez) a conta do gestor inicial, já aprovada
    pub async fn registrar_gestor(&self, nome: &str, email: &str, senha: &str) -> AppResult<String> {
        let email = normalizar_email(email);
        if let Some(conta) = self.contas.read().await.get(&email) {
            return Ok(conta.uid.clone());
        }
        let uid = self.criar_conta(&email, senha).await?;
        self.usuarios
            .criar(Usuario {
                uid: uid.clone(),
                nome: nome.trim().to_string(),
                email,
                perfil: Perfil::Gestor,
                acesso: Acesso::Aprovado,
                discord_id: None,
            })
            .await?;
        log_info(&format!("👑 Gestor inicial registrado: {}", nome));
        Ok(uid)
    }

    async fn criar_conta(&self, email: &str, senha: &str) -> AppResult<String> {
        let mut contas = self.contas.write().await;
        if contas.contains_key(email) {
            return Err(AppError::Conflict("E-mail já cadastrado".to_string()));
        }
        let hash = hash_senha(senha)
            .map_err(|e| AppError::InternalError(format!("Falha ao gerar hash da senha: {}", e)))?;
        let uid = uuid::Uuid::new_v4().to_string();
        contas.insert(
            email.to_string(),
            Conta {
                email: email.to_string(),
                uid: uid.clone(),
                hash,
            },
        );
        if let Err(e) = self.persistir(&contas).await {
            contas.remove(email);
            return Err(e);
        }
        Ok(uid)
    }

    async fn abrir_sessao(&self, uid: &str) -> Sessao {
        let token = uuid::Uuid::new_v4().to_string();
        let agora = self.relogio.agora();
        let expira_em = agora + self.ttl;
        {
            let mut sessoes = self.sessoes.write().await;
            let antes = sessoes.len();
            sessoes.retain(|_, s| s.expira_em > agora);
            if sessoes.len() < antes {
                tracing::debug!("🧹 {} sessões vencidas descartadas", antes - sessoes.len());
            }
            sessoes.insert(
                token.clone(),
                SessaoAtiva {
                    uid: uid.to_string(),
                    expira_em,
                },
            );
        }
        let _ = self.eventos.send(EventoSessao::Entrou {
            uid: uid.to_string(),
        });
        log_sessao_iniciada(uid);
        Sessao {
            token,
            uid: uid.to_string(),
            expira_em,
        }
    }
}

fn validar_cadastro(email: &str, senha: &str, dados: &DadosCadastro) -> AppResult<Perfil> {
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError("E-mail inválido".to_string()));
    }
    if let Some(confirmacao) = &dados.confirmar_senha {
        if confirmacao != senha {
            return Err(AppError::ValidationError("As senhas não coincidem".to_string()));
        }
    }
    if senha.chars().count() < TAMANHO_MINIMO_SENHA {
        return Err(AppError::ValidationError(
            "A senha deve ter pelo menos 6 caracteres".to_string(),
        ));
    }
    if dados.nome.trim().is_empty() {
        return Err(AppError::ValidationError("Informe o nome".to_string()));
    }
    match dados.perfil {
        None => Err(AppError::ValidationError("Selecione um perfil".to_string())),
        Some(Perfil::Gestor) => Err(AppError::PermissionError(
            "A criação de contas de Gestor é restrita. Entre em contato com o administrador."
                .to_string(),
        )),
        Some(perfil) => Ok(perfil),
    }
}

#[async_trait]
impl ProvedorAutenticacao for AutenticacaoMemoria {
    async fn entrar(&self, email: &str, senha: &str) -> AppResult<Sessao> {
        let email = normalizar_email(email);
        let uid = {
            let contas = self.contas.read().await;
            match contas.get(&email) {
                Some(conta) if verificar_senha(senha, &conta.hash) => conta.uid.clone(),
                _ => {
                    log_warning(&format!("Tentativa de login inválida para {}", email));
                    return Err(AppError::Unauthorized("Credenciais inválidas".to_string()));
                }
            }
        };
        Ok(self.abrir_sessao(&uid).await)
    }

    async fn cadastrar(&self, email: &str, senha: &str, dados: DadosCadastro) -> AppResult<Sessao> {
        let email = normalizar_email(email);
        let perfil = validar_cadastro(&email, senha, &dados).map_err(|e| {
            log_validation_error("cadastro", &e.to_string());
            e
        })?;

        let uid = self.criar_conta(&email, senha).await?;
        let perfil_usuario = Usuario {
            uid: uid.clone(),
            nome: dados.nome.trim().to_string(),
            email: email.clone(),
            perfil,
            acesso: Acesso::Pendente,
            discord_id: dados.discord_id.filter(|d| !d.trim().is_empty()),
        };
        if let Err(e) = self.usuarios.criar(perfil_usuario).await {
            let mut contas = self.contas.write().await;
            contas.remove(&email);
            if let Err(erro) = self.persistir(&contas).await {
                log_error(&format!("Falha ao desfazer conta {}: {}", email, erro));
            }
            return Err(e);
        }

        log_info(&format!("📝 Novo cadastro aguardando aprovação: {}", email));
        Ok(self.abrir_sessao(&uid).await)
    }

    async fn sair(&self, token: &str) -> AppResult<()> {
        if let Some(sessao) = self.sessoes.write().await.remove(token) {
            let _ = self.eventos.send(EventoSessao::Saiu { uid: sessao.uid });
        }
        Ok(())
    }

    async fn validar(&self, token: &str) -> AppResult<String> {
        let agora = self.relogio.agora();
        let mut sessoes = self.sessoes.write().await;
        match sessoes.get(token) {
            Some(sessao) if sessao.expira_em > agora => Ok(sessao.uid.clone()),
            Some(_) => {
                sessoes.remove(token);
                Err(AppError::Unauthorized("Sessão expirada".to_string()))
            }
            None => Err(AppError::Unauthorized("Sessão inválida".to_string())),
        }
    }

    fn observar(&self) -> broadcast::Receiver<EventoSessao> {
        self.eventos.subscribe()
    }
}
