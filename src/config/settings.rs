use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};

/// Canal geral padrão das notificações
pub const CANAL_GERAL_PADRAO: &str = "1413886639033548872";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub discord: DiscordSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub armazenamento: ArmazenamentoSettings,
    #[serde(default)]
    pub admin: AdminSettings,
    /// Gestor criado na inicialização (o cadastro público não cria gestores)
    #[serde(default)]
    pub bootstrap: Option<BootstrapSettings>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiscordSettings {
    /// Sem token a ponte de notificações fica desativada
    #[serde(default)]
    pub token: Option<String>,
    pub canal_geral_id: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthSettings {
    pub sessao_ttl_horas: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ArmazenamentoSettings {
    /// Diretório dos snapshots JSON; ausente = somente memória
    #[serde(default)]
    pub diretorio_dados: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AdminSettings {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BootstrapSettings {
    pub gestor_nome: String,
    pub gestor_email: String,
    pub gestor_senha: String,
}

impl DiscordSettings {
    /// Token configurado e não vazio
    pub fn token_configurado(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::carregar("config", &run_mode)
    }

    /// Carrega `{dir}/default`, `{dir}/{run_mode}` e as variáveis de ambiente
    pub fn carregar(dir: &str, run_mode: &str) -> Result<Self, ConfigError> {
        let mut builder = Self::padroes()?
            // Arquivo de configuração base
            .add_source(File::with_name(&format!("{}/default", dir)).required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            .add_source(Environment::with_prefix("TASKFLOW").separator("__"));

        // Variáveis de ambiente específicas
        if let Ok(token) = std::env::var("DISCORD_TOKEN") {
            builder = builder.set_override("discord.token", token)?;
        }
        if let Ok(canal) = std::env::var("DISCORD_CHANNEL_ID") {
            builder = builder.set_override("discord.canal_geral_id", canal)?;
        }
        if let Ok(chave) = std::env::var("ADMIN_API_KEY") {
            builder = builder.set_override("admin.api_key", chave)?;
        }

        builder.build()?.try_deserialize()
    }

    fn padroes() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("discord.canal_geral_id", CANAL_GERAL_PADRAO)?
            .set_default("auth.sessao_ttl_horas", 24)
    }
}
