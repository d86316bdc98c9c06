//! Perfis de usuário (coleção `usuarios`)

use async_trait::async_trait;
use chamados::{persistencia, Acesso, Perfil, Usuario};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::utils::normalization::comparar_nomes;
use crate::utils::{AppError, AppResult};

#[async_trait]
pub trait UsuarioRepository: Send + Sync {
    async fn obter(&self, uid: &str) -> AppResult<Option<Usuario>>;

    /// Falha com `Conflict` se o uid já existir
    async fn criar(&self, usuario: Usuario) -> AppResult<()>;

    async fn listar_pendentes(&self) -> AppResult<Vec<Usuario>>;

    async fn atualizar_acesso(&self, uid: &str, acesso: Acesso) -> AppResult<Usuario>;

    /// Executores e gestores, em ordem alfabética sem acentos
    async fn listar_atribuiveis(&self) -> AppResult<Vec<Usuario>>;

    async fn listar_todos(&self) -> AppResult<Vec<Usuario>>;
}

pub struct MemoriaUsuarios {
    usuarios: RwLock<HashMap<String, Usuario>>,
    arquivo: Option<PathBuf>,
}

impl Default for MemoriaUsuarios {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoriaUsuarios {
    pub fn new() -> Self {
        Self {
            usuarios: RwLock::new(HashMap::new()),
            arquivo: None,
        }
    }

    pub async fn abrir(caminho: impl Into<PathBuf>) -> AppResult<Self> {
        let caminho = caminho.into();
        let registros: Vec<Usuario> = persistencia::carregar(&caminho).await?;
        tracing::info!("👥 {} perfis carregados de {}", registros.len(), caminho.display());
        Ok(Self {
            usuarios: RwLock::new(registros.into_iter().map(|u| (u.uid.clone(), u)).collect()),
            arquivo: Some(caminho),
        })
    }

    async fn persistir(&self, mapa: &HashMap<String, Usuario>) -> AppResult<()> {
        let Some(caminho) = &self.arquivo else {
            return Ok(());
        };
        let mut registros: Vec<&Usuario> = mapa.values().collect();
        registros.sort_by(|a, b| a.uid.cmp(&b.uid));
        persistencia::salvar(caminho, &registros).await?;
        Ok(())
    }
}

fn ordenar_por_nome(mut usuarios: Vec<Usuario>) -> Vec<Usuario> {
    usuarios.sort_by(|a, b| comparar_nomes(&a.nome, &b.nome));
    usuarios
}

#[async_trait]
impl UsuarioRepository for MemoriaUsuarios {
    async fn obter(&self, uid: &str) -> AppResult<Option<Usuario>> {
        Ok(self.usuarios.read().await.get(uid).cloned())
    }

    async fn criar(&self, usuario: Usuario) -> AppResult<()> {
        let mut mapa = self.usuarios.write().await;
        if mapa.contains_key(&usuario.uid) {
            return Err(AppError::Conflict(format!("Usuário {} já existe", usuario.uid)));
        }
        mapa.insert(usuario.uid.clone(), usuario.clone());
        if let Err(e) = self.persistir(&mapa).await {
            mapa.remove(&usuario.uid);
            return Err(e);
        }
        Ok(())
    }

    async fn listar_pendentes(&self) -> AppResult<Vec<Usuario>> {
        let mapa = self.usuarios.read().await;
        Ok(ordenar_por_nome(
            mapa.values()
                .filter(|u| u.acesso == Acesso::Pendente)
                .cloned()
                .collect(),
        ))
    }

    async fn atualizar_acesso(&self, uid: &str, acesso: Acesso) -> AppResult<Usuario> {
        let mut mapa = self.usuarios.write().await;
        let anterior = mapa
            .get(uid)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Usuário {} não encontrado", uid)))?;

        let mut atualizado = anterior.clone();
        atualizado.acesso = acesso;
        mapa.insert(uid.to_string(), atualizado.clone());

        if let Err(e) = self.persistir(&mapa).await {
            mapa.insert(uid.to_string(), anterior);
            return Err(e);
        }
        Ok(atualizado)
    }

    async fn listar_atribuiveis(&self) -> AppResult<Vec<Usuario>> {
        let mapa = self.usuarios.read().await;
        Ok(ordenar_por_nome(
            mapa.values()
                .filter(|u| matches!(u.perfil, Perfil::Executor | Perfil::Gestor))
                .cloned()
                .collect(),
        ))
    }

    async fn listar_todos(&self) -> AppResult<Vec<Usuario>> {
        let mapa = self.usuarios.read().await;
        Ok(ordenar_por_nome(mapa.values().cloned().collect()))
    }
}

/// Diretório de nomes e IDs do Discord para a ponte de notificações
pub struct DiretorioPerfis {
    usuarios: Arc<dyn UsuarioRepository>,
}

impl DiretorioPerfis {
    pub fn new(usuarios: Arc<dyn UsuarioRepository>) -> Self {
        Self { usuarios }
    }

    async fn perfil(&self, uid: &str) -> Option<Usuario> {
        match self.usuarios.obter(uid).await {
            Ok(perfil) => perfil,
            Err(e) => {
                tracing::warn!("Falha ao buscar perfil {}: {}", uid, e);
                None
            }
        }
    }
}

#[async_trait]
impl mensageria::DiretorioUsuarios for DiretorioPerfis {
    async fn nome(&self, uid: &str) -> Option<String> {
        self.perfil(uid).await.map(|u| u.nome)
    }

    async fn discord_id(&self, uid: &str) -> Option<String> {
        self.perfil(uid).await.and_then(|u| u.discord_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mensageria::DiretorioUsuarios;

    fn usuario(uid: &str, nome: &str, perfil: Perfil, acesso: Acesso) -> Usuario {
        Usuario {
            uid: uid.to_string(),
            nome: nome.to_string(),
            email: format!("{}@example.com", uid),
            perfil,
            acesso,
            discord_id: None,
        }
    }

    #[tokio::test]
    async fn test_atribuiveis_ordenados_sem_acentos() {
        let repo = MemoriaUsuarios::new();
        repo.criar(usuario("1", "Érica", Perfil::Executor, Acesso::Aprovado)).await.unwrap();
        repo.criar(usuario("2", "Bruno", Perfil::Gestor, Acesso::Aprovado)).await.unwrap();
        repo.criar(usuario("3", "Eduardo", Perfil::Executor, Acesso::Pendente)).await.unwrap();

        let nomes: Vec<String> = repo
            .listar_atribuiveis()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.nome)
            .collect();
        assert_eq!(nomes, vec!["Bruno", "Eduardo", "Érica"]);
    }

    #[tokio::test]
    async fn test_fila_de_aprovacao() {
        let repo = MemoriaUsuarios::new();
        repo.criar(usuario("1", "Ana", Perfil::Executor, Acesso::Pendente)).await.unwrap();
        repo.criar(usuario("2", "Beto", Perfil::Executor, Acesso::Aprovado)).await.unwrap();

        assert_eq!(repo.listar_pendentes().await.unwrap().len(), 1);
        let ana = repo.atualizar_acesso("1", Acesso::Aprovado).await.unwrap();
        assert!(ana.aprovado());
        assert!(repo.listar_pendentes().await.unwrap().is_empty());

        assert!(matches!(
            repo.atualizar_acesso("x", Acesso::Rejeitado).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_uid_duplicado() {
        let repo = MemoriaUsuarios::new();
        repo.criar(usuario("1", "Ana", Perfil::Executor, Acesso::Pendente)).await.unwrap();
        assert!(matches!(
            repo.criar(usuario("1", "Outra", Perfil::Executor, Acesso::Pendente)).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_persistencia_entre_aberturas() {
        let dir = tempfile::tempdir().unwrap();
        let caminho = dir.path().join("usuarios.json");
        {
            let repo = MemoriaUsuarios::abrir(&caminho).await.unwrap();
            repo.criar(usuario("1", "Ana", Perfil::Executor, Acesso::Pendente)).await.unwrap();
        }
        let repo = MemoriaUsuarios::abrir(&caminho).await.unwrap();
        assert_eq!(repo.obter("1").await.unwrap().unwrap().nome, "Ana");
    }

    #[tokio::test]
    async fn test_diretorio_para_notificacoes() {
        let repo = Arc::new(MemoriaUsuarios::new());
        let mut ana = usuario("1", "Ana", Perfil::Executor, Acesso::Aprovado);
        ana.discord_id = Some("555".to_string());
        repo.criar(ana).await.unwrap();

        let diretorio = DiretorioPerfis::new(repo);
        assert_eq!(diretorio.nome("1").await.as_deref(), Some("Ana"));
        assert_eq!(diretorio.discord_id("1").await.as_deref(), Some("555"));
        assert!(diretorio.nome("x").await.is_none());
    }
}
