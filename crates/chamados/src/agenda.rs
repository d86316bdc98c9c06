//! Agenda diária de tarefas
//!
//! Lista de tarefas por dia, independente dos chamados, com um cronômetro
//! simples por tarefa. Cada usuário tem no máximo um cronômetro de agenda
//! correndo: iniciar outro para o anterior.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ChamadoError, Result};
use crate::persistencia;
use crate::relogio::Relogio;
use crate::tempo::duracao_segundos;
use crate::types::Usuario;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaTarefa {
    pub id: String,
    pub titulo: String,
    pub criador_id: String,
    pub criador_nome: String,
    pub data: NaiveDate,
    #[serde(default)]
    pub concluida: bool,
    #[serde(default)]
    pub tempo_gasto_segundos: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_iniciado_em: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_iniciado_por: Option<String>,
    pub criado_em: DateTime<Utc>,
}

impl AgendaTarefa {
    pub fn timer_correndo(&self) -> bool {
        self.timer_iniciado_em.is_some()
    }

    fn iniciar_timer(&mut self, usuario_id: &str, em: DateTime<Utc>) {
        self.timer_iniciado_em = Some(em);
        self.timer_iniciado_por = Some(usuario_id.to_string());
    }

    fn parar_timer(&mut self, em: DateTime<Utc>) -> u64 {
        let Some(inicio) = self.timer_iniciado_em.take() else {
            return 0;
        };
        self.timer_iniciado_por = None;
        let duracao = duracao_segundos(inicio, em);
        self.tempo_gasto_segundos += duracao;
        duracao
    }
}

/// Alterações atômicas de uma tarefa
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtualizacaoTarefa {
    pub concluida: Option<bool>,
    pub parar_timer: Option<DateTime<Utc>>,
    pub iniciar_timer: Option<(String, DateTime<Utc>)>,
}

impl AtualizacaoTarefa {
    fn aplicar_em(&self, tarefa: &mut AgendaTarefa) {
        if let Some(em) = self.parar_timer {
            tarefa.parar_timer(em);
        }
        if let Some((usuario_id, em)) = &self.iniciar_timer {
            tarefa.iniciar_timer(usuario_id, *em);
        }
        if let Some(concluida) = self.concluida {
            tarefa.concluida = concluida;
        }
    }
}

#[async_trait]
pub trait AgendaRepository: Send + Sync {
    async fn inserir(&self, tarefa: AgendaTarefa) -> Result<()>;
    async fn obter(&self, id: &str) -> Result<AgendaTarefa>;
    async fn atualizar(&self, id: &str, atualizacao: AtualizacaoTarefa) -> Result<AgendaTarefa>;
    async fn remover(&self, id: &str) -> Result<()>;
    /// Tarefas com `data` dentro do mês, por data e criação
    async fn listar_mes(&self, ano: i32, mes: u32) -> Result<Vec<AgendaTarefa>>;
    /// Tarefas com cronômetro correndo iniciado pelo usuário
    async fn listar_timers_de(&self, usuario_id: &str) -> Result<Vec<AgendaTarefa>>;
}

pub struct MemoriaAgenda {
    tarefas: RwLock<HashMap<String, AgendaTarefa>>,
    arquivo: Option<PathBuf>,
}

impl Default for MemoriaAgenda {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoriaAgenda {
    pub fn new() -> Self {
        Self {
            tarefas: RwLock::new(HashMap::new()),
            arquivo: None,
        }
    }

    pub async fn abrir(caminho: impl Into<PathBuf>) -> Result<Self> {
        let caminho = caminho.into();
        let registros: Vec<AgendaTarefa> = persistencia::carregar(&caminho).await?;
        let mapa = registros.into_iter().map(|t| (t.id.clone(), t)).collect();
        Ok(Self {
            tarefas: RwLock::new(mapa),
            arquivo: Some(caminho),
        })
    }

    async fn persistir(&self, mapa: &HashMap<String, AgendaTarefa>) -> Result<()> {
        let Some(caminho) = &self.arquivo else {
            return Ok(());
        };
        let mut registros: Vec<&AgendaTarefa> = mapa.values().collect();
        registros.sort_by(|a, b| a.criado_em.cmp(&b.criado_em).then_with(|| a.id.cmp(&b.id)));
        persistencia::salvar(caminho, &registros).await
    }
}

fn nao_encontrada(id: &str) -> ChamadoError {
    ChamadoError::NaoEncontrado(format!("Tarefa {} não encontrada", id))
}

#[async_trait]
impl AgendaRepository for MemoriaAgenda {
    async fn inserir(&self, tarefa: AgendaTarefa) -> Result<()> {
        let mut mapa = self.tarefas.write().await;
        let id = tarefa.id.clone();
        mapa.insert(id.clone(), tarefa);
        if let Err(e) = self.persistir(&mapa).await {
            mapa.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    async fn obter(&self, id: &str) -> Result<AgendaTarefa> {
        self.tarefas
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| nao_encontrada(id))
    }

    async fn atualizar(&self, id: &str, atualizacao: AtualizacaoTarefa) -> Result<AgendaTarefa> {
        let mut mapa = self.tarefas.write().await;
        let antes = mapa.get(id).cloned().ok_or_else(|| nao_encontrada(id))?;

        let mut depois = antes.clone();
        atualizacao.aplicar_em(&mut depois);
        mapa.insert(id.to_string(), depois.clone());
        if let Err(e) = self.persistir(&mapa).await {
            mapa.insert(id.to_string(), antes);
            return Err(e);
        }
        Ok(depois)
    }

    async fn remover(&self, id: &str) -> Result<()> {
        let mut mapa = self.tarefas.write().await;
        let antes = mapa.remove(id).ok_or_else(|| nao_encontrada(id))?;
        if let Err(e) = self.persistir(&mapa).await {
            mapa.insert(id.to_string(), antes);
            return Err(e);
        }
        Ok(())
    }

    async fn listar_mes(&self, ano: i32, mes: u32) -> Result<Vec<AgendaTarefa>> {
        let mapa = self.tarefas.read().await;
        let mut tarefas: Vec<AgendaTarefa> = mapa
            .values()
            .filter(|t| t.data.year() == ano && t.data.month() == mes)
            .cloned()
            .collect();
        tarefas.sort_by(|a, b| a.data.cmp(&b.data).then_with(|| a.criado_em.cmp(&b.criado_em)));
        Ok(tarefas)
    }

    async fn listar_timers_de(&self, usuario_id: &str) -> Result<Vec<AgendaTarefa>> {
        let mapa = self.tarefas.read().await;
        Ok(mapa
            .values()
            .filter(|t| t.timer_correndo() && t.timer_iniciado_por.as_deref() == Some(usuario_id))
            .cloned()
            .collect())
    }
}

/// Converte `YYYY-MM` em (ano, mês)
pub fn parse_mes(mes: &str) -> Result<(i32, u32)> {
    let invalido = || ChamadoError::Validacao(format!("Mês inválido: '{}' (use AAAA-MM)", mes));
    let (ano, numero) = mes.trim().split_once('-').ok_or_else(invalido)?;
    let ano: i32 = ano.parse().map_err(|_| invalido())?;
    let numero: u32 = numero.parse().map_err(|_| invalido())?;
    if !(1..=12).contains(&numero) {
        return Err(invalido());
    }
    Ok((ano, numero))
}

/// Gestor ou criador da tarefa
pub fn pode_modificar(usuario: &Usuario, tarefa: &AgendaTarefa) -> bool {
    usuario.is_gestor() || tarefa.criador_id == usuario.uid
}

fn verificar_modificar(usuario: &Usuario, tarefa: &AgendaTarefa) -> Result<()> {
    if !pode_modificar(usuario, tarefa) {
        return Err(ChamadoError::Permissao(
            "Apenas o criador da tarefa ou um gestor pode alterá-la".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ServicoAgenda {
    repositorio: Arc<dyn AgendaRepository>,
    relogio: Arc<dyn Relogio>,
}

impl ServicoAgenda {
    pub fn new(repositorio: Arc<dyn AgendaRepository>, relogio: Arc<dyn Relogio>) -> Self {
        Self {
            repositorio,
            relogio,
        }
    }

    pub async fn criar(&self, ator: &Usuario, titulo: &str, data: NaiveDate) -> Result<AgendaTarefa> {
        if titulo.trim().is_empty() {
            return Err(ChamadoError::Validacao("Informe o título da tarefa".to_string()));
        }
        let tarefa = AgendaTarefa {
            id: Uuid::new_v4().to_string(),
            titulo: titulo.trim().to_string(),
            criador_id: ator.uid.clone(),
            criador_nome: ator.nome.clone(),
            data,
            concluida: false,
            tempo_gasto_segundos: 0,
            timer_iniciado_em: None,
            timer_iniciado_por: None,
            criado_em: self.relogio.agora(),
        };
        self.repositorio.inserir(tarefa.clone()).await?;
        tracing::info!("📅 Tarefa de agenda criada: {} em {}", tarefa.id, tarefa.data);
        Ok(tarefa)
    }

    pub async fn listar_mes(&self, mes: &str) -> Result<Vec<AgendaTarefa>> {
        let (ano, numero) = parse_mes(mes)?;
        self.repositorio.listar_mes(ano, numero).await
    }

    /// Marca/desmarca como concluída; concluir com o cronômetro correndo o para
    pub async fn alternar_concluida(&self, id: &str, ator: &Usuario) -> Result<AgendaTarefa> {
        let tarefa = self.repositorio.obter(id).await?;
        verificar_modificar(ator, &tarefa)?;

        let mut atualizacao = AtualizacaoTarefa {
            concluida: Some(!tarefa.concluida),
            ..Default::default()
        };
        if tarefa.timer_correndo() {
            atualizacao.parar_timer = Some(self.relogio.agora());
        }
        self.repositorio.atualizar(id, atualizacao).await
    }

    pub async fn alternar_timer(&self, id: &str, ator: &Usuario) -> Result<AgendaTarefa> {
        let tarefa = self.repositorio.obter(id).await?;
        verificar_modificar(ator, &tarefa)?;
        let agora = self.relogio.agora();

        if tarefa.timer_correndo() {
            let tarefa = self
                .repositorio
                .atualizar(
                    id,
                    AtualizacaoTarefa {
                        parar_timer: Some(agora),
                        ..Default::default()
                    },
                )
                .await?;
            tracing::info!("⏱️ Cronômetro da tarefa {} parado ({}s)", id, tarefa.tempo_gasto_segundos);
            return Ok(tarefa);
        }

        if tarefa.concluida {
            return Err(ChamadoError::Validacao(
                "Tarefa concluída não pode ter o cronômetro iniciado".to_string(),
            ));
        }

        for outra in self.repositorio.listar_timers_de(&ator.uid).await? {
            self.repositorio
                .atualizar(
                    &outra.id,
                    AtualizacaoTarefa {
                        parar_timer: Some(agora),
                        ..Default::default()
                    },
                )
                .await?;
        }

        self.repositorio
            .atualizar(
                id,
                AtualizacaoTarefa {
                    iniciar_timer: Some((ator.uid.clone(), agora)),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn remover(&self, id: &str, ator: &Usuario) -> Result<()> {
        let tarefa = self.repositorio.obter(id).await?;
        verificar_modificar(ator, &tarefa)?;
        self.repositorio.remover(id).await?;
        tracing::info!("🗑️ Tarefa de agenda removida: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relogio::RelogioManual;
    use crate::types::{Acesso, Perfil};
    use chrono::TimeZone;

    fn usuario(uid: &str, perfil: Perfil) -> Usuario {
        Usuario {
            uid: uid.to_string(),
            nome: uid.to_string(),
            email: format!("{}@x.com", uid),
            perfil,
            acesso: Acesso::Aprovado,
            discord_id: None,
        }
    }

    fn servico() -> (ServicoAgenda, Arc<RelogioManual>) {
        let relogio = Arc::new(RelogioManual::new(
            Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap(),
        ));
        let servico = ServicoAgenda::new(Arc::new(MemoriaAgenda::new()), relogio.clone());
        (servico, relogio)
    }

    fn dia(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_parse_mes() {
        assert_eq!(parse_mes("2025-06").unwrap(), (2025, 6));
        assert!(parse_mes("2025-13").is_err());
        assert!(parse_mes("junho").is_err());
    }

    #[tokio::test]
    async fn test_criar_e_listar_mes() {
        let (servico, _) = servico();
        let ana = usuario("ana", Perfil::Executor);
        servico.criar(&ana, "Backup", dia(10)).await.unwrap();
        servico.criar(&ana, "Inventário", dia(3)).await.unwrap();
        servico
            .criar(&ana, "Outro mês", NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
            .await
            .unwrap();

        let junho = servico.listar_mes("2025-06").await.unwrap();
        assert_eq!(junho.len(), 2);
        assert_eq!(junho[0].titulo, "Inventário");
        assert_eq!(junho[0].criador_nome, "ana");

        assert!(matches!(
            servico.criar(&ana, " ", dia(1)).await,
            Err(ChamadoError::Validacao(_))
        ));
    }

    #[tokio::test]
    async fn test_timer_e_concluir() {
        let (servico, relogio) = servico();
        let ana = usuario("ana", Perfil::Executor);
        let tarefa = servico.criar(&ana, "Backup", dia(2)).await.unwrap();

        let t = servico.alternar_timer(&tarefa.id, &ana).await.unwrap();
        assert!(t.timer_correndo());
        relogio.avancar(90);

        let t = servico.alternar_concluida(&tarefa.id, &ana).await.unwrap();
        assert!(t.concluida);
        assert!(!t.timer_correndo());
        assert_eq!(t.tempo_gasto_segundos, 90);

        assert!(servico.alternar_timer(&tarefa.id, &ana).await.is_err());
    }

    #[tokio::test]
    async fn test_iniciar_outro_timer_para_o_anterior() {
        let (servico, relogio) = servico();
        let ana = usuario("ana", Perfil::Executor);
        let a = servico.criar(&ana, "A", dia(2)).await.unwrap();
        let b = servico.criar(&ana, "B", dia(2)).await.unwrap();

        servico.alternar_timer(&a.id, &ana).await.unwrap();
        relogio.avancar(60);
        servico.alternar_timer(&b.id, &ana).await.unwrap();

        let tarefas = servico.listar_mes("2025-06").await.unwrap();
        let a = tarefas.iter().find(|t| t.titulo == "A").unwrap();
        let b = tarefas.iter().find(|t| t.titulo == "B").unwrap();
        assert!(!a.timer_correndo());
        assert_eq!(a.tempo_gasto_segundos, 60);
        assert!(b.timer_correndo());
    }

    #[tokio::test]
    async fn test_permissao_criador_ou_gestor() {
        let (servico, _) = servico();
        let ana = usuario("ana", Perfil::Executor);
        let bruno = usuario("bruno", Perfil::Executor);
        let gina = usuario("gina", Perfil::Gestor);
        let tarefa = servico.criar(&ana, "Backup", dia(2)).await.unwrap();

        assert!(matches!(
            servico.remover(&tarefa.id, &bruno).await,
            Err(ChamadoError::Permissao(_))
        ));
        assert!(servico.alternar_concluida(&tarefa.id, &gina).await.is_ok());
        servico.remover(&tarefa.id, &ana).await.unwrap();
        assert!(servico.listar_mes("2025-06").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistencia_agenda() {
        let dir = tempfile::tempdir().unwrap();
        let caminho = dir.path().join("agenda.json");
        let relogio: Arc<dyn Relogio> = Arc::new(RelogioManual::new(Utc::now()));
        let ana = usuario("ana", Perfil::Executor);

        {
            let repo = Arc::new(MemoriaAgenda::abrir(&caminho).await.unwrap());
            let servico = ServicoAgenda::new(repo, relogio.clone());
            servico.criar(&ana, "Persistida", dia(5)).await.unwrap();
        }

        let repo = MemoriaAgenda::abrir(&caminho).await.unwrap();
        let tarefas = repo.listar_mes(2025, 6).await.unwrap();
        assert_eq!(tarefas.len(), 1);
        assert_eq!(tarefas[0].titulo, "Persistida");
    }
}
