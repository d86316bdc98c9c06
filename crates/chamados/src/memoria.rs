//! Repositório de chamados em memória
//!
//! Um único `RwLock` protege o mapa de chamados: cada mutação clona o registro,
//! aplica a atualização, grava o snapshot (se configurado) e só então publica.
//! Se a gravação falhar o registro anterior é restaurado e nenhum evento sai.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch, RwLock};
use uuid::Uuid;

use crate::error::{ChamadoError, Result};
use crate::persistencia;
use crate::relogio::Relogio;
use crate::repositorio::{
    Assinatura, AtualizacaoChamado, ChamadoRepository, EventoChamado, FiltroChamados,
};
use crate::types::{Chamado, EntradaHistorico, NovoChamado, StatusChamado};

const CAPACIDADE_EVENTOS: usize = 256;

struct Assinante {
    filtro: FiltroChamados,
    emissor: watch::Sender<Vec<Chamado>>,
}

pub struct MemoriaChamados {
    chamados: RwLock<HashMap<String, Chamado>>,
    assinantes: Mutex<Vec<Assinante>>,
    eventos: broadcast::Sender<EventoChamado>,
    relogio: Arc<dyn Relogio>,
    arquivo: Option<PathBuf>,
}

impl MemoriaChamados {
    pub fn new(relogio: Arc<dyn Relogio>) -> Self {
        let (eventos, _) = broadcast::channel(CAPACIDADE_EVENTOS);
        Self {
            chamados: RwLock::new(HashMap::new()),
            assinantes: Mutex::new(Vec::new()),
            eventos,
            relogio,
            arquivo: None,
        }
    }

    /// Grava um snapshot em `caminho` após cada mutação (sem carregar)
    pub fn com_persistencia(mut self, caminho: impl Into<PathBuf>) -> Self {
        self.arquivo = Some(caminho.into());
        self
    }

    /// Abre o repositório carregando o snapshot existente
    pub async fn abrir(relogio: Arc<dyn Relogio>, caminho: impl Into<PathBuf>) -> Result<Self> {
        let caminho = caminho.into();
        let registros: Vec<Chamado> = persistencia::carregar(&caminho).await?;

        let repo = Self::new(relogio).com_persistencia(caminho);
        {
            let mut mapa = repo.chamados.write().await;
            for chamado in registros {
                mapa.insert(chamado.id.clone(), chamado);
            }
        }
        Ok(repo)
    }

    async fn persistir(&self, mapa: &HashMap<String, Chamado>) -> Result<()> {
        let Some(caminho) = &self.arquivo else {
            return Ok(());
        };
        let mut registros: Vec<&Chamado> = mapa.values().collect();
        registros.sort_by(|a, b| a.criado_em.cmp(&b.criado_em).then_with(|| a.id.cmp(&b.id)));
        persistencia::salvar(caminho, &registros).await
    }

    /// Reenvia o conjunto filtrado a cada assinante cujo resultado mudou
    fn notificar_assinantes(&self, mapa: &HashMap<String, Chamado>) {
        let mut assinantes = self.assinantes.lock().unwrap_or_else(|e| e.into_inner());
        assinantes.retain(|a| !a.emissor.is_closed());

        for assinante in assinantes.iter() {
            let novo = assinante.filtro.selecionar(mapa.values());
            assinante.emissor.send_if_modified(|atual| {
                if *atual != novo {
                    *atual = novo;
                    true
                } else {
                    false
                }
            });
        }
    }

    fn publicar(&self, evento: EventoChamado) {
        // Sem receptores ativos o envio falha, o que é esperado
        let _ = self.eventos.send(evento);
    }
}

#[async_trait]
impl ChamadoRepository for MemoriaChamados {
    async fn criar(&self, novo: NovoChamado) -> Result<String> {
        let valido = novo.validar()?;
        let agora = self.relogio.agora();
        let id = Uuid::new_v4().to_string();

        let chamado = Chamado {
            id: id.clone(),
            titulo: valido.titulo,
            descricao: valido.descricao,
            prioridade: valido.prioridade,
            prazo: valido.prazo,
            status: StatusChamado::Aberto,
            solicitante_id: valido.solicitante_id.clone(),
            executor_ids: Vec::new(),
            time_tracking: Default::default(),
            tempo_gasto: 0,
            tempo_gasto_horas_legado: None,
            arquivado: false,
            comentarios: Vec::new(),
            historico: vec![EntradaHistorico {
                autor: valido.solicitante_id,
                acao: "Criado".to_string(),
                timestamp: agora,
                detalhes: Some("Chamado criado".to_string()),
            }],
            notas_resolucao: None,
            justificativa_gestor: None,
            recusado_anteriormente: false,
            criado_em: agora,
            resolvido_em: None,
        };

        let mut mapa = self.chamados.write().await;
        mapa.insert(id.clone(), chamado.clone());
        if let Err(e) = self.persistir(&mapa).await {
            mapa.remove(&id);
            tracing::error!("❌ Falha ao gravar chamado {}: {}", id, e);
            return Err(e);
        }

        self.notificar_assinantes(&mapa);
        drop(mapa);

        tracing::info!("🆕 Chamado criado: {} '{}'", id, chamado.titulo);
        self.publicar(EventoChamado::Criado { depois: chamado });
        Ok(id)
    }

    async fn aplicar_atualizacao(
        &self,
        id: &str,
        atualizacao: AtualizacaoChamado,
        ator_id: &str,
        acao: &str,
    ) -> Result<Chamado> {
        let mut mapa = self.chamados.write().await;
        let antes = mapa
            .get(id)
            .cloned()
            .ok_or_else(|| ChamadoError::NaoEncontrado(format!("Chamado {} não encontrado", id)))?;

        if let Err(e) = atualizacao.verificar_guarda(&antes) {
            tracing::warn!("Atualização do chamado {} barrada por {}: {}", id, ator_id, e);
            return Err(e);
        }

        let agora = self.relogio.agora();
        let mut depois = antes.clone();
        atualizacao.aplicar_em(&mut depois, agora);
        depois.historico.push(EntradaHistorico {
            autor: ator_id.to_string(),
            acao: acao.to_string(),
            timestamp: agora,
            detalhes: atualizacao.detalhes.clone(),
        });

        mapa.insert(id.to_string(), depois.clone());
        if let Err(e) = self.persistir(&mapa).await {
            mapa.insert(id.to_string(), antes);
            tracing::error!("❌ Falha ao gravar atualização do chamado {}: {}", id, e);
            return Err(e);
        }

        self.notificar_assinantes(&mapa);
        drop(mapa);

        tracing::debug!("Chamado {} atualizado por {}: {}", id, ator_id, acao);
        self.publicar(EventoChamado::Atualizado {
            antes,
            depois: depois.clone(),
        });
        Ok(depois)
    }

    async fn obter(&self, id: &str) -> Result<Chamado> {
        self.chamados
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ChamadoError::NaoEncontrado(format!("Chamado {} não encontrado", id)))
    }

    async fn listar(&self, filtro: &FiltroChamados) -> Result<Vec<Chamado>> {
        let mapa = self.chamados.read().await;
        Ok(filtro.selecionar(mapa.values()))
    }

    async fn importar(&self, chamado: Chamado) -> Result<()> {
        let mut mapa = self.chamados.write().await;
        if mapa.contains_key(&chamado.id) {
            return Err(ChamadoError::Validacao(format!(
                "Chamado {} já existe",
                chamado.id
            )));
        }

        let id = chamado.id.clone();
        mapa.insert(id.clone(), chamado);
        if let Err(e) = self.persistir(&mapa).await {
            mapa.remove(&id);
            return Err(e);
        }
        self.notificar_assinantes(&mapa);
        Ok(())
    }

    async fn assinar(&self, filtro: FiltroChamados) -> Result<Assinatura> {
        let mapa = self.chamados.read().await;
        let inicial = filtro.selecionar(mapa.values());
        let (emissor, receptor) = watch::channel(inicial);

        self.assinantes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Assinante { filtro, emissor });

        Ok(Assinatura::new(receptor))
    }

    fn eventos(&self) -> broadcast::Receiver<EventoChamado> {
        self.eventos.subscribe()
    }
}
