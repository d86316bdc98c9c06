//! Snapshot JSON em arquivo para os repositórios em memória
//!
//! Escrita atômica: arquivo temporário + rename.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Lê o snapshot; arquivo inexistente equivale a coleção vazia
pub async fn carregar<T: DeserializeOwned>(caminho: &Path) -> Result<Vec<T>> {
    match tokio::fs::read(caminho).await {
        Ok(bytes) => {
            let registros: Vec<T> = serde_json::from_slice(&bytes)?;
            tracing::info!(
                "📂 Snapshot carregado: {} ({} registros)",
                caminho.display(),
                registros.len()
            );
            Ok(registros)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("📂 Snapshot inexistente, começando vazio: {}", caminho.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Grava o snapshot completo
pub async fn salvar<T: Serialize>(caminho: &Path, registros: &[T]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(registros)?;

    if let Some(dir) = caminho.parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await?;
        }
    }

    let tmp = caminho_temporario(caminho);
    tokio::fs::write(&tmp, &bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, caminho).await {
        tracing::warn!("Falha ao renomear snapshot {}: {}", tmp.display(), e);
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    tracing::debug!("Snapshot gravado: {} ({} bytes)", caminho.display(), bytes.len());
    Ok(())
}

fn caminho_temporario(caminho: &Path) -> PathBuf {
    let mut nome = caminho.as_os_str().to_owned();
    nome.push(".tmp");
    PathBuf::from(nome)
}
