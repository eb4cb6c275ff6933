use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::store::MatrixStore;
use crate::core::error::Result;
use crate::core::identity::MatrixIdentity;
use crate::toolkit::matrix::Matrix;


/// Stores one JSON document per matrix, named by the hash of its identity.
pub struct FileMatrixStore {
    root: PathBuf,
}

impl FileMatrixStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, identity: &MatrixIdentity) -> PathBuf {
        self.root.join(format!("{}.json", identity.storage_key()))
    }
}

#[async_trait]
impl MatrixStore for FileMatrixStore {
    async fn get(&self, identity: &MatrixIdentity) -> Result<Option<Matrix>> {
        let path = self.path_for(identity);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!("Read {} matrix from {}", identity.kind, path.display());
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    async fn put(&self, identity: &MatrixIdentity, matrix: &Matrix) -> Result<()> {
        let path = self.path_for(identity);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, serde_json::to_vec(matrix)?).await?;
        tokio::fs::rename(&staging, &path).await?;
        debug!("Wrote {} matrix to {}", identity.kind, path.display());
        Ok(())
    }
}
