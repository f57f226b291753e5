//! 파일시스템 아티팩트 저장소.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stratgen_core::{GeneratedArtifact, PipelineError, PipelineResult};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::ArtifactStore;

/// 단일 디렉터리에 아티팩트를 파일로 저장하는 저장소.
///
/// 쓰기는 같은 디렉터리의 고유한 임시 파일에 먼저 기록하고 디스크에 동기화한 뒤
/// 대상 파일로 rename합니다. 읽는 쪽은 부분적으로 쓰인 파일을 보지 않으며,
/// rename 이후 크래시가 나도 대상 파일이 비어 있거나 잘려 있지 않습니다.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// 새 저장소를 생성합니다. 디렉터리는 첫 저장 시 만들어집니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 저장소 디렉터리.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 식별자에 해당하는 파일 경로.
    pub fn path_for(&self, identifier: &str) -> PipelineResult<PathBuf> {
        validate_identifier(identifier)?;
        Ok(self.root.join(identifier))
    }

    fn temp_path_for(&self, identifier: &str) -> PathBuf {
        let suffix = uuid::Uuid::new_v4().simple();
        self.root.join(format!(".{identifier}.{suffix}.tmp"))
    }
}

/// 식별자는 디렉터리 구성요소가 없는 일반 파일명이어야 합니다.
pub fn validate_identifier(identifier: &str) -> PipelineResult<()> {
    let invalid = identifier.trim().is_empty()
        || identifier == "."
        || identifier == ".."
        || identifier.contains(['/', '\\', '\0'])
        || identifier.contains("..");

    if invalid {
        return Err(PipelineError::InvalidInput(format!(
            "invalid artifact identifier '{identifier}'"
        )));
    }
    Ok(())
}

/// 전체 내용을 쓰고 `sync_all`로 디스크에 반영합니다.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// rename 결과를 디렉터리 엔트리까지 반영합니다. 실패는 경고만 남깁니다.
#[cfg(unix)]
async fn sync_dir(dir: &Path) {
    let result = match fs::File::open(dir).await {
        Ok(handle) => handle.sync_all().await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        warn!(dir = %dir.display(), error = %e, "Directory sync failed");
    }
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) {}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn persist(&self, artifact: &GeneratedArtifact) -> PipelineResult<String> {
        let path = self.path_for(&artifact.identifier)?;

        fs::create_dir_all(&self.root).await.map_err(|e| {
            PipelineError::io(
                format!("failed to create dir {}", self.root.display()),
                e,
            )
        })?;

        let tmp_path = self.temp_path_for(&artifact.identifier);
        if let Err(e) = write_synced(&tmp_path, artifact.source_code.as_bytes()).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(PipelineError::io(
                format!("failed to write {}", tmp_path.display()),
                e,
            ));
        }

        if let Err(e) = fs::rename(&tmp_path, &path).await {
            warn!(path = %path.display(), error = %e, "Atomic rename failed");
            let _ = fs::remove_file(&tmp_path).await;
            return Err(PipelineError::io(
                format!("atomic rename to {} failed", path.display()),
                e,
            ));
        }
        sync_dir(&self.root).await;

        info!(
            identifier = %artifact.identifier,
            bytes = artifact.source_code.len(),
            "Artifact persisted"
        );
        Ok(artifact.identifier.clone())
    }

    async fn read(&self, identifier: &str) -> PipelineResult<String> {
        let path = self.path_for(identifier)?;
        fs::read_to_string(&path)
            .await
            .map_err(|e| PipelineError::io(format!("failed to read {}", path.display()), e))
    }

    async fn exists(&self, identifier: &str) -> PipelineResult<bool> {
        let path = self.path_for(identifier)?;
        let found = fs::try_exists(&path)
            .await
            .map_err(|e| PipelineError::io(format!("failed to stat {}", path.display()), e))?;
        debug!(%identifier, found, "Artifact existence checked");
        Ok(found)
    }
}
