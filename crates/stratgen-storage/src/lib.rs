//! # Stratgen Storage
//!
//! 생성된 전략 코드를 백테스트 서비스가 읽을 수 있는 위치에 저장합니다.
//!
//! - [`ArtifactStore`]: 저장소 trait
//! - [`FsArtifactStore`]: 로컬 디렉터리 기반 구현 (임시 파일 + rename 원자적 쓰기)

pub mod fs;

use async_trait::async_trait;
use stratgen_core::{GeneratedArtifact, PipelineResult};

pub use fs::{validate_identifier, FsArtifactStore};

/// 아티팩트 저장소 trait.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// 아티팩트를 저장하고 식별자를 반환합니다.
    ///
    /// 같은 식별자로 다시 저장하면 이전 내용을 원자적으로 대체합니다.
    async fn persist(&self, artifact: &GeneratedArtifact) -> PipelineResult<String>;

    /// 마지막으로 저장된 내용을 읽습니다.
    async fn read(&self, identifier: &str) -> PipelineResult<String>;

    /// 아티팩트 존재 여부.
    async fn exists(&self, identifier: &str) -> PipelineResult<bool>;
}
