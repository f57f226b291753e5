//! 파이프라인 상태 머신.

use std::fmt;

use stratgen_core::PipelineStage;

/// 요청 하나의 진행 상태.
///
/// `Idle → Generating → Persisting → Invoking → Validating →
/// {Succeeded | Failed}` 순서로만 진행합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Generating,
    Persisting,
    Invoking,
    Validating,
    Succeeded,
    /// 실패한 단계
    Failed(PipelineStage),
}

impl PipelineState {
    /// 현재 상태가 수행하는 단계 (진행 중이 아니면 None).
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Generating => Some(PipelineStage::Generation),
            Self::Persisting => Some(PipelineStage::Persistence),
            Self::Invoking => Some(PipelineStage::Invocation),
            Self::Validating => Some(PipelineStage::Validation),
            Self::Idle | Self::Succeeded | Self::Failed(_) => None,
        }
    }

    /// 현재 단계가 성공했을 때의 다음 상태.
    pub fn next(&self) -> Self {
        match self {
            Self::Idle => Self::Generating,
            Self::Generating => Self::Persisting,
            Self::Persisting => Self::Invoking,
            Self::Invoking => Self::Validating,
            Self::Validating | Self::Succeeded => Self::Succeeded,
            Self::Failed(stage) => Self::Failed(*stage),
        }
    }

    /// 현재 단계가 실패했을 때의 상태.
    ///
    /// 진행 중인 단계가 없으면(`Idle`) 요청 수신 단계 실패로 봅니다.
    pub fn fail(&self) -> Self {
        match self {
            Self::Failed(stage) => Self::Failed(*stage),
            _ => Self::Failed(self.stage().unwrap_or(PipelineStage::Transport)),
        }
    }

    /// 종료 상태 여부.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Generating => f.write_str("generating"),
            Self::Persisting => f.write_str("persisting"),
            Self::Invoking => f.write_str("invoking"),
            Self::Validating => f.write_str("validating"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed(stage) => write!(f, "failed({stage})"),
        }
    }
}
