//! 파이프라인 최종 결과.

use serde::{Deserialize, Serialize};

use super::result::BacktestResult;
use crate::error::{PipelineError, PipelineStage};

/// 요청 하나에 대해 정확히 한 번 생성되는 최종 결과.
///
/// JSON 형식:
///
/// ```json
/// { "status": "success", "result": { "dates": [...], ... } }
/// { "status": "failure", "stage": "invocation", "error": "symbol not found" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// 모든 단계 성공
    Success {
        /// 검증된 결과
        result: BacktestResult,
    },
    /// 첫 번째로 실패한 단계와 사유
    Failure {
        /// 실패한 단계
        stage: PipelineStage,
        /// 호출자에게 보여줄 사유
        #[serde(rename = "error")]
        reason: String,
    },
}

impl PipelineOutcome {
    /// 성공 결과를 생성합니다.
    pub fn success(result: BacktestResult) -> Self {
        Self::Success { result }
    }

    /// 에러로부터 실패 결과를 생성합니다.
    pub fn failure(stage: PipelineStage, error: &PipelineError) -> Self {
        Self::Failure {
            stage,
            reason: error.reason(),
        }
    }

    /// 성공 여부.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// 실패한 단계 (성공이면 None).
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { stage, .. } => Some(*stage),
        }
    }

    /// 실패 사유 (성공이면 None).
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }

    /// 성공 결과 (실패면 None).
    pub fn result(&self) -> Option<&BacktestResult> {
        match self {
            Self::Success { result } => Some(result),
            Self::Failure { .. } => None,
        }
    }
}
