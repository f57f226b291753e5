//! # Stratgen Pipeline
//!
//! 자연어 전략 설명을 검증된 백테스트 결과로 바꾸는 오케스트레이터.
//!
//! 코드 생성 → 저장 → 백테스트 호출 → 결과 검증을 순서대로 실행하고,
//! 첫 번째로 실패한 단계에서 멈춰 요청당 하나의 `PipelineOutcome`을 반환합니다.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{Orchestrator, StageFailure, ARTIFACT_NOT_READY, PIPELINE_OUTCOMES_METRIC};
pub use state::PipelineState;
