//! # Stratgen Core
//!
//! 자연어 전략 → 백테스트 파이프라인의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 전략 요청, 생성된 아티팩트, 백테스트 파라미터/결과
//! - 파이프라인 단계와 최종 결과 (`PipelineOutcome`)
//! - 에러 분류 체계 (`PipelineError`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
