//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 전략 코드 생성 (`generate`)
//! - 저장된 전략 백테스트 (`backtest`)
//! - 여러 설명에 대한 전체 파이프라인 일괄 실행 (`run`)

pub mod commands;

pub use commands::*;
