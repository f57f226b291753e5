//! # Stratgen Codegen
//!
//! 자연어 전략 설명을 실행 가능한 전략 코드로 변환하는 코드 생성 클라이언트.
//!
//! - [`types`]: `CodeGenerator` trait 및 요청/응답 타입
//! - [`prompt`]: 생성 결과물 계약을 정의하는 시스템 지시문
//! - [`extract`]: 자유 형식 응답에서 코드 블록 추출
//! - [`openai`]: OpenAI 호환 chat completions 클라이언트

pub mod extract;
pub mod openai;
pub mod prompt;
pub mod types;

pub use extract::{extract_code_block, ExtractedCode};
pub use openai::{OpenAiCodeGenerator, MISSING_API_KEY};
pub use prompt::SYSTEM_INSTRUCTION;
pub use types::*;
