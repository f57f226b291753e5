//! # Stratgen Backtest
//!
//! 백테스트 실행 서비스 호출과 결과 검증.
//!
//! - [`client`]: `BacktestInvoker` trait 및 HTTP 구현
//! - [`reply`]: 실행 서비스 응답을 성공/실패로 구분하는 디코더
//! - [`validator`]: 원시 결과를 `BacktestResult`로 검증

pub mod client;
pub mod reply;
pub mod validator;

pub use client::{BacktestInvoker, HttpBacktestInvoker};
pub use reply::InvocationReply;
pub use validator::validate;
