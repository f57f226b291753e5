//! CLI 명령어 구현 모듈.

pub mod backtest;
pub mod generate;
pub mod run;

pub use backtest::{run_backtest, BacktestArgs};
pub use generate::{run_generate, GenerateOutput};
pub use run::{run_batch, BatchEntry};
