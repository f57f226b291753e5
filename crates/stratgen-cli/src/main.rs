//! 전략 생성 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전략 코드 생성 후 저장
//! stratgen generate -p "Buy when RSI < 30, sell when RSI > 70"
//!
//! # 저장된 전략 백테스트 (기본: AAPL, 2024-02-01 ~ 2025-02-01)
//! stratgen backtest -s MSFT -f 2023-01-03 -t 2023-12-29
//!
//! # 여러 설명에 대해 전체 파이프라인 실행
//! stratgen run -p "Buy when RSI < 30" -p "Buy on a 50/200 SMA golden cross"
//! ```
//!
//! 결과는 JSON으로 stdout에 출력하고 로그는 stderr로 보냅니다.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stratgen_cli::{run_backtest, run_batch, run_generate, BacktestArgs};
use stratgen_core::{init_logging, load_api_key, AppConfig, BacktestOverrides, LogConfig};
use stratgen_pipeline::Orchestrator;
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "stratgen")]
#[command(about = "Natural language strategy generation and backtesting", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 전략 설명으로부터 코드를 생성하고 저장
    Generate {
        /// 전략 설명
        #[arg(short, long)]
        prompt: String,
    },

    /// 저장된 전략을 백테스트 서비스로 실행
    Backtest {
        /// 전략 파일 (기본: 설정된 아티팩트 이름)
        #[arg(long)]
        strategy_file: Option<String>,

        /// 종목 심볼 (예: AAPL)
        #[arg(short, long)]
        symbol: Option<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        start: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short = 't', long)]
        end: Option<String>,
    },

    /// 설명마다 생성 → 저장 → 백테스트 → 검증을 실행
    Run {
        /// 전략 설명 (여러 번 지정 가능)
        #[arg(short, long, required = true)]
        prompt: Vec<String>,

        #[arg(short, long)]
        symbol: Option<String>,

        #[arg(short = 'f', long)]
        start: Option<String>,

        #[arg(short = 't', long)]
        end: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config))?;
    init_logging(LogConfig::from_settings(&config.logging).with_stderr())?;

    let api_key = load_api_key();
    if api_key.is_none() {
        warn!("OPENAI_API_KEY not set, code generation will fail");
    }
    let orchestrator = Orchestrator::from_config(&config, api_key)?;

    match cli.command {
        Commands::Generate { prompt } => match run_generate(&orchestrator, &prompt).await {
            Ok(output) => print_json(&output)?,
            Err(e) => {
                error!(error = %e, "Generate failed");
                return Err(e);
            }
        },

        Commands::Backtest {
            strategy_file,
            symbol,
            start,
            end,
        } => {
            let args = BacktestArgs {
                strategy_file,
                symbol,
                start,
                end,
            };
            match run_backtest(&orchestrator, &config.storage.artifact_name, &args).await {
                Ok(result) => print_json(&result)?,
                Err(e) => {
                    error!(error = %e, "Backtest failed");
                    return Err(e);
                }
            }
        }

        Commands::Run {
            prompt,
            symbol,
            start,
            end,
        } => {
            let overrides = BacktestOverrides {
                strategy_file: None,
                symbol,
                start,
                end,
            };
            let entries = run_batch(&orchestrator, &prompt, &overrides).await;
            print_json(&entries)?;

            let failed = entries.iter().filter(|e| !e.outcome.is_success()).count();
            if failed > 0 {
                anyhow::bail!("{failed} of {} pipeline runs failed", entries.len());
            }
        }
    }

    Ok(())
}
