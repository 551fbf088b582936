//! Interactive control menu.
//!
//! The orchestrator lives for the whole session, so readiness and cycle
//! statistics carry over between menu actions.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::path::PathBuf;
use std::time::Duration;

use crate::commands;
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Initialize,
    RunCycle,
    TestDetection,
    Monitor,
    Status,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 6] = [
        MenuItem::Initialize,
        MenuItem::RunCycle,
        MenuItem::TestDetection,
        MenuItem::Monitor,
        MenuItem::Status,
        MenuItem::Exit,
    ];

    fn label(&self) -> &'static str {
        match self {
            MenuItem::Initialize => "1. 시스템 초기화",
            MenuItem::RunCycle => "2. 단일 수확 사이클 실행",
            MenuItem::TestDetection => "3. 잎 검출 테스트",
            MenuItem::Monitor => "4. 연속 모니터링 시작",
            MenuItem::Status => "5. 시스템 상태 확인",
            MenuItem::Exit => "6. 종료",
        }
    }
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut orchestrator = commands::build_orchestrator(config)?;

    println!("{}", "상추 수확 시스템".green().bold());
    println!("{}", "=".repeat(50));

    loop {
        println!();
        let labels: Vec<&'static str> = MenuItem::ALL.iter().map(MenuItem::label).collect();
        let choice = prompt(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt("선택")
                .items(&labels)
                .default(0)
                .interact()
        })
        .await?;
        println!();

        let result = match MenuItem::ALL[choice] {
            MenuItem::Initialize => commands::initialize::execute(&mut orchestrator).await,
            MenuItem::RunCycle => commands::cycle::execute(&mut orchestrator).await,
            MenuItem::TestDetection => {
                let image = prompt(|| {
                    Input::<String>::with_theme(&ColorfulTheme::default())
                        .with_prompt("이미지 경로")
                        .interact_text()
                })
                .await?;
                commands::detect::execute(&orchestrator, &PathBuf::from(image.trim())).await
            }
            MenuItem::Monitor => {
                let default = config.monitoring.interval_secs;
                let interval = prompt(move || {
                    Input::<u64>::with_theme(&ColorfulTheme::default())
                        .with_prompt("모니터링 주기 (초)")
                        .default(default)
                        .validate_with(|secs: &u64| {
                            if *secs == 0 {
                                Err("1초 이상이어야 합니다")
                            } else {
                                Ok(())
                            }
                        })
                        .interact_text()
                })
                .await?;
                commands::monitor::execute(&mut orchestrator, Duration::from_secs(interval), None)
                    .await
            }
            MenuItem::Status => {
                commands::status::execute(&orchestrator, config);
                Ok(())
            }
            MenuItem::Exit => {
                println!("{}", "시스템을 종료합니다.".cyan());
                return Ok(());
            }
        };

        if let Err(e) = result {
            println!("  {} {:#}", "✗".red(), e);
        }
    }
}

/// Run a blocking terminal prompt off the async runtime.
async fn prompt<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
{
    let value = tokio::task::spawn_blocking(f)
        .await
        .context("Prompt task failed")?
        .context("Failed to read input")?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_order_matches_numbering() {
        for (i, item) in MenuItem::ALL.iter().enumerate() {
            assert!(item.label().starts_with(&format!("{}.", i + 1)));
        }
        assert_eq!(MenuItem::ALL[5], MenuItem::Exit);
    }
}
