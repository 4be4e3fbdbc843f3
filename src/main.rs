// Terminal front end over the interview controller. Renders whatever the
// current phase affords and feeds user input back in as commands.

use anyhow::{Context, Result};
use mock_interviewer::prompts;
use mock_interviewer::{
    DifficultyLevel, InterviewController, InterviewType, OpenAICompatibleProvider, Phase,
    ProviderConfig, RecordStore, Sender, SqliteStore,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

fn data_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mock-interviewer")
        .join("records.sqlite")
}

fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Ok(None); // EOF
    }
    Ok(Some(line.trim().to_string()))
}

fn drain_banner(ctrl: &mut InterviewController) {
    if let Some(message) = ctrl.error() {
        println!("* {}", message);
        ctrl.clear_error();
    }
}

fn print_latest_ai_message(ctrl: &InterviewController) {
    if let Some(msg) = ctrl.messages().iter().rev().find(|m| m.sender == Sender::Ai) {
        println!("\n{}: {}\n", prompts::AI_NAME, msg.text);
    }
}

fn pick<T: Copy>(options: &[T], input: &str) -> Option<T> {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .copied()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let store = Arc::new(SqliteStore::connect(&data_path()).await?);
    let mut ctrl = InterviewController::new(
        RecordStore::new(store),
        Arc::new(OpenAICompatibleProvider::new()),
        ProviderConfig::from_env(),
    );

    println!("=== Mock Interviewer ===");
    ctrl.initialize().await;

    loop {
        match ctrl.phase() {
            Phase::Initializing => unreachable!("initialize() always leaves this phase"),
            Phase::Error => {
                drain_banner(&mut ctrl);
                if ctrl.api_key_missing() {
                    // Fatal configuration error; nothing to retry in-process.
                    println!("Set OPENAI_API_KEY (or INTERVIEWER_API_KEY_REF) and relaunch.");
                    std::process::exit(1);
                }
                let Some(input) = prompt("[r]estart, [l]ogout or [q]uit? ")? else { break };
                match input.as_str() {
                    "r" => ctrl.restart(),
                    "l" => ctrl.logout().await,
                    "q" => break,
                    _ => {}
                }
            }
            Phase::Login => {
                drain_banner(&mut ctrl);
                if !ctrl.recent_interviews().is_empty() {
                    println!("Recent interviews:");
                    for s in ctrl.recent_interviews() {
                        let score = s
                            .last_overall_score
                            .map(|n| format!("{}/10", n))
                            .unwrap_or_else(|| "N/A".to_string());
                        println!(
                            "  {} (age {}) - last score {} on {}",
                            s.user_name,
                            s.user_age_at_interview,
                            score,
                            s.last_interview_timestamp.format("%Y-%m-%d")
                        );
                    }
                }
                let Some(name) = prompt("Your name: ")? else { break };
                let Some(age) = prompt("Your age: ")? else { break };
                ctrl.login(&name, &age).await;
                if let Some(msg) = ctrl.login_error() {
                    println!("! {}", msg);
                }
            }
            Phase::SelectingType => {
                drain_banner(&mut ctrl);
                println!("Select interview type (or [l]ogout, [q]uit):");
                for (i, t) in InterviewType::ALL.iter().enumerate() {
                    println!("  {}. {}", i + 1, t.label());
                }
                let Some(input) = prompt("> ")? else { break };
                match input.as_str() {
                    "l" => ctrl.logout().await,
                    "q" => break,
                    other => {
                        if let Some(t) = pick(&InterviewType::ALL, other) {
                            ctrl.select_type(t);
                        }
                    }
                }
            }
            Phase::SelectingDifficulty => {
                println!("Select difficulty (or [b]ack):");
                for (i, d) in DifficultyLevel::ALL.iter().enumerate() {
                    println!("  {}. {}", i + 1, d.label());
                }
                let Some(input) = prompt("> ")? else { break };
                match input.as_str() {
                    "b" => ctrl.back_to_type_selection(),
                    other => {
                        if let Some(d) = pick(&DifficultyLevel::ALL, other) {
                            println!("Preparing your interview...");
                            ctrl.select_difficulty(d).await;
                            if ctrl.phase() == Phase::Ready {
                                print_latest_ai_message(&ctrl);
                            }
                        }
                    }
                }
            }
            Phase::StartingInterview => unreachable!("select_difficulty() runs to completion"),
            Phase::Ready => {
                drain_banner(&mut ctrl);
                let Some(input) = prompt("You: ")? else { break };
                match input.as_str() {
                    "" => {}
                    "/end" => {
                        println!("\n{}: ", prompts::AI_NAME);
                        ctrl.end_interview_with(|chunk| {
                            print!("{}", chunk);
                            let _ = io::stdout().flush();
                        })
                        .await;
                        println!("\n");
                    }
                    "/restart" => ctrl.restart(),
                    "/logout" => ctrl.logout().await,
                    "/quit" => break,
                    text => {
                        println!("\n{}: ", prompts::AI_NAME);
                        let mut streamed = false;
                        ctrl.send_message_with(text, |chunk| {
                            streamed = true;
                            print!("{}", chunk);
                            let _ = io::stdout().flush();
                        })
                        .await;
                        if !streamed {
                            // Fallback notice or error text never streamed.
                            print_latest_ai_message(&ctrl);
                        }
                        println!("\n");
                    }
                }
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}
