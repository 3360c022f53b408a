//! Chiron - command-line host for the intake engine

use chiron::llm::{LlmRequest, LlmService};
use chiron::state_machine::TerminationReason;
use chiron::{
    analyze_symptoms, AppConfig, AssessmentDialogue, DialogueConfig, IntakeError,
    InteractionReconciler, LlmAdvisor, RecommendationPipeline, TurnOutcome,
};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chiron", version, about = "Conversational health intake assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive assessment: answer follow-up questions, then get an assessment
    Chat,
    /// One-shot analysis of a symptom description
    Symptoms {
        /// Free-text description of the symptoms
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Medication recommendations with an interaction report
    Recommend {
        #[arg(long)]
        condition: String,
        /// Known allergy (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,
        /// Medication currently taken (repeatable)
        #[arg(long = "medication")]
        medications: Vec<String>,
    },
    /// Check one pair of medications against both sources
    Interaction { drug_a: String, drug_b: String },
    /// Verify the model endpoint is reachable
    Check,
}

/// Everything the commands need, built once from config
struct Host {
    config: AppConfig,
    llm: Arc<dyn LlmService>,
    reconciler: InteractionReconciler,
}

impl Host {
    fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let llm = config.llm_service();
        let table = config.interaction_table()?;
        let reconciler =
            InteractionReconciler::new(Arc::new(table), Arc::new(LlmAdvisor::new(llm.clone())));
        Ok(Self {
            config,
            llm,
            reconciler,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Best effort: a missing .env is normal
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the conversation and results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chiron=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let host = match Host::from_config(AppConfig::from_env()) {
        Ok(host) => host,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Chat => chat(&host).await,
        Command::Symptoms { text } => symptoms(&host, &text.join(" ")).await,
        Command::Recommend {
            condition,
            allergies,
            medications,
        } => recommend(&host, &condition, &allergies, &medications).await,
        Command::Interaction { drug_a, drug_b } => interaction(&host, &drug_a, &drug_b).await,
        Command::Check => check(&host).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn chat(host: &Host) -> Result<(), IntakeError> {
    let dialogue = AssessmentDialogue::new(
        host.llm.clone(),
        DialogueConfig {
            max_turns: host.config.max_turns,
        },
    );
    let stdin = std::io::stdin();
    run_chat(dialogue, &mut stdin.lock(), &mut std::io::stdout()).await
}

/// Console conversation over any line source and sink.
///
/// When the model drops out mid-conversation the assessment is still
/// requested from the history gathered so far.
async fn run_chat(
    mut dialogue: AssessmentDialogue,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), IntakeError> {
    say(out, "Describe your symptoms or concern (type 'exit' to quit).");
    let Some(opening) = read_line(input, out, "You: ") else {
        return Ok(());
    };
    let mut outcome = dialogue.start(&opening).await?;

    loop {
        outcome = match outcome {
            TurnOutcome::Ask { question } => {
                say(out, &format!("\nAssistant: {question}"));
                let Some(answer) = read_line(input, out, "You: ") else {
                    return Ok(());
                };
                dialogue.reply(&answer).await?
            }
            TurnOutcome::ReadyForAssessment => {
                say(out, "\nAssistant: Thank you. Preparing your assessment...\n");
                TurnOutcome::Assessed {
                    assessment: dialogue.assess().await?,
                }
            }
            TurnOutcome::Terminated {
                reason: TerminationReason::CollaboratorUnavailable,
            } => {
                tracing::info!(session_id = %dialogue.session_id(), "Assessing with partial history");
                say(
                    out,
                    "\nI'm having trouble processing your information. Let's proceed with what we have.\n",
                );
                TurnOutcome::Assessed {
                    assessment: dialogue.assess().await?,
                }
            }
            TurnOutcome::Terminated {
                reason: TerminationReason::UserExit,
            } => {
                tracing::info!(session_id = %dialogue.session_id(), "User ended the dialogue");
                say(out, "Take care. Consult a healthcare professional if symptoms persist.");
                return Ok(());
            }
            TurnOutcome::Assessed { assessment } => {
                say(out, &assessment);
                return Ok(());
            }
        };
    }
}

fn say(out: &mut impl Write, text: &str) {
    if let Err(e) = writeln!(out, "{text}") {
        tracing::warn!(error = %e, "Failed to write to console");
    }
}

/// Prompt and read one trimmed line; `None` on end of input
fn read_line(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> Option<String> {
    write!(out, "{prompt}").ok()?;
    out.flush().ok()?;
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

async fn symptoms(host: &Host, text: &str) -> Result<(), IntakeError> {
    let analysis = analyze_symptoms(host.llm.as_ref(), text).await?;
    println!("{analysis}");
    Ok(())
}

async fn recommend(
    host: &Host,
    condition: &str,
    allergies: &[String],
    medications: &[String],
) -> Result<(), IntakeError> {
    let pipeline = RecommendationPipeline::new(host.llm.clone(), host.reconciler.clone());
    let result = pipeline.recommend(condition, allergies, medications).await?;
    print_json(&result);
    Ok(())
}

async fn interaction(host: &Host, drug_a: &str, drug_b: &str) -> Result<(), IntakeError> {
    let check = host.reconciler.check_pair(drug_a, drug_b).await?;
    print_json(&check);
    Ok(())
}

async fn check(host: &Host) -> Result<(), IntakeError> {
    let request = LlmRequest::prompt("Hello").with_max_tokens(1);
    host.llm.complete(&request).await?;
    println!("Connected to model {}", host.llm.model_id());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize result"),
    }
}
