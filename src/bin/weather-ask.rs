//! Weather NLQ CLI
//!
//! Ask questions about weather observations in English or Kiswahili.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use weather_nlq::llm::{detector, explainer, synthesizer};
use weather_nlq::pipeline::{Outcome, Pipeline, PipelineRun};
use weather_nlq::present::{render_answer, render_failure, OutputFormat};
use weather_nlq::AppConfig;

/// Weather NLQ - natural language questions over weather observations
#[derive(Parser)]
#[command(name = "weather-ask")]
#[command(about = "Ask questions about weather data in English or Kiswahili", long_about = None)]
#[command(version)]
struct Cli {
    /// Chat model (overrides OPENAI_MODEL)
    #[arg(long, global = true, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// API base URL (overrides OPENAI_BASE_URL)
    #[arg(long, global = true, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Read settings from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one question
    Ask {
        /// Question in English or Kiswahili
        question: String,

        /// Output format for results
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Show SQL and explanation without running the query
        #[arg(long)]
        plan: bool,
    },

    /// Ask questions interactively
    Shell {
        /// Output format for results
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the fixed model instructions
    Prompts,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // A missing .env is fine; real environment variables win.
    if cli.env_file.is_none() {
        dotenvy::dotenv().ok();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }
    let color = !cli.no_color;

    match cli.command {
        Commands::Ask { ref question, format, plan } => {
            let pipeline = build_pipeline(&cli)?;
            cmd_ask(&pipeline, question, format, plan, color).await
        }
        Commands::Shell { format } => {
            let pipeline = build_pipeline(&cli)?;
            cmd_shell(&pipeline, format, color).await
        }
        Commands::Prompts => {
            cmd_prompts();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_pipeline(cli: &Cli) -> anyhow::Result<Pipeline> {
    let mut config = match &cli.env_file {
        Some(path) => AppConfig::from_env_file(path)?,
        None => AppConfig::from_env()?,
    };
    if let Some(model) = &cli.model {
        config.model.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.model.base_url = base_url.clone();
    }

    tracing::debug!(model = %config.model.model, postgres = ?config.postgres, "Configuration loaded");
    Ok(Pipeline::from_config(&config))
}

async fn cmd_ask(
    pipeline: &Pipeline,
    question: &str,
    format: OutputFormat,
    plan: bool,
    color: bool,
) -> anyhow::Result<ExitCode> {
    let run = if plan {
        pipeline.plan(question).await
    } else {
        pipeline.run(question).await
    };

    Ok(present(&run, format, color)?)
}

async fn cmd_shell(pipeline: &Pipeline, format: OutputFormat, color: bool) -> anyhow::Result<ExitCode> {
    println!("{}", "Ask Questions About Weather Data".cyan().bold());
    println!("Type 'exit' or 'quit' to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("{}", "Ask your question (in English or Kiswahili):".bright_white());

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        println!("{}", "Generating SQL query and running query...".dimmed());
        let run = pipeline.run(question).await;
        present(&run, format, color)?;
        println!();
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_prompts() {
    println!("{}", "Query synthesis:".cyan().bold());
    println!("{}\n", synthesizer::SQL_INSTRUCTIONS);

    println!("{}", "Language detection:".cyan().bold());
    println!("{}", detector::DETECTOR_ROLE);
    println!("{}\n", detector::DETECTION_INSTRUCTIONS);

    println!("{}", "Explanation:".cyan().bold());
    println!("{}", explainer::EXPLAINER_ROLE);
    println!("{}", explainer::ExplanationGenerator::prompt("<sql>", "<question>", "<language>"));
}

fn present(run: &PipelineRun, format: OutputFormat, color: bool) -> anyhow::Result<ExitCode> {
    match &run.outcome {
        Outcome::Presented(answer) => {
            println!("{}", render_answer(answer, format, color)?);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failed(failure) => {
            eprintln!("{}", render_failure(failure, color));
            Ok(ExitCode::FAILURE)
        }
    }
}
