//! `survey` — command-line client for the survey response API.
//!
//! # Usage
//!
//! ```text
//! survey --url http://localhost:3000 surveys
//! survey responses --company 1
//! survey show 42
//! survey submit --survey 1 --country 1 --company 1 --location 1 -a 1=5 -a 2=Sí
//! survey export --survey 1 -o responses.csv
//! ```

mod client;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, SubmitAnswer, SubmitBody};
use serde::Deserialize;
use survey_core::response::ResponseFilter;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "survey", about = "Command-line client for the survey API")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the survey server (default: http://localhost:3000).
  #[arg(long, env = "SURVEY_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List active surveys, or show one survey's questions.
  Surveys {
    id: Option<i64>,
  },

  /// List responses, most recent first.
  Responses {
    #[arg(long)]
    survey:   Option<i64>,
    #[arg(long)]
    country:  Option<i64>,
    #[arg(long)]
    company:  Option<i64>,
    #[arg(long)]
    location: Option<i64>,
  },

  /// Show one response with its answers.
  Show { id: i64 },

  /// Submit a response.
  Submit {
    #[arg(long)]
    survey:          i64,
    #[arg(long)]
    country:         i64,
    #[arg(long)]
    company:         i64,
    #[arg(long)]
    location:        i64,
    /// Answer as `QUESTION_ID=VALUE`; repeat once per question.
    #[arg(short, long = "answer", value_name = "QUESTION_ID=VALUE", value_parser = parse_answer)]
    answers:         Vec<(i64, String)>,
    /// Makes retries of this submission safe.
    #[arg(long)]
    idempotency_key: Option<Uuid>,
  },

  /// Download every answer of a survey as CSV.
  Export {
    #[arg(long)]
    survey: i64,
    /// Output file; `-` for stdout. Defaults to the server-suggested name.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
}

fn parse_answer(raw: &str) -> Result<(i64, String), String> {
  let (id, value) = raw
    .split_once('=')
    .ok_or_else(|| format!("expected QUESTION_ID=VALUE, got {raw:?}"))?;
  let id = id
    .trim()
    .parse()
    .map_err(|_| format!("question id must be an integer, got {id:?}"))?;
  Ok((id, value.to_string()))
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:3000".to_string()),
  };
  tracing::debug!(base_url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Surveys { id: None } => {
      print!("{}", render::surveys(&client.list_surveys().await?));
    }
    Command::Surveys { id: Some(id) } => {
      print!("{}", render::survey(&client.get_survey(id).await?));
    }
    Command::Responses { survey, country, company, location } => {
      let filter = ResponseFilter {
        survey_id:   survey,
        country_id:  country,
        company_id:  company,
        location_id: location,
      };
      print!("{}", render::summaries(&client.list_responses(&filter).await?));
    }
    Command::Show { id } => {
      print!("{}", render::detail(&client.get_response(id).await?));
    }
    Command::Submit { survey, country, company, location, answers, idempotency_key } => {
      if answers.is_empty() {
        return Err(anyhow!("at least one --answer is required"));
      }
      let body = SubmitBody {
        survey_id: survey,
        country_id: country,
        company_id: company,
        location_id: location,
        answers: answers
          .into_iter()
          .map(|(question_id, answer_value)| SubmitAnswer { question_id, answer_value })
          .collect(),
        idempotency_key,
      };
      let receipt = client.submit(&body).await?;
      if receipt.replayed {
        println!("response {} (already recorded)", receipt.response_id);
      } else {
        println!("response {} recorded", receipt.response_id);
      }
    }
    Command::Export { survey, output } => {
      let export = client.export_csv(survey).await?;
      let target = output
        .or_else(|| export.filename.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(format!("survey_responses_{survey}.csv")));
      if target.as_os_str() == "-" {
        print!("{}", export.body);
      } else {
        std::fs::write(&target, &export.body)
          .with_context(|| format!("writing {}", target.display()))?;
        eprintln!("wrote {}", target.display());
      }
    }
  }
  Ok(())
}
