use clap::{Parser, Subcommand};
use insomnia_core::*;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "insomnia-dx")]
#[command(about = "Sleep questionnaire diagnosis engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a JSON answer file and print the diagnosis as JSON
    Analyze {
        /// Answer file (reads stdin when omitted or "-")
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// Print a one-line summary instead of JSON
        #[arg(long, conflicts_with = "compact")]
        describe: bool,
    },

    /// List the questionnaire
    Questions {
        /// Print the questionnaire definition as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the questionnaire summary and severity thresholds as JSON
    Summary,

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    insomnia_core::logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            answers,
            compact,
            describe,
        } => {
            let engine = load_engine(cli.config.as_deref())?;
            cmd_analyze(&engine, answers.as_deref(), compact, describe)
        }
        Commands::Questions { json } => {
            let engine = load_engine(cli.config.as_deref())?;
            cmd_questions(&engine, json)
        }
        Commands::Summary => cmd_summary(&load_engine(cli.config.as_deref())?),
        Commands::InitConfig { force } => cmd_init_config(cli.config, force),
    }
}

fn load_engine(config_path: Option<&Path>) -> Result<DiagnosisEngine> {
    let config = match config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    DiagnosisEngine::with_config(config)
}

fn read_answers(path: Option<&Path>) -> Result<RawAnswerSet> {
    let contents = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&contents)?)
}

fn cmd_analyze(
    engine: &DiagnosisEngine,
    answers: Option<&Path>,
    compact: bool,
    describe: bool,
) -> Result<()> {
    let raw = read_answers(answers)?;
    let normalized = normalize(&raw);

    let missing = engine.questionnaire().missing_required(&normalized);
    if !missing.is_empty() {
        let ids: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
        tracing::warn!("Unanswered required questions: {}", ids.join(", "));
        eprintln!("Warning: unanswered required questions: {}", ids.join(", "));
    }

    let result = engine.analyze_normalized(&normalized);
    let output = if describe {
        result.description()
    } else if compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output)?;
    Ok(())
}

fn cmd_questions(engine: &DiagnosisEngine, json: bool) -> Result<()> {
    let questionnaire = engine.questionnaire();

    if json {
        println!("{}", serde_json::to_string_pretty(questionnaire)?);
        return Ok(());
    }

    for question in questionnaire.questions() {
        let kind = match question.kind {
            AnswerKind::SingleChoice => "single choice",
            AnswerKind::MultiChoice => "multiple choice",
            AnswerKind::YesNo => "yes/no",
        };
        let optional = if question.required { "" } else { ", optional" };
        println!("{:>2}. {} [{}{}]", question.id, question.text, kind, optional);

        for option in &question.options {
            let points = match option.effect {
                OptionEffect::Score { points } => format!("{}", points),
                OptionEffect::Delta { points } => format!("{:+} each", points),
            };
            println!("      {}) {} ({})", option.code, option.label, points);
        }
        println!();
    }

    Ok(())
}

fn cmd_summary(engine: &DiagnosisEngine) -> Result<()> {
    let summary = engine
        .questionnaire()
        .summary(&engine.config().severity);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = path.clone().unwrap_or_else(Config::default_config_path);

    if target.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }

    let config = Config::default();
    match path {
        Some(path) => config.save_to(&path)?,
        None => config.save()?,
    }
    println!("✓ Wrote default config to {}", target.display());
    Ok(())
}
