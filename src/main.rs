use anyhow::{Context, Result};
use chunk_translator::cli::{Cli, Commands, JobArgs, SplitArgs};
use chunk_translator::text_processor::LineSplitter;
use chunk_translator::translation::{split_input, LANGUAGES};
use chunk_translator::{
    merge_job, provider_from_config, run_status, run_translation_job, AppConfig, Language,
    LanguagePair, TranslationJob,
};
use clap::Parser;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = AppConfig::load_or_default(Some(&config_path))
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    init_tracing(&config)?;

    match cli.command {
        Commands::Run {
            job,
            split,
            provider,
            resplit,
            no_pause,
        } => {
            let mut provider_config = config.provider.clone();
            if let Some(kind) = provider {
                provider_config.kind = kind;
            }

            let job = build_job(&config, &job, &split, resplit)?;
            let mut provider = provider_from_config(&provider_config, job.pair)
                .context("failed to start the translation provider")?;

            let summary = run_translation_job(&job, provider.as_mut()).await?;
            println!(
                "Translated {} of {} chunks ({} already done, {} blank) -> {}",
                summary.report.translated,
                summary.total_chunks,
                summary.report.skipped,
                summary.report.passed_through,
                summary.merged_path.display()
            );

            if config.output.pause_on_completion && !no_pause {
                wait_for_enter()?;
            }
        }
        Commands::Split {
            input,
            work_dir,
            split,
            resplit,
        } => {
            let work_dir = work_dir.unwrap_or_else(|| config.output.work_dir.clone());
            let splitter = LineSplitter::new(
                split.max_chars.unwrap_or(config.splitter.max_chars),
                split.measure.unwrap_or(config.splitter.measure),
            );
            let (dir, outcome) = split_input(&input, &work_dir, &splitter, resplit).await?;
            println!(
                "{} chunks in {}{}",
                outcome.total_chunks,
                dir.display(),
                if outcome.reused { " (existing split)" } else { "" }
            );
        }
        Commands::Status { job } => {
            let job = build_job(&config, &job, &SplitArgs::default(), false)?;
            let status = run_status(&job).await?;

            if !status.split_exists {
                println!("{} has not been split yet", job.input.display());
                return Ok(());
            }
            println!(
                "{}: {}/{} chunks translated ({:.1}%), {} remaining",
                job.pair,
                status.completed,
                status.total_chunks,
                status.progress * 100.0,
                status.remaining
            );
            if !status.missing.is_empty() {
                println!("Missing: {:?}", status.missing);
            }
        }
        Commands::Merge { job, allow_gaps } => {
            let job = build_job(&config, &job, &SplitArgs::default(), false)?;
            let merged = merge_job(&job, allow_gaps).await?;
            println!("Merged -> {}", merged.display());
        }
        Commands::Languages => {
            print_languages();
        }
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("chunk_translator={}", config.logging.level).parse()?);

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn build_job(
    config: &AppConfig,
    args: &JobArgs,
    split: &SplitArgs,
    resplit: bool,
) -> Result<TranslationJob> {
    let source = resolve_language(args.source.as_deref(), "Source language")?;
    let target = resolve_language(args.target.as_deref(), "Target language")?;
    let pair = LanguagePair::new(source, target)?;

    Ok(TranslationJob {
        input: args.input.clone(),
        work_dir: args
            .work_dir
            .clone()
            .unwrap_or_else(|| config.output.work_dir.clone()),
        pair,
        max_chars: split.max_chars.unwrap_or(config.splitter.max_chars),
        measure: split.measure.unwrap_or(config.splitter.measure),
        resplit,
    })
}

/// Uses the flag when given, otherwise asks on the terminal until a catalog
/// entry is chosen.
fn resolve_language(flag: Option<&str>, prompt: &str) -> Result<Language> {
    if let Some(key) = flag {
        return Ok(Language::lookup(key)?);
    }

    if !std::io::stdin().is_terminal() {
        anyhow::bail!("{} not given and stdin is not a terminal", prompt.to_lowercase());
    }

    print_languages();
    let stdin = std::io::stdin();
    loop {
        print!("{} (number or code): ", prompt);
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            anyhow::bail!("no {} chosen", prompt.to_lowercase());
        }
        match Language::lookup(&line) {
            Ok(language) => return Ok(language),
            Err(e) => eprintln!("{}", e),
        }
    }
}

fn print_languages() {
    for (i, language) in LANGUAGES.iter().enumerate() {
        println!("{:>2}. {}", i + 1, language);
    }
}

fn wait_for_enter() -> Result<()> {
    if !std::io::stdin().is_terminal() {
        return Ok(());
    }
    print!("Press Enter to exit...");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
