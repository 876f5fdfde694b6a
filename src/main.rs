// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use the_abacus::config::{load_and_validate_config, Config};
use the_abacus::engine::{InMemoryStore, Orchestrator};
use the_abacus::model::{ExpressionId, ExpressionStatus, ExpressionView, OwnerId};
use the_abacus::worker::WorkerPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Owner recorded for expressions submitted from the command line
const CLI_OWNER: &str = "cli";
/// How often the driver checks whether all expressions are done
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(20);

struct Args {
    config: Option<PathBuf>,
    json: bool,
    expressions: Vec<String>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [--config <file.yaml|file.toml>] [--json] <expression>...\n\
         Example: {} --config abacus.yaml \"2+3*4-5/2\" \"(1+2)*3\"",
        program, program
    )
}

fn parse_args() -> anyhow::Result<Args> {
    let mut raw = env::args();
    let program = raw.next().unwrap_or_else(|| "the-abacus".to_string());

    let mut args = Args {
        config: None,
        json: false,
        expressions: Vec::new(),
    };
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = raw.next().context("--config requires a file path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--json" => args.json = true,
            "--help" | "-h" => {
                println!("{}", usage(&program));
                std::process::exit(0);
            }
            _ => args.expressions.push(arg),
        }
    }

    if args.expressions.is_empty() {
        bail!("{}", usage(&program));
    }
    Ok(args)
}

fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let mut cfg = Config::default();
            cfg.apply_env_overrides();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}

/// Polls until every expression is terminal. Returns `false` if interrupted.
async fn wait_for_all(orchestrator: &Orchestrator, ids: &[ExpressionId]) -> anyhow::Result<bool> {
    let wait = async {
        loop {
            let mut pending = 0;
            for id in ids {
                if !orchestrator.get_expression(id).await?.status.is_terminal() {
                    pending += 1;
                }
            }
            if pending == 0 {
                return anyhow::Ok(());
            }
            tokio::time::sleep(STATUS_POLL_INTERVAL).await;
        }
    };

    tokio::select! {
        done = wait => done.map(|_| true),
        _ = tokio::signal::ctrl_c() => Ok(false),
    }
}

fn print_view(view: &ExpressionView, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(view)?);
        return Ok(());
    }

    match view.status {
        ExpressionStatus::Completed => println!(
            "{}  {} = {}",
            view.id,
            view.expression,
            view.result.unwrap_or(f64::NAN)
        ),
        ExpressionStatus::Failed => println!(
            "{}  {}  failed: {}",
            view.id,
            view.expression,
            view.error.as_deref().unwrap_or("unknown error")
        ),
        ExpressionStatus::Pending => println!("{}  {}  pending", view.id, view.expression),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "the_abacus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args()?;
    let config = load(args.config.as_ref())?;

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(InMemoryStore::new()),
        config.operation_times.clone(),
    ));
    let owner = OwnerId::from(CLI_OWNER);

    let mut ids = Vec::new();
    let mut rejected = 0;
    for text in &args.expressions {
        match orchestrator.submit(text, &owner).await {
            Ok(id) => ids.push(id),
            Err(error) => {
                eprintln!("{:?}: {}", text, error);
                rejected += 1;
            }
        }
    }

    let pool = WorkerPool::from_config(orchestrator.clone(), &config);
    let finished = wait_for_all(&orchestrator, &ids).await?;
    let processed = pool.shutdown().await;
    tracing::debug!(processed, "Worker pool drained");

    for id in &ids {
        print_view(&orchestrator.get_expression(id).await?, args.json)?;
    }

    if !finished {
        bail!("Interrupted before all expressions finished");
    }
    if rejected > 0 {
        bail!("{} of {} expressions were rejected", rejected, args.expressions.len());
    }
    Ok(())
}
