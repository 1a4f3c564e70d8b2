mod cli;
mod output;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{Cli, Command};
use tidyscan::{AnalysisEngine, AnalysisRequest, EngineConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "tidyscan=debug" } else { "tidyscan=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Analyze {
            categories,
            plugins,
            paths,
            disabled,
            top,
            workers,
            max_depth,
            old_min_size,
            json,
        } => {
            let old_file_min_bytes = tidyscan::utils::parse_size(&old_min_size)
                .map_err(anyhow::Error::msg)
                .context("invalid --old-min-size")?;
            let config = EngineConfig {
                workers,
                top_n: top,
                max_depth,
                old_file_min_bytes,
                ..EngineConfig::default()
            };
            let engine = AnalysisEngine::new(config)?;
            for name in &disabled {
                if !engine.set_plugin_enabled(name, false) {
                    bail!("unknown plugin: {name}");
                }
            }

            let mut request = AnalysisRequest::new();
            if !categories.is_empty() {
                request = request.categories(categories);
            }
            if !plugins.is_empty() {
                request = request.plugins(plugins);
            }
            if !paths.is_empty() {
                request = request.paths(paths);
            }

            if !json {
                output::print_banner();
            }
            let report = engine.analyze(&request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_report(&report);
            }
        }

        Command::Plugins { json } => {
            let engine = AnalysisEngine::new(EngineConfig::default())?;
            let plugins = engine.list_plugins();
            if json {
                println!("{}", serde_json::to_string_pretty(&plugins)?);
            } else {
                output::print_plugins(&plugins);
            }
        }

        Command::Validate { path } => {
            let engine = AnalysisEngine::new(EngineConfig::default())?;
            match engine.validate_path(&path) {
                Ok(resolved) => output::print_valid(&resolved.display().to_string()),
                Err(reason) => bail!("{path}: {reason} ({})", reason.code()),
            }
        }

        Command::Inspect { path, json } => {
            let engine = AnalysisEngine::new(EngineConfig::default())?;
            let result = engine.analyze_file(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_inspect(&result);
            }
        }
    }

    Ok(())
}
