mod cli;

use std::{path::Path, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
use uidetect::{
    annotate::save_annotated,
    associate::AssociationStrategy,
    classify::Classifier,
    config::Config,
    ocr::{CommandExtractor, JsonExtractor},
    proposal::{ArtifactProposer, CommandProposer},
    AssociatedComponent, Region, UiDetectorBuilder,
};

#[derive(Serialize)]
struct Response<'a> {
    components: &'a [AssociatedComponent],
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{}", json!({ "error": format!("{err:#}") }));
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Detect {
            image,
            output_root,
            detector,
            detector_args,
            ocr_json,
            ocr,
            ocr_args,
            langs,
            config,
            exclusive,
            annotate,
            pretty,
        } => {
            let mut config = load_config(config.as_deref())?;
            if exclusive {
                config.detection.strategy = AssociationStrategy::Exclusive;
            }
            if let Some(langs) = langs {
                config.ocr.languages = langs;
            }

            let mut builder = UiDetectorBuilder::new()
                .options(config.detection)
                .keywords(config.keywords);
            builder = match detector {
                Some(program) => builder.proposer(
                    CommandProposer::new(program, &output_root)
                        .args(detector_args)
                        .params(config.proposal),
                ),
                None => builder.proposer(ArtifactProposer::new(&output_root)),
            };
            builder = match (ocr_json, ocr) {
                (Some(path), _) => builder.extractor(JsonExtractor::new(path)),
                (None, Some(program)) => builder.extractor(
                    CommandExtractor::new(program)
                        .args(ocr_args)
                        .languages(config.ocr.languages),
                ),
                (None, None) => builder,
            };

            let components = builder
                .build()
                .detect(&image)
                .with_context(|| format!("failed to detect components in {}", image.display()))?;
            log::info!("Detected {} components", components.len());

            if let Some(output) = annotate {
                save_annotated(&image, &components, &output)?;
            }

            let response = Response {
                components: &components,
            };
            if pretty {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", serde_json::to_string(&response)?);
            }
        }
        Commands::Classify {
            width,
            height,
            text,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let region = Region {
                id: 0,
                x: 0,
                y: 0,
                width,
                height,
            };
            println!("{}", Classifier::new(&config.keywords).classify(&region, &text));
        }
        Commands::Rules { config } => {
            let config = load_config(config.as_deref())?;
            for (i, rule) in Classifier::new(&config.keywords).rules().iter().enumerate() {
                println!("{:>2}. {} => {}", i + 1, rule.condition, rule.widget);
            }
        }
    }
    Ok(())
}
