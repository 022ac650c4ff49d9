use std::process::ExitCode;
use std::time::Duration;
use clap::{ArgAction, Parser};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use vita_pkginfo::{read_metadata, FetchConfig, FetchError, HeaderFetcher, PackageMetadata, PkgError, Source};

/// Show metadata from the header of PS Vita .pkg files.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Package URLs (http/https) or local file paths
    #[arg(required = true)]
    targets: Vec<String>,

    /// Print JSON instead of aligned text
    #[arg(long)]
    json: bool,

    /// Number of leading bytes to fetch from each package
    #[arg(long)]
    max_bytes: Option<u64>,

    /// Total attempts per URL on transient network errors, counting the first
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    attempts: Option<u32>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long)]
    timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig::default();
        if let Some(max_bytes) = self.max_bytes {
            config.max_bytes = max_bytes;
        }
        if let Some(attempts) = self.attempts {
            config.max_attempts = attempts;
        }
        if let Some(secs) = self.timeout {
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        config
    }
}

#[derive(Debug, Error)]
enum InspectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] PkgError),
}

#[derive(Serialize)]
struct Report<'a> {
    source: String,
    #[serde(flatten)]
    metadata: &'a PackageMetadata,
    pretty_size: String,
}

#[derive(Serialize)]
struct Failure {
    source: String,
    error: String,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn inspect(fetcher: &HeaderFetcher, source: &Source) -> Result<PackageMetadata, InspectError> {
    let buffer = fetcher.load(source)?;
    Ok(read_metadata(&buffer)?)
}

fn print_text(metadata: &PackageMetadata) {
    println!();
    println!("{:13} {}", "Type:", metadata.classification);
    println!("{:13} {}", "Title ID:", metadata.title_id);
    println!("{:13} {}", "Title:", metadata.title);
    println!("{:13} {}", "Region:", metadata.region);
    println!("{:13} {}", "Min FW:", metadata.min_firmware);
    if let Some(app_version) = &metadata.app_version {
        println!("{:13} {}", "App Ver:", app_version);
    }
    println!("{:13} {}", "Content ID:", metadata.content_id);
    println!("{:13} {}", "Size:", metadata.total_size);
    println!("{:13} {}", "Pretty Size:", metadata.pretty_size());
    println!();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let fetcher = HeaderFetcher::new(args.fetch_config());
    let sources: Vec<Source> = args.targets.iter().map(|t| Source::parse(t)).collect();

    let results: Vec<(&Source, Result<PackageMetadata, InspectError>)> = sources
        .par_iter()
        .map(|source| (source, inspect(&fetcher, source)))
        .collect();

    let failed = results.iter().filter(|(_, result)| result.is_err()).count();

    if args.json {
        let entries: serde_json::Result<Vec<serde_json::Value>> = results
            .iter()
            .map(|(source, result)| match result {
                Ok(metadata) => serde_json::to_value(Report {
                    source: source.to_string(),
                    metadata,
                    pretty_size: metadata.pretty_size(),
                }),
                Err(e) => serde_json::to_value(Failure {
                    source: source.to_string(),
                    error: e.to_string(),
                }),
            })
            .collect();

        let document = entries.and_then(|entries| match entries.as_slice() {
            [single] => serde_json::to_string_pretty(single),
            _ => serde_json::to_string_pretty(&entries),
        });
        match document {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("ERROR: Failed to encode JSON: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for (source, result) in &results {
            match result {
                Ok(metadata) => {
                    if results.len() > 1 {
                        println!("{}", source);
                    }
                    print_text(metadata);
                }
                Err(e) => eprintln!("ERROR: {}: {}", source, e),
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
