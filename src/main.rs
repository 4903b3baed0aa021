use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use startup_score::batch::{self, BatchReport, CancelFlag, FetchError, Fetcher, FixedInterval};
use startup_score::cache::{self, CachingFetcher};
use startup_score::config::{self, Settings};
use startup_score::hunter::HunterClient;
use startup_score::output::{self, OutputFormat};
use startup_score::scoring;

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_RATE_LIMIT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a single domain
    Score {
        /// Domain to look up, e.g. stripe.com
        domain: String,
    },
    /// Score every domain listed in a CSV file (needs a `domain` column)
    Batch {
        /// Path to the CSV file
        csv: PathBuf,

        /// Rows in the top-N table (defaults to config `top`, then 10)
        #[arg(long)]
        top: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Delay between lookups, e.g. "1100ms" or "2s" (defaults to config `pacing`)
        #[arg(long, value_parser = humantime::parse_duration)]
        pace: Option<Duration>,
    },
    /// Remove all cached enrichment records
    ClearCache,
}

impl Commands {
    /// Whether the command reads config or credentials
    fn needs_config(&self) -> bool {
        !matches!(self, Commands::ClearCache)
    }
}

#[derive(Parser, Debug)]
#[command(name = "startup-score")]
#[command(about = "Score startups by domain using Hunter.io enrichment data", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/startup-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Always query the enrichment service, bypassing the on-disk cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "startup_score=debug"
    } else {
        "startup_score=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let start_time = Instant::now();
    let cache_path = cache::get_cache_path();

    if !cli.command.needs_config() {
        if let Err(e) = cache::clear_cache(&cache_path) {
            eprintln!("Failed to clear cache: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        println!("Cleared cache at {}", cache_path.display());
        std::process::exit(EXIT_SUCCESS);
    }

    // Load and validate config
    let config_path = cli.config.map(PathBuf::from);
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let settings = match config::validate_config(&config) {
        Ok(s) => s,
        Err(errors) => {
            eprintln!("Config errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Input errors surface before any credential or network work
    let domains = match &cli.command {
        Commands::Batch { csv, .. } => match startup_score::input::load_domains(csv) {
            Ok(list) => {
                if !list.skipped_lines.is_empty() {
                    eprintln!(
                        "Skipped {} unreadable line(s) in {}: {}",
                        list.skipped_lines.len(),
                        csv.display(),
                        list.skipped_lines
                            .iter()
                            .map(|n| n.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
                Some(list.domains)
            }
            Err(e) => {
                eprintln!("Input error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        },
        _ => None,
    };

    let Some(api_key) = config::resolve_api_key(&config) else {
        eprintln!("No API key configured.");
        eprintln!(
            "Set {} or add it to {}:",
            config::ENV_API_KEY_VAR,
            config::get_config_path().display()
        );
        eprintln!("  api_key: \"your-hunter-key\"");
        std::process::exit(EXIT_AUTH);
    };

    let client = match HunterClient::new(api_key, settings.base_url.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {:#}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    if cli.verbose {
        if cli.no_cache {
            eprintln!("Cache disabled");
        } else {
            eprintln!(
                "Using cache at {} (ttl {})",
                cache_path.display(),
                humantime::format_duration(settings.cache_ttl)
            );
        }
    }

    let code = match cli.command {
        Commands::Score { domain } => {
            if cli.no_cache {
                run_score(&client, &domain, cli.verbose).await
            } else {
                let fetcher = CachingFetcher::new(client, cache_path, settings.cache_ttl);
                run_score(&fetcher, &domain, cli.verbose).await
            }
        }
        Commands::Batch {
            top, format, pace, ..
        } => {
            let domains = domains.unwrap_or_default();
            let options = BatchOptions {
                top: top.unwrap_or(settings.top),
                format,
                pace: pace.unwrap_or(settings.pacing),
                verbose: cli.verbose,
            };
            if cli.no_cache {
                run_batch(&client, &domains, &options, &settings).await
            } else {
                let fetcher = CachingFetcher::new(client, cache_path, settings.cache_ttl);
                run_batch(&fetcher, &domains, &options, &settings).await
            }
        }
        Commands::ClearCache => EXIT_SUCCESS,
    };

    if cli.verbose {
        eprintln!("Finished in {:?}", start_time.elapsed());
    }

    std::process::exit(code);
}

async fn run_score<F: Fetcher>(fetcher: &F, domain: &str, verbose: bool) -> i32 {
    let mut record = match fetcher.fetch(domain).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to fetch {}: {}", domain, e);
            return exit_code_for(&e);
        }
    };
    if record.domain.is_empty() {
        record.domain = domain.to_string();
    }

    let use_colors = output::should_use_colors();
    let result = scoring::score(&record);

    println!("{}", output::format_score_line(&result, use_colors));
    println!("{}", output::format_result_detail(&result));

    if verbose {
        println!();
        println!("Breakdown:");
        println!(
            "{}",
            output::format_breakdown(&scoring::explain(&record), use_colors)
        );
    }

    EXIT_SUCCESS
}

struct BatchOptions {
    top: usize,
    format: OutputFormat,
    pace: Duration,
    verbose: bool,
}

async fn run_batch<F: Fetcher>(
    fetcher: &F,
    domains: &[String],
    options: &BatchOptions,
    settings: &Settings,
) -> i32 {
    if domains.is_empty() {
        eprintln!("No domains found in input file.");
        return EXIT_SUCCESS;
    }

    if options.verbose {
        eprintln!(
            "Scoring {} domains against {} (pacing {})",
            domains.len(),
            settings.base_url,
            humantime::format_duration(options.pace)
        );
    }

    // Ctrl-C stops the batch before its next lookup; rows so far are still printed
    let cancel = CancelFlag::default();
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, stopping after the current domain...");
            flag.store(true, Ordering::SeqCst);
        }
    });

    let pacer = FixedInterval::new(options.pace);
    let report = batch::run_batch_with_cancel(domains, fetcher, &pacer, &cancel).await;

    if !report.is_empty() && report.failed().len() == report.len() {
        eprintln!("All lookups failed. Check your network connection and API key.");
        return EXIT_NETWORK;
    }

    if let Err(e) = print_report(&report, options) {
        eprintln!("Failed to render results: {:#}", e);
        return EXIT_CONFIG;
    }

    if !report.failed().is_empty() {
        eprintln!(
            "{} of {} lookups failed: {}",
            report.failed().len(),
            domains.len(),
            report.failed().join(", ")
        );
    }

    if report.cancelled() {
        eprintln!(
            "Batch interrupted after {} of {} domains.",
            report.len(),
            domains.len()
        );
    }

    EXIT_SUCCESS
}

fn print_report(report: &BatchReport, options: &BatchOptions) -> anyhow::Result<()> {
    let ranking = report.ranking();

    match options.format {
        OutputFormat::Table => {
            let use_colors = output::should_use_colors();
            println!("{}", output::format_summary(&report.summary(), use_colors));
            println!();
            println!("Top {}:", ranking.top(options.top).len());
            println!(
                "{}",
                output::format_scored_table(ranking.top(options.top), use_colors)
            );

            if options.verbose {
                for (group, rows) in report.by_group() {
                    if rows.is_empty() {
                        continue;
                    }
                    println!();
                    println!("{} ({}):", group, rows.len());
                    println!("{}", output::format_scored_table(&rows, use_colors));
                }
            } else {
                println!();
                println!("All results:");
                println!("{}", output::format_scored_table(ranking.all(), use_colors));
            }
        }
        OutputFormat::Tsv => println!("{}", output::format_tsv(ranking.all())),
        OutputFormat::Csv => println!("{}", output::format_csv(ranking.all())?),
        OutputFormat::Json => println!("{}", output::format_json(ranking.all())?),
    }

    Ok(())
}

fn exit_code_for(error: &FetchError) -> i32 {
    if error.is_auth() {
        EXIT_AUTH
    } else if error.is_rate_limited() {
        EXIT_RATE_LIMIT
    } else {
        EXIT_NETWORK
    }
}
