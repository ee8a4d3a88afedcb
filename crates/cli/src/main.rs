use clap::{Args, Parser, Subcommand};
use nsgeo_domain::{CliOverrides, DiscoveryStrategy, DomainError};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;
mod commands;
mod di;

#[derive(Parser, Debug)]
#[command(name = "nsgeo")]
#[command(version)]
#[command(about = "Scan where the authoritative nameservers of domains are located")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up nameservers, their addresses and countries for a domain list
    Scan(ScanArgs),

    /// Reduce domain lists to registrable domains using the public suffix list
    #[command(alias = "preprocessing")]
    Preprocess(PreprocessArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Input file, one domain per line
    #[arg(short, long)]
    input: PathBuf,

    /// MaxMind country database (.mmdb)
    #[arg(short, long)]
    geoip: PathBuf,

    /// Output file, one JSON object per line
    #[arg(short, long, default_value = "out.jsonl")]
    out: PathBuf,

    /// Upstream resolver as ip:port (repeatable)
    #[arg(short, long = "upstream", value_delimiter = ',')]
    upstreams: Vec<String>,

    /// Maximum concurrent scans, 0 for unlimited
    #[arg(long = "cc")]
    max_concurrency: Option<usize>,

    /// Maximum scans started per second, 0 for unlimited
    #[arg(long = "sps")]
    max_scans_per_second: Option<u32>,

    /// Nameserver discovery strategy (ns or soa)
    #[arg(long)]
    discovery: Option<DiscoveryStrategy>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct PreprocessArgs {
    /// Public suffix list file
    #[arg(long)]
    psl: PathBuf,

    /// Output file, one registrable domain per line
    #[arg(short, long, default_value = "psn.txt")]
    out: PathBuf,

    /// Also honour the private section of the list
    #[arg(long)]
    include_private: bool,

    /// Domain list files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            log_level: self.log_level.clone(),
            ..Default::default()
        };
        if let Command::Scan(args) = &self.command {
            overrides.upstreams = Some(args.upstreams.clone());
            overrides.max_concurrency = args.max_concurrency;
            overrides.max_scans_per_second = args.max_scans_per_second;
            overrides.discovery = args.discovery;
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config, cli.debug);
    bootstrap::config::log_config(&config, cli.config.as_deref());

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    match cli.command {
        Command::Scan(args) => {
            let command = commands::scan::ScanCommand {
                input: &args.input,
                geoip: &args.geoip,
                out: &args.out,
                show_progress: !args.no_progress,
            };
            match commands::scan::run(command, &config, shutdown).await {
                Ok(_) => Ok(()),
                Err(e) => {
                    if matches!(e.downcast_ref::<DomainError>(), Some(DomainError::Cancelled)) {
                        warn!("Scan interrupted, output is incomplete");
                    } else {
                        error!(error = %e, "Scan failed");
                    }
                    Err(e)
                }
            }
        }
        Command::Preprocess(args) => {
            let command = commands::preprocess::PreprocessCommand {
                psl: &args.psl,
                out: &args.out,
                include_private: args.include_private,
                files: &args.files,
            };
            commands::preprocess::run(command).map(|_| ())
        }
    }
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    warn!("Signal received, stopping");
    shutdown.cancel();
    info!("Waiting for in-flight scans to stop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::try_parse_from(["nsgeo", "scan", "-i", "in.txt", "-g", "geo.mmdb"]).unwrap();
        let Command::Scan(args) = &cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.out, PathBuf::from("out.jsonl"));
        assert!(args.upstreams.is_empty());
        assert!(args.max_concurrency.is_none());
        assert!(!args.no_progress);

        let overrides = cli.overrides();
        assert_eq!(overrides.upstreams, Some(vec![]));
        assert!(overrides.max_scans_per_second.is_none());
    }

    #[test]
    fn test_scan_requires_input_and_geoip() {
        assert!(Cli::try_parse_from(["nsgeo", "scan", "-i", "in.txt"]).is_err());
        assert!(Cli::try_parse_from(["nsgeo", "scan", "-g", "geo.mmdb"]).is_err());
    }

    #[test]
    fn test_scan_overrides() {
        let cli = Cli::try_parse_from([
            "nsgeo",
            "--debug",
            "scan",
            "-i",
            "in.txt",
            "-g",
            "geo.mmdb",
            "-u",
            "1.1.1.1:53",
            "--upstream",
            "9.9.9.9:53,8.8.4.4:53",
            "--cc",
            "0",
            "--sps",
            "5",
            "--discovery",
            "soa",
        ])
        .unwrap();
        assert!(cli.debug);

        let overrides = cli.overrides();
        assert_eq!(
            overrides.upstreams,
            Some(vec![
                "1.1.1.1:53".to_string(),
                "9.9.9.9:53".to_string(),
                "8.8.4.4:53".to_string()
            ])
        );
        assert_eq!(overrides.max_concurrency, Some(0));
        assert_eq!(overrides.max_scans_per_second, Some(5));
        assert_eq!(overrides.discovery, Some(DiscoveryStrategy::Soa));
    }

    #[test]
    fn test_unknown_discovery_rejected() {
        let parsed = Cli::try_parse_from([
            "nsgeo", "scan", "-i", "in.txt", "-g", "geo.mmdb", "--discovery", "axfr",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_preprocess_alias_and_files() {
        let cli = Cli::try_parse_from([
            "nsgeo",
            "preprocessing",
            "--psl",
            "psl.dat",
            "a.txt",
            "b.txt",
        ])
        .unwrap();
        let Command::Preprocess(args) = &cli.command else {
            panic!("expected preprocess");
        };
        assert_eq!(args.out, PathBuf::from("psn.txt"));
        assert_eq!(args.files.len(), 2);
        assert!(!args.include_private);
        assert!(cli.overrides().upstreams.is_none());
    }

    #[test]
    fn test_preprocess_requires_files() {
        assert!(Cli::try_parse_from(["nsgeo", "preprocess", "--psl", "psl.dat"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nsgeo",
            "preprocess",
            "--psl",
            "psl.dat",
            "a.txt",
            "--log-level",
            "warn",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
    }
}
