use clap::{Parser, Subcommand, ValueEnum};
use nucleo_export::cli::{self as prog_cli, CliContext, OutputMode};
use nucleo_export::config::AppConfig;
use nucleo_export::logger;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Output {
    Human,
    Plain,
    Json,
}

impl From<Output> for OutputMode {
    fn from(o: Output) -> Self {
        match o {
            Output::Human => OutputMode::Human,
            Output::Plain => OutputMode::Plain,
            Output::Json => OutputMode::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "nucleo-export",
    version,
    about = "Preview and export molecule data",
    long_about = None
)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(
        long,
        help = "Path to a config file (TOML). If omitted, defaults are used."
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        help = "Directory holding the cached research record. Takes precedence over config/env."
    )]
    cache_dir: Option<PathBuf>,
    #[arg(long, help = "Directory of per-user history files (<user>.json)")]
    history_dir: Option<PathBuf>,
    #[arg(
        long,
        help = "JSON catalog file; the built-in molecule bank is used when omitted"
    )]
    catalog: Option<PathBuf>,
    #[arg(
        long,
        help = "Log directory; logging stays off when neither this nor log_dir in config is set"
    )]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, help = "Render timestamps in UTC instead of the local zone")]
    utc: bool,
    #[arg(long, value_enum, default_value = "human", help = "Output mode")]
    output: Output,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "List the exportable sources")]
    Sources,
    #[command(about = "List the fields of a source in schema order")]
    Fields {
        #[arg(help = "Source: moleculeBank|research|model")]
        source: String,
    },
    #[command(about = "Render a preview of a source to stdout")]
    Preview {
        #[arg(help = "Source: moleculeBank|research|model")]
        source: String,
        #[arg(long, help = "Format: table|report; defaults to report")]
        format: Option<String>,
        #[arg(long, help = "Comma-separated field keys; defaults to all fields")]
        fields: Option<String>,
        #[arg(long, help = "Principal whose history is exported (model source)")]
        user: Option<String>,
    },
    #[command(about = "Render a source and save it into the output directory")]
    Export {
        #[arg(help = "Source: moleculeBank|research|model")]
        source: String,
        #[arg(long, help = "Format: table|report; defaults to report")]
        format: Option<String>,
        #[arg(long, help = "Comma-separated field keys; defaults to all fields")]
        fields: Option<String>,
        #[arg(long, help = "Principal whose history is exported (model source)")]
        user: Option<String>,
        #[arg(
            long,
            help = "Output directory; defaults to output_dir from config, else the cwd"
        )]
        out_dir: Option<PathBuf>,
    },
    /// Inspect or change the cached research record
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    #[command(about = "Show the cached record")]
    Show,
    #[command(about = "Cache a compound record given as JSON")]
    Set {
        #[arg(help = "Compound record JSON (PubChem property names)")]
        json: String,
    },
    #[command(about = "Remove the cached record")]
    Clear,
}

fn load_config(cli: &Cli) -> AppConfig {
    // Precedence: CLI > env > config files > defaults
    let mut cfg = AppConfig::load(cli.config.as_deref());
    if let Some(p) = &cli.cache_dir {
        cfg.cache_dir = Some(p.clone());
    }
    if let Some(p) = &cli.history_dir {
        cfg.history_dir = Some(p.clone());
    }
    if let Some(p) = &cli.catalog {
        cfg.catalog_path = Some(p.clone());
    }
    if let Some(p) = &cli.log_dir {
        cfg.log_dir = Some(p.clone());
    }
    if let Some(l) = &cli.log_level {
        cfg.log_level = Some(l.clone());
    }
    if cli.utc {
        cfg.utc_timestamps = Some(true);
    }
    cfg
}

fn split_fields(fields: Option<String>) -> Option<Vec<String>> {
    fields.map(|f| prog_cli::parse_fields(&f))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = load_config(&cli);
    // log_dir already carries NUCLEO_EXPORT_LOG_DIR through AppConfig::load
    if let Some(dir) = &cfg.log_dir {
        let level = cfg.log_level.as_deref();
        let retention = std::env::var("NUCLEO_EXPORT_LOG_RETENTION")
            .ok()
            .and_then(|s| s.parse::<usize>().ok());
        if let Err(e) = logger::configure_logging(Some(dir.as_path()), level, retention) {
            eprintln!("warning: logging disabled: {e}");
        }
    }
    let built = cfg.build_registry().and_then(|registry| {
        Ok(CliContext {
            registry,
            opts: cfg.render_options()?,
            output_dir: cfg.output_dir(),
            default_user: cfg.user.clone(),
        })
    });
    let ctx = match built {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let cmd = match cli.command {
        Commands::Sources => prog_cli::Command::Sources,
        Commands::Fields { source } => prog_cli::Command::Fields { source },
        Commands::Preview {
            source,
            format,
            fields,
            user,
        } => prog_cli::Command::Preview {
            source,
            format,
            fields: split_fields(fields),
            user,
        },
        Commands::Export {
            source,
            format,
            fields,
            user,
            out_dir,
        } => prog_cli::Command::Export {
            source,
            format,
            fields: split_fields(fields),
            user,
            out_dir,
        },
        Commands::Cache(CacheCommands::Show) => prog_cli::Command::CacheShow,
        Commands::Cache(CacheCommands::Set { json }) => {
            prog_cli::Command::CacheSet { json }
        }
        Commands::Cache(CacheCommands::Clear) => prog_cli::Command::CacheClear,
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = prog_cli::run_with_format(&ctx, cmd, cli.output.into(), &mut out).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
