use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use fluxo_core::NewTransaction;
use fluxo_core::time::{parse_iso_date, today_in};
use fluxo_ingest::{
    FileKind, ImportOptions, ImportOutcome, MemoryDocument, StrategyChoice,
    import_delimited, import_document,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
#[cfg(feature = "pdf")]
mod pdf;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "fluxo",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FLUXO_BUILD_SHA"), ")"),
    about = "Extract transactions from bank statements"
)]
struct Cli {
    /// Debug logging on stderr (overridden by RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement (PDF, text-layer JSON dump, or CSV) and preview the transactions
    Import(ImportArgs),

    /// List the statement profiles available to --profile
    Profiles,

    /// Manage ~/.fluxo/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct ImportArgs {
    file: PathBuf,

    /// Statement profile (default: [import].profile from config)
    #[arg(long)]
    profile: Option<String>,

    /// Row grammar: auto, line or token
    #[arg(long)]
    strategy: Option<StrategyChoice>,

    /// Print the records as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Processing date, YYYY-MM-DD (default: today in the configured timezone)
    #[arg(long)]
    today: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Import(args) => run_import(args).await?,
        Command::Profiles => list_profiles()?,
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_import(args: ImportArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let profile_name = args.profile.unwrap_or_else(|| cfg.import.profile.clone());
    let profile = cfg.profile(&profile_name)?;
    let strategy = args.strategy.unwrap_or(cfg.import.strategy);
    let today = match args.today.as_deref() {
        Some(s) => parse_iso_date(s)?,
        None => today_in(&cfg.import.timezone)?,
    };
    debug!(profile = %profile.name, %strategy, %today, file = %args.file.display(), "import");

    let opts = ImportOptions::new(today)
        .with_profile(profile)
        .with_strategy(strategy);

    let outcome = read_statement(&args.file, &opts).await.map_err(|e| {
        if e.is_unreadable() {
            anyhow!("could not read statement {}: {e}", args.file.display())
        } else {
            e.into()
        }
    })?;

    if outcome.transactions.is_empty() {
        bail!(
            "no transactions recognised in {} (unsupported layout)",
            args.file.display()
        );
    }

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.transactions).context("serialize transactions")?;
        println!("{json}");
    } else {
        print_preview(&outcome);
    }
    Ok(())
}

async fn read_statement(path: &Path, opts: &ImportOptions) -> fluxo_ingest::Result<ImportOutcome> {
    match FileKind::from_path(path)? {
        FileKind::Delimited => {
            let text = fs::read_to_string(path)?;
            Ok(import_delimited(&text, opts))
        }
        FileKind::Document if is_text_layer_dump(path) => {
            let mut doc = MemoryDocument::from_json(&fs::read_to_string(path)?)?;
            import_document(&mut doc, opts).await
        }
        FileKind::Document => read_pdf(path, opts).await,
    }
}

fn is_text_layer_dump(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(feature = "pdf")]
async fn read_pdf(path: &Path, opts: &ImportOptions) -> fluxo_ingest::Result<ImportOutcome> {
    let mut pages = pdf::PdfPages::open(path)?;
    import_document(&mut pages, opts).await
}

#[cfg(not(feature = "pdf"))]
async fn read_pdf(path: &Path, _opts: &ImportOptions) -> fluxo_ingest::Result<ImportOutcome> {
    Err(fluxo_ingest::IngestError::UnsupportedFile(format!(
        "{} (built without the `pdf` feature; rebuild with --features pdf or pass a text-layer .json dump)",
        path.display()
    )))
}

fn print_preview(outcome: &ImportOutcome) {
    println!(
        "{:<10}  {:<7}  {:<9}  {:>12}  DESCRIPTION",
        "DATE", "TYPE", "STATUS", "VALUE"
    );
    for t in &outcome.transactions {
        println!("{}", preview_row(t));
    }

    let r = &outcome.report;
    let pending = outcome.transactions.iter().filter(|t| t.is_pending()).count();
    let net: f64 = outcome.transactions.iter().map(|t| t.signed_value()).sum();
    println!(
        "\n{} transactions ({} pending, {} duplicates dropped) | net {:.2} | strategy: {}",
        r.kept, pending, r.duplicates, net, r.strategy
    );
    if r.pages > 0 {
        let year = r
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "not found".to_string());
        println!("{} pages, {} lines, {} candidates, statement year: {}", r.pages, r.lines, r.candidates, year);
    }
}

fn preview_row(t: &NewTransaction) -> String {
    format!(
        "{:<10}  {:<7}  {:<9}  {:>12.2}  {}",
        t.date.format("%Y-%m-%d"),
        t.kind.as_str(),
        t.status.as_str(),
        t.value,
        t.description
    )
}

fn list_profiles() -> Result<()> {
    let cfg = config::load_config()?;
    for name in cfg.profile_names() {
        let marker = if name == cfg.import.profile { "*" } else { " " };
        let source = if cfg.profiles.contains_key(&name) { "config" } else { "built-in" };
        match cfg.profile(&name) {
            Ok(p) => println!("{marker} {name:<12} y_tolerance={:<4} ({source})", p.y_tolerance),
            Err(e) => println!("{marker} {name:<12} invalid: {e:#}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fluxo_core::TransactionType;

    fn opts() -> ImportOptions {
        ImportOptions::new(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap())
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!("fluxo-cli-{}-{name}", std::process::id()));
        fs::write(&p, contents).unwrap();
        p
    }

    #[test]
    fn test_cli_parses_import_flags() {
        let cli = Cli::try_parse_from([
            "fluxo", "import", "extrato.pdf", "--profile", "loose", "--strategy", "token", "--json", "--today",
            "2024-12-28", "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.profile.as_deref(), Some("loose"));
        assert_eq!(args.strategy, Some(StrategyChoice::Token));
        assert!(args.json);
        assert_eq!(args.today.as_deref(), Some("2024-12-28"));
    }

    #[test]
    fn test_version_carries_build_sha() {
        use clap::CommandFactory;
        let version = Cli::command().get_version().unwrap_or_default().to_string();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.ends_with(&format!("({})", env!("FLUXO_BUILD_SHA"))));
    }

    #[test]
    fn test_cli_rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["fluxo", "import", "x.csv", "--strategy", "ocr"]).is_err());
    }

    #[tokio::test]
    async fn test_read_statement_csv() {
        let p = write_temp("extrato.csv", "Data;Descrição;Valor\n15/03/2024;Venda produto;150,00\n");
        let out = read_statement(&p, &opts()).await.unwrap();
        fs::remove_file(&p).ok();
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].kind, TransactionType::Income);
    }

    #[tokio::test]
    async fn test_read_statement_text_layer_dump() {
        let doc = MemoryDocument::from_text_pages(&["14/11 PIX REC.OUTRA IF MT 1,00C"]);
        let p = write_temp("layer.json", &serde_json::to_string(&doc).unwrap());
        let out = read_statement(&p, &opts()).await.unwrap();
        fs::remove_file(&p).ok();
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].description, "PIX REC.OUTRA IF MT");
        assert_eq!(out.report.pages, 1);
    }

    #[tokio::test]
    async fn test_read_statement_errors_are_classified() {
        let garbage = write_temp("broken.json", "%PDF-1.7 not a dump");
        let err = read_statement(&garbage, &opts()).await.unwrap_err();
        fs::remove_file(&garbage).ok();
        assert!(err.is_unreadable());

        let missing = std::env::temp_dir().join("fluxo-cli-does-not-exist.csv");
        assert!(read_statement(&missing, &opts()).await.unwrap_err().is_unreadable());

        let ofx = PathBuf::from("extrato.ofx");
        assert!(!read_statement(&ofx, &opts()).await.unwrap_err().is_unreadable());
    }

    #[test]
    fn test_preview_row_layout() {
        let t = NewTransaction::imported(
            NaiveDate::from_ymd_opt(2024, 11, 14).unwrap(),
            "PIX REC".to_string(),
            1234.5,
            TransactionType::Income,
        );
        assert_eq!(preview_row(&t), "2024-11-14  income   completed       1234.50  PIX REC");
    }
}
