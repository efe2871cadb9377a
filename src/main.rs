use clap::{Args, Parser, Subcommand};
use exchange_matcher::app;
use exchange_matcher::config::{LoggingSettings, Settings, SettingsOverrides};
use exchange_matcher::error::AppError;
use exchange_matcher::services::export::{MATCHES_FILE, OUTBOX_FILE};
use exchange_matcher::services::OutboxTransport;
use exchange_matcher::telemetry;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "exchange-matcher",
    about = "Pair domestic and incoming exchange students from survey exports",
    version
)]
struct Cli {
    /// Settings file to load instead of config/default.toml and config/local.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match both survey exports and write the outputs
    Run(RunArgs),
    /// Validate a rules document and print its layering report
    Check {
        /// Rules document (defaults to the configured path)
        #[arg(long)]
        rules: Option<String>,
    },
    /// Render introduction mails from a written matches file into an outbox
    Mails(MailArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Survey export of the domestic students
    #[arg(long)]
    domestic: Option<String>,
    /// Survey export of the incoming students
    #[arg(long)]
    incoming: Option<String>,
    /// Rules document
    #[arg(long)]
    rules: Option<String>,
    /// Output directory
    #[arg(long)]
    output: Option<String>,
    /// Build the cost matrix on the calling thread only
    #[arg(long)]
    sequential: bool,
}

#[derive(Args, Debug)]
struct MailArgs {
    /// matches.csv written by a previous run (defaults to the output directory)
    #[arg(long)]
    matches: Option<PathBuf>,
    /// Outbox file to write (defaults to the output directory)
    #[arg(long)]
    outbox: Option<PathBuf>,
    /// Rules document holding the mail templates
    #[arg(long)]
    rules: Option<String>,
    /// Transliterate mail subjects and bodies to plain ASCII
    #[arg(long)]
    ascii: bool,
}

fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Command::Run(args) => SettingsOverrides {
            domestic: args.domestic.clone(),
            incoming: args.incoming.clone(),
            rules: args.rules.clone(),
            output: args.output.clone(),
            parallel: args.sequential.then_some(false),
            ..Default::default()
        },
        Command::Check { rules } => SettingsOverrides {
            rules: rules.clone(),
            ..Default::default()
        },
        Command::Mails(args) => SettingsOverrides {
            rules: args.rules.clone(),
            ascii_mail: args.ascii.then_some(true),
            ..Default::default()
        },
    };

    let settings = Settings::load_with(cli.config.as_deref(), &overrides);
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_else(|_| LoggingSettings::default());
    telemetry::init(&logging)?;
    let settings = settings?;
    info!("configuration loaded");

    match cli.command {
        Command::Run(_) => {
            let report = app::run_matching(&settings)?;
            println!(
                "run {}: {} matches, {} unmatched domestic, {} unmatched incoming, total cost {:.3}",
                report.summary.run_id,
                report.summary.matched,
                report.summary.unmatched_domestic,
                report.summary.unmatched_incoming,
                report.summary.total_cost,
            );
            for path in &report.outputs {
                println!("  wrote {}", path.display());
            }
        }
        Command::Check { .. } => {
            let (rules, report) = app::check_rules(&settings.rules.path)?;
            println!(
                "{} criteria, {} supported languages (default {})",
                rules.criteria.len(),
                rules.languages.supported().len(),
                rules.languages.default_language().name,
            );
            for tier in &report {
                let status = if tier.dominates { "dominates" } else { "overlaps" };
                println!(
                    "  {:<24} max {:>10.3}  below {:>10.3}  {}",
                    tier.criterion, tier.max_contribution, tier.lower_tier_total, status
                );
            }
        }
        Command::Mails(args) => {
            let matches = args
                .matches
                .unwrap_or_else(|| settings.output.file(MATCHES_FILE));
            let outbox = args
                .outbox
                .unwrap_or_else(|| settings.output.file(OUTBOX_FILE));
            let mut transport = OutboxTransport::new(outbox);
            let delivered = app::send_mails(
                Path::new(&settings.rules.path),
                &matches,
                &settings.mail,
                &mut transport,
            )?;
            println!("{delivered} mails written to {}", transport.path().display());
        }
    }

    Ok(())
}
