use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use roi_core::{ClientInfo, ConsultantInfo, CurrencyLocale, RoiInput};
use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use roi_app::config::Settings;
use roi_app::form::apply_edits;
use roi_app::utils::{parse_decimal, parse_percent};
use roi_app::{SessionState, Services, build_registry, dashboard, logging, pipeline};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// ROI calculator for clinic automation projects.
///
/// Calculates investment, savings, ROI and payback, renders a PDF report
/// with charts, saves it locally and syncs it to the configured backend.
/// Rates are entered as percentages.
#[derive(Debug, Parser)]
#[command(name = "roi-calc", version)]
struct Cli {
    /// Settings file. Defaults to `roi.toml` in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the local PDF copy (overrides the config file).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Only produce the local report.
    #[arg(long)]
    no_sync: bool,

    /// Print the report record as JSON instead of the dashboard.
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. `debug` or `roi_core=trace` (overrides config and RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,

    /// Hide log output on the console.
    #[arg(long, short)]
    quiet: bool,

    /// Print the latest N stored reports and exit.
    #[arg(long, value_name = "N")]
    history: Option<u32>,

    /// After the first report, read `field=value; ...` edits from stdin and
    /// recalculate after each line.
    #[arg(long, short)]
    interactive: bool,

    #[arg(long, env = "ROI_CONSULTANT_NAME", default_value = "")]
    consultant_name: String,
    #[arg(long, env = "ROI_CONSULTANT_EMAIL", default_value = "")]
    consultant_email: String,
    #[arg(long, env = "ROI_CONSULTANT_PHONE", default_value = "")]
    consultant_phone: String,

    #[arg(long, default_value = "Project Alpha")]
    client_name: String,
    #[arg(long, default_value = "Jakarta")]
    client_location: String,

    #[arg(long, default_value_t = 200)]
    total_staff: u32,
    #[arg(long, default_value_t = 20)]
    admin_staff: u32,
    /// Transactions (appointments) per month.
    #[arg(long, default_value_t = 5000)]
    monthly_appointments: u32,
    /// Current share of transactions lost to inefficiency, in percent.
    #[arg(long, default_value = "15", value_parser = parse_percent)]
    inefficiency_rate: Decimal,

    /// Average monthly admin salary (IDR).
    #[arg(long, default_value = "8000000", value_parser = parse_decimal)]
    avg_salary: Decimal,
    /// Revenue per transaction (IDR).
    #[arg(long, default_value = "250000", value_parser = parse_decimal)]
    revenue_per_appointment: Decimal,

    /// Expected admin workload reduction, in percent.
    #[arg(long, default_value = "30", value_parser = parse_percent)]
    staff_reduction: Decimal,
    /// Expected reduction of the inefficiency rate, in percent.
    #[arg(long, default_value = "40", value_parser = parse_percent)]
    inefficiency_reduction: Decimal,

    /// IDR per USD.
    #[arg(long, default_value = "16000", value_parser = parse_decimal)]
    exchange_rate: Decimal,
    #[arg(long, default_value = "20000", value_parser = parse_decimal)]
    setup_cost_usd: Decimal,
    #[arg(long, default_value = "15000", value_parser = parse_decimal)]
    integration_cost_usd: Decimal,
    #[arg(long, default_value = "10000", value_parser = parse_decimal)]
    training_cost_usd: Decimal,
    /// Monthly maintenance (IDR).
    #[arg(long, default_value = "5000000", value_parser = parse_decimal)]
    maintenance_cost: Decimal,
}

impl Cli {
    fn input(&self) -> RoiInput {
        RoiInput {
            consultant: ConsultantInfo {
                name: self.consultant_name.clone(),
                email: self.consultant_email.clone(),
                phone: self.consultant_phone.clone(),
            },
            client: ClientInfo {
                name: self.client_name.clone(),
                location: self.client_location.clone(),
            },
            total_staff: self.total_staff,
            admin_staff: self.admin_staff,
            monthly_appointments: self.monthly_appointments,
            inefficiency_rate: self.inefficiency_rate,
            avg_salary: self.avg_salary,
            revenue_per_appointment: self.revenue_per_appointment,
            staff_reduction_rate: self.staff_reduction,
            inefficiency_reduction_rate: self.inefficiency_reduction,
            exchange_rate: self.exchange_rate,
            setup_cost_usd: self.setup_cost_usd,
            integration_cost_usd: self.integration_cost_usd,
            training_cost_usd: self.training_cost_usd,
            maintenance_cost: self.maintenance_cost,
        }
    }
}

// ─── setup ───────────────────────────────────────────────────────────────────

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    settings.apply_env(|name| std::env::var(name).ok());
    if let Some(dir) = &cli.output_dir {
        settings.report.output_dir = dir.clone();
    }
    if cli.no_sync {
        settings.sync.enabled = false;
    }
    Ok(settings)
}

/// CLI flag first, then `RUST_LOG`, then the config file.
fn apply_logging(
    cli: &Cli,
    settings: &Settings,
) -> anyhow::Result<()> {
    let level = match (&cli.log_level, &settings.logging.level) {
        (Some(level), _) => Some(level),
        (None, Some(level)) if !logging::env_filter_present() => Some(level),
        _ => None,
    };
    if let Some(level) = level {
        logging::set_log_level(level)?;
    }
    if let Some(file) = &settings.logging.file {
        logging::enable_file_logging(file)?;
    }
    if cli.quiet {
        logging::set_console_enabled(false)?;
    }
    Ok(())
}

// ─── submission ──────────────────────────────────────────────────────────────

/// Runs one submission and prints it. Returns the next state, or the old
/// one when the input was rejected.
async fn run_once(
    state: SessionState,
    input: &RoiInput,
    services: &Services,
    locale: &CurrencyLocale,
    json: bool,
) -> anyhow::Result<(SessionState, bool)> {
    match pipeline::submit(&state, input, services).await {
        Ok((next, outcome)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            } else {
                print!("{}", dashboard::render_submission(&outcome, &next, locale));
            }
            Ok((next, true))
        }
        Err(err) => {
            eprintln!("error: {err}");
            Ok((state, false))
        }
    }
}

async fn interactive(
    mut state: SessionState,
    mut input: RoiInput,
    services: &Services,
    locale: &CurrencyLocale,
    json: bool,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("edit with field=value; ... (empty line recalculates, 'quit' exits)");

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        match apply_edits(&input, line) {
            Ok(edited) => input = edited,
            Err(err) => {
                eprintln!("error: {err}");
                continue;
            }
        }
        (state, _) = run_once(state, &input, services, locale, json).await?;
    }

    debug!(submissions = state.submissions, status = %state.sync_status, "session ended");
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init_default_logging();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    apply_logging(&cli, &settings)?;

    let locale = settings.currency_locale();
    let services = Services::connect(&settings, &build_registry()).await;

    if let Some(limit) = cli.history {
        let gateway = services
            .gateway()
            .context("history needs a reachable sync backend")?;
        let rows = gateway.recent_reports(limit).await?;
        print!("{}", dashboard::render_history(&rows, &locale));
        return Ok(ExitCode::SUCCESS);
    }

    let input = cli.input();
    let (state, accepted) = run_once(SessionState::new(), &input, &services, &locale, cli.json).await?;

    if cli.interactive {
        interactive(state, input, &services, &locale, cli.json).await?;
        return Ok(ExitCode::SUCCESS);
    }

    info!(status = %state.sync_status, "done");
    Ok(if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
