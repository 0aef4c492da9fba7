//! SiteBudget command-line importer.
//!
//! Validates and imports budget spreadsheets, and prints blank import
//! templates for each supported layout.

mod reader;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use sitebudget_core::budget::{
    BudgetImportService, FormulaPolicy, ImportError, InMemoryBudgetItemStore, LayoutKind,
    rollup_by_cost_code, total_billing, total_budget,
};
use sitebudget_shared::types::LocationId;
use sitebudget_shared::{AppConfig, ImportSettings};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::report::{ImportReport, OutputFormat, TemplateFormat};

#[derive(Parser)]
#[command(name = "sitebudget")]
#[command(author, version, about = "Budget sheet validator and importer", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a budget sheet and report every problem
    Validate {
        /// Sheet file (.xlsx, .xls, .ods, .csv or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        import: ImportArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Validate, compute and import a budget sheet into a location
    Import {
        /// Sheet file (.xlsx, .xls, .ods, .csv or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Target location id (a new id is generated when omitted)
        #[arg(long)]
        location: Option<LocationId>,

        #[command(flatten)]
        import: ImportArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Print a blank import template
    Template {
        /// Column layout
        #[arg(short, long)]
        layout: Option<LayoutKind>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: TemplateFormat,
    },
}

/// Overrides for the configured import settings.
#[derive(Args)]
struct ImportArgs {
    /// Column layout (generic, project_v1, project_v2)
    #[arg(short, long)]
    layout: Option<LayoutKind>,

    /// Hourly labor rate
    #[arg(long)]
    labor_rate: Option<Decimal>,

    /// Formula policy (recompute, prefer_sheet)
    #[arg(long)]
    policy: Option<FormulaPolicy>,
}

impl ImportArgs {
    fn apply(self, mut settings: ImportSettings) -> ImportSettings {
        if let Some(layout) = self.layout {
            settings.layout = layout.name().to_string();
            settings.columns.clear();
        }
        if let Some(rate) = self.labor_rate {
            settings.labor_rate = rate;
        }
        if let Some(policy) = self.policy {
            settings.formula_policy = policy.name().to_string();
        }
        settings
    }
}

fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Validate {
            file,
            import,
            format,
        } => validate(&file, import.apply(config.import), format),
        Commands::Import {
            file,
            location,
            import,
            format,
        } => import_sheet(
            &file,
            location.unwrap_or_default(),
            import.apply(config.import),
            format,
        ),
        Commands::Template { layout, format } => {
            let layout = match layout {
                Some(kind) => kind.layout(),
                None => BudgetImportService::from_settings(&config.import)?
                    .layout()
                    .clone(),
            };
            print!("{}", report::render_template(&layout.template(), format)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "sitebudget=info,sitebudget_core=info",
        1 => "sitebudget=debug,sitebudget_core=debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn validate(file: &Path, settings: ImportSettings, format: OutputFormat) -> Result<ExitCode> {
    let service = BudgetImportService::from_settings(&settings)?;
    let sheet = reader::read_sheet(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    debug!(rows = sheet.len(), layout = service.layout().name(), "Read sheet");

    let report = service.validate(&sheet);
    print!("{}", report::render_validation(&report, format)?);

    Ok(if report.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn import_sheet(
    file: &Path,
    location_id: LocationId,
    settings: ImportSettings,
    format: OutputFormat,
) -> Result<ExitCode> {
    let service = BudgetImportService::from_settings(&settings)?;
    let sheet = reader::read_sheet(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    info!(
        file = %file.display(),
        layout = service.layout().name(),
        labor_rate = %service.engine().labor_rate(),
        policy = %service.engine().policy(),
        "Importing budget sheet"
    );

    let mut store = InMemoryBudgetItemStore::new();
    let summary = match service.import_for_location(location_id, &sheet, &mut store) {
        Ok(summary) => summary,
        Err(ImportError::Rejected(report)) => {
            print!("{}", report::render_validation(&report, format)?);
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    let items = store.items_for(location_id);
    let rollup = rollup_by_cost_code(items);

    let output = report::render_import(
        &ImportReport {
            summary: &summary,
            items,
            rollup: &rollup,
            budget_total: total_budget(items),
            billing_total: total_billing(items),
        },
        format,
    )?;
    print!("{output}");

    Ok(ExitCode::SUCCESS)
}
