mod dashboard;
mod logging;
mod report;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use salescast_core::{
    compare_actuals, data_dir, month_name, parse_month, sales_trend, ActualComparison,
    DatasetLoader, FileTargetRepository, ForecastReport, ForecastTarget, ForecastUseCase,
    HistoricalDataset, Settings, SpreadsheetLoader, TargetService,
};

#[derive(Parser)]
#[command(name = "salescast")]
#[command(about = "Weekday-average monthly sales forecasting", long_about = None)]
struct Cli {
    /// Directory holding settings.json and targets.json (default: $SALESCAST_HOME or ~/.salescast)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct PeriodArgs {
    /// Target month, as 1-12 or a month name (default: month of --today)
    #[arg(long)]
    month: Option<String>,
    /// Target year (default: year of --today)
    #[arg(long)]
    year: Option<i32>,
    /// Reference date as YYYY-MM-DD (default: local date)
    #[arg(long)]
    today: Option<String>,
}

struct Period {
    month: u32,
    year: i32,
    today: NaiveDate,
}

impl PeriodArgs {
    fn resolve(&self) -> Result<Period> {
        self.resolve_with(Local::now().date_naive())
    }

    /// `local_today` stands in for `--today` when the flag is absent.
    fn resolve_with(&self, local_today: NaiveDate) -> Result<Period> {
        let today = match &self.today {
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| anyhow!("Invalid --today '{}', expected YYYY-MM-DD", s))?,
            None => local_today,
        };
        let month = match &self.month {
            Some(m) => parse_month(m)?,
            None => today.month(),
        };
        let year = self.year.unwrap_or(today.year());
        Ok(Period { month, year, today })
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show average sales per weekday across historical files
    Weekdays {
        /// Historical sales files (.csv, .xlsx, .xls)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// List historical daily totals in date order
    History {
        /// Historical sales files (.csv, .xlsx, .xls)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Forecast a month from historical files
    Forecast {
        #[command(flatten)]
        period: PeriodArgs,
        /// Historical sales files (.csv, .xlsx, .xls)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Monthly target for this run, overriding any stored target
        #[arg(long)]
        target: Option<f64>,
        /// Current month's actual sales, compared against the projection
        #[arg(long)]
        actual: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Open the terminal dashboard
    Dashboard {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        target: Option<f64>,
        /// Current month's actual sales, charted against the projection
        #[arg(long)]
        actual: Option<PathBuf>,
    },
    /// Manage stored monthly targets
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },
}

#[derive(clap::Subcommand)]
enum TargetAction {
    /// Store a monthly target
    Set {
        #[command(flatten)]
        period: PeriodArgs,
        amount: f64,
    },
    /// Show the stored target
    Show {
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Remove the stored target
    Clear {
        #[command(flatten)]
        period: PeriodArgs,
    },
}

fn load_datasets(loader: &SpreadsheetLoader, files: &[PathBuf]) -> Result<Vec<HistoricalDataset>> {
    files.iter().map(|p| loader.load(p)).collect()
}

fn override_target(amount: Option<f64>) -> Result<Option<ForecastTarget>> {
    amount
        .map(|a| {
            ForecastTarget::new(a).ok_or_else(|| anyhow!("Target must be a non-negative amount, got {}", a))
        })
        .transpose()
}

fn load_comparison(
    loader: &SpreadsheetLoader,
    report: &ForecastReport,
    actual: Option<&PathBuf>,
) -> Result<Option<ActualComparison>> {
    actual
        .map(|path| Ok(compare_actuals(report, &loader.load(path)?)))
        .transpose()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let dir = data_dir(cli.data_dir.clone())?;
    tracing::debug!(dir = %dir.display(), "using data directory");
    let loader = SpreadsheetLoader::new(Settings::load(&dir)?);
    let target_repo = FileTargetRepository::new(Some(dir.clone()))?;

    match cli.command {
        Commands::Weekdays { files, json } => {
            let datasets = load_datasets(&loader, &files)?;
            let averages = salescast_core::aggregate_weekdays(&datasets)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&averages)?);
            } else {
                report::print_weekdays(&averages);
            }
        }
        Commands::History { files, json } => {
            let datasets = load_datasets(&loader, &files)?;
            let trend = sales_trend(&datasets);
            if json {
                println!("{}", serde_json::to_string_pretty(&trend)?);
            } else {
                report::print_trend(&trend);
            }
        }
        Commands::Forecast { period, files, target, actual, json } => {
            let period = period.resolve()?;
            let datasets = load_datasets(&loader, &files)?;
            let outcome = ForecastUseCase::new(&target_repo).run(
                &datasets,
                period.month,
                period.year,
                period.today,
                override_target(target)?,
            )?;
            let comparison = load_comparison(&loader, &outcome.report, actual.as_ref())?;

            if json {
                let body = serde_json::json!({
                    "today": period.today.to_string(),
                    "weekday_averages": outcome.weekday_averages,
                    "report": outcome.report,
                    "comparison": comparison,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                report::print_weekdays(&outcome.weekday_averages);
                report::print_forecast(&outcome.report, period.today);
                if let Some(cmp) = &comparison {
                    report::print_comparison(cmp);
                }
            }
        }
        Commands::Dashboard { period, files, target, actual } => {
            let period = period.resolve()?;
            let datasets = load_datasets(&loader, &files)?;
            let outcome = ForecastUseCase::new(&target_repo).run(
                &datasets,
                period.month,
                period.year,
                period.today,
                override_target(target)?,
            )?;
            let comparison = load_comparison(&loader, &outcome.report, actual.as_ref())?;
            dashboard::run(dashboard::DashboardApp {
                averages: outcome.weekday_averages,
                trend: sales_trend(&datasets),
                report: outcome.report,
                comparison,
                today: period.today,
            })?;
        }
        Commands::Target { action } => {
            let service = TargetService::new(target_repo);
            match action {
                TargetAction::Set { period, amount } => {
                    let p = period.resolve()?;
                    let target = service.set_target(p.year, p.month, amount)?;
                    println!(
                        "Target set for {} {}: {:.2}",
                        month_name(p.month),
                        p.year,
                        target.monthly_amount
                    );
                }
                TargetAction::Show { period } => {
                    let p = period.resolve()?;
                    match service.get_target(p.year, p.month)? {
                        Some(t) => println!("{} {}: {:.2}", month_name(p.month), p.year, t.monthly_amount),
                        None => println!("{} {}: not set", month_name(p.month), p.year),
                    }
                }
                TargetAction::Clear { period } => {
                    let p = period.resolve()?;
                    if service.clear_target(p.year, p.month)? {
                        println!("Target cleared for {} {}.", month_name(p.month), p.year);
                    } else {
                        println!("No target stored for {} {}.", month_name(p.month), p.year);
                    }
                }
            }
        }
    }
    Ok(())
}
