use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dashboard::{
    ChartKind, DashboardConfig, DashboardRequest, DashboardSession, DetailRequest, Page, PageReport,
};
use market_core::{ExecutionType, FlowColumn, InvestorClass, Section};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Vietnamese equity market dashboards", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the DASHBOARD_* environment variables
#[derive(Args)]
pub struct SourceArgs {
    #[arg(long, global = true)]
    pub volume: Option<PathBuf>,
    #[arg(long, global = true)]
    pub price: Option<PathBuf>,
    #[arg(long, global = true)]
    pub market_cap: Option<PathBuf>,
    #[arg(long, global = true)]
    pub sector: Option<PathBuf>,
    #[arg(long, global = true)]
    pub investor: Option<PathBuf>,
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,
    /// Drop rows outside --from/--to while reading the wide files
    #[arg(long, global = true)]
    pub bounded: bool,
}

#[derive(Args)]
pub struct WindowArgs {
    /// First day (YYYY-MM-DD), defaults to the earliest date in the data
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD), defaults to the latest date in the data
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Chart to include; repeat for several. All charts of the page when omitted
    #[arg(long = "chart", value_enum)]
    pub charts: Vec<ChartKind>,
    /// Write the page as JSON here instead of printing a summary
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trading value, market cap and technical signals
    Market(WindowArgs),
    /// Net flows by industry and investor class
    Overview(WindowArgs),
    /// One investor class and execution type in detail
    Detail {
        #[command(flatten)]
        window: WindowArgs,
        /// individual, foreign, institution or proprietary
        #[arg(long, default_value = "foreign")]
        class: InvestorClass,
        /// matched or negotiated
        #[arg(long, default_value = "matched")]
        execution: ExecutionType,
    },
}

impl SourceArgs {
    fn apply(self, config: &mut DashboardConfig) {
        if let Some(path) = self.volume {
            config.volume_path = path;
        }
        if let Some(path) = self.price {
            config.price_path = path;
        }
        if let Some(path) = self.market_cap {
            config.market_cap_path = Some(path);
        }
        if let Some(path) = self.sector {
            config.sector_path = path;
        }
        if let Some(path) = self.investor {
            config.investor_path = path;
        }
        if let Some(size) = self.chunk_size.filter(|&n| n > 0) {
            config.chunk_size = size;
        }
        config.bounded_loads |= self.bounded;
    }
}

type Span = Option<(NaiveDate, NaiveDate)>;

/// Resolve the window, loading the data span only for a missing endpoint
fn build_request(
    page: Page,
    window: &WindowArgs,
    span: impl FnOnce() -> anyhow::Result<Span>,
) -> anyhow::Result<DashboardRequest> {
    let (start, end) = match (window.from, window.to) {
        (Some(from), Some(to)) => (from, to),
        (from, to) => match span()? {
            Some((first, last)) => (from.unwrap_or(first), to.unwrap_or(last)),
            None => anyhow::bail!("No dated rows in the source files; pass --from and --to"),
        },
    };
    let request = DashboardRequest::new(page, start, end)
        .context("Invalid date range")?
        .with_charts(&window.charts);
    Ok(request)
}

fn emit<B: Serialize>(report: &PageReport<B>, output: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = output {
        let json = serde_json::to_string_pretty(report).context("Failed to serialize page")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {:?} page to {}", report.page, path.display());
    }

    match &report.bundle {
        Section::Skipped(reason) => println!("{:?}: {}", report.page, reason.notice()),
        Section::Ready(_) => {
            let pages = report.manifest.as_ref().map(|m| m.pages.len()).unwrap_or(0);
            println!("{:?}: {} of {} charts ready", report.page, pages, report.charts.len());
            for page in report.manifest.iter().flat_map(|m| &m.pages) {
                println!("  - {}", page.title);
            }
        }
    }
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = DashboardConfig::default();
    cli.sources.apply(&mut config);
    let session = DashboardSession::new(config);

    match cli.command {
        Commands::Market(window) => {
            let request = build_request(Page::Market, &window, || {
                session.market_date_span().context("Failed to load market data")
            })?;
            let report = session.market(&request).context("Failed to load market data")?;
            emit(&report, window.output.as_deref())
        }
        Commands::Overview(window) => {
            let request = build_request(Page::Overview, &window, || {
                session.investor_date_span().context("Failed to load investor flows")
            })?;
            let report = session.overview(&request).context("Failed to load investor flows")?;
            emit(&report, window.output.as_deref())
        }
        Commands::Detail {
            window,
            class,
            execution,
        } => {
            let detail = DetailRequest {
                request: build_request(Page::Detail, &window, || {
                    session.investor_date_span().context("Failed to load investor flows")
                })?,
                column: FlowColumn::new(class, execution),
            };
            let report = session.detail(&detail).context("Failed to load investor flows")?;
            emit(&report, window.output.as_deref())
        }
    }
}
