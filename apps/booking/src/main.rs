use std::sync::Arc;

use anyhow::{Context, Result};
use attribution::{AttributionService, LoggingPixel, PageContext};
use booking_flow::calendar::MonthCursor;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use shared::clock::{Clock, SystemClock};
use storage::{normalize_cookie_jar_url, SqliteCookieJar};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod session;
mod visitor;

use config::load_settings;
use session::run_session;
use visitor::BookingInput;

#[derive(Parser, Debug)]
#[command(about = "Book a strategy call from the command line")]
struct Cli {
    /// Page the visit lands on; ad click parameters are read from here.
    #[arg(long)]
    page_url: Option<String>,
    #[arg(long)]
    viewport_width: Option<u32>,
    #[arg(long)]
    cookie_jar: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through the booking flow and send the booking.
    Book(BookArgs),
    /// Print the month grid as the date picker shows it.
    Calendar {
        /// Any day in the month to show; defaults to today.
        #[arg(long)]
        month: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
struct BookArgs {
    /// e.g. 2026-10-20
    #[arg(long)]
    date: NaiveDate,
    /// One of the offered slots, e.g. "10:00 AM".
    #[arg(long)]
    time: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
}

impl From<BookArgs> for BookingInput {
    fn from(args: BookArgs) -> Self {
        Self {
            date: args.date,
            time: args.time,
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(page_url) = cli.page_url {
        settings.page_url = page_url;
    }
    if let Some(width) = cli.viewport_width {
        settings.viewport_width = width;
    }
    if let Some(cookie_jar) = cli.cookie_jar {
        settings.cookie_jar_url = cookie_jar;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let args = match cli.command {
        Command::Calendar { month } => {
            let today = clock.today();
            let cursor = MonthCursor::containing(month.unwrap_or(today));
            print!("{}", render::render_month(cursor, today, None));
            return Ok(());
        }
        Command::Book(args) => args,
    };

    let cookie_jar_url = normalize_cookie_jar_url(&settings.cookie_jar_url);
    let jar = SqliteCookieJar::open(&cookie_jar_url).await.map_err(|error| {
        error!(
            %cookie_jar_url,
            %error,
            "failed to open cookie jar; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let page = PageContext::parse(&settings.page_url, settings.user_agent.clone())
        .with_context(|| format!("invalid page url '{}'", settings.page_url))?;

    let service = AttributionService::new(settings.attribution_config(), page, Arc::new(jar))
        .with_clock(clock.clone())
        .with_pixel(Arc::new(LoggingPixel));
    info!(webhook_url = %settings.webhook_url, "booking page opened");

    let report = run_session(service, clock, settings.viewport_width, args.into()).await?;
    if report.deliveries.iter().all(|outcome| outcome.is_delivered()) {
        info!("all deliveries completed");
    }
    Ok(())
}
