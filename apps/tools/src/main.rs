use std::sync::Arc;

use anyhow::Result;
use attribution::{AttributionConfig, AttributionService, PageContext};
use chrono::Utc;
use clap::{Parser, Subcommand};
use storage::{normalize_cookie_jar_url, IdentityStore, SqliteCookieJar};

#[derive(Parser, Debug)]
struct Cli {
    /// SQLite URL or file path. Defaults to the jar the booking app uses.
    #[arg(long)]
    cookie_jar_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every live cookie with its expiry.
    List,
    /// Remove one cookie, or all of them.
    Clear {
        name: Option<String>,
    },
    /// Resolve the visitor identity the way a booking would, creating
    /// missing cookies.
    Identity {
        #[arg(long, default_value = "http://localhost/")]
        page_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cookie_jar_url =
        normalize_cookie_jar_url(cli.cookie_jar_url.as_deref().unwrap_or_default());
    let jar = SqliteCookieJar::open(&cookie_jar_url).await?;
    jar.health_check().await?;

    match cli.command {
        Command::List => {
            let cookies = jar.list(Utc::now()).await?;
            if cookies.is_empty() {
                println!("cookie jar is empty");
            }
            for cookie in cookies {
                println!(
                    "{}={} path={} expires={}",
                    cookie.name,
                    cookie.value,
                    cookie.path,
                    cookie.expires_at.to_rfc3339()
                );
            }
        }
        Command::Clear { name: Some(name) } => {
            let removed = jar.remove(&name).await?;
            println!("removed {name}: {removed}");
        }
        Command::Clear { name: None } => {
            let removed = jar.clear().await?;
            println!("removed {removed} cookies");
        }
        Command::Identity { page_url } => {
            let page = PageContext::parse(&page_url, "tools")?;
            let service = AttributionService::new(AttributionConfig::default(), page, Arc::new(jar));
            let identity = service.resolve_identity().await;
            println!("external_id={}", identity.external_id);
            println!("fbp={}", identity.browser_id);
            println!("fbc={}", identity.click_id.as_deref().unwrap_or("<none>"));
        }
    }

    Ok(())
}
