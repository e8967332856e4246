mod commands;
mod config;

use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};

use civic_core::Portal;
use civic_types::events::NoticeLevel;

use crate::config::Args;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays parseable JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civic=info,civic_core=info,civic_db=info".into()),
        )
        .init();

    let args = Args::parse();
    debug!("{:?}", args);

    let db = Arc::new(civic_db::Database::open(&args.db_path)?);
    let mut portal = Portal::open(db, args.portal_config())?;
    if let Some(user) = portal.current_user() {
        info!("Acting as {} ({})", user.email, user.role);
    }

    let mut notices = portal.notices().subscribe();
    let outcome = commands::run(&mut portal, args.command);

    while let Ok(notice) = notices.try_recv() {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{}] {}", tag, notice.message);
    }

    let output = outcome?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
