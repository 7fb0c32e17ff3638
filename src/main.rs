use feedline::{
    CancelToken, FeedClient, FeedConfig, FeedCursor, MatchFilters, MatchesStreamOptions,
    MatchingDirection,
};

use chrono::Utc;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DIRECTION_ENV: &str = "FEEDLINE_DIRECTION";

fn direction_from_env() -> Result<MatchingDirection> {
    match std::env::var(DIRECTION_ENV).ok().as_deref().map(str::trim) {
        None | Some("") => Ok(MatchingDirection::Offer),
        Some(raw) if raw.eq_ignore_ascii_case("offer") => Ok(MatchingDirection::Offer),
        Some(raw) if raw.eq_ignore_ascii_case("seek") => Ok(MatchingDirection::Seek),
        Some(raw) => Err(eyre!("{} must be Offer or Seek, got {:?}", DIRECTION_ENV, raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = FeedConfig::from_env()?;
    let pro_id = config
        .pro_id
        .clone()
        .ok_or_else(|| eyre!("{} must be set", feedline::config::PRO_ID_ENV))?;
    let direction = direction_from_env()?;
    let client = FeedClient::from_config(&config)?;

    let facts = client
        .get_facts_snapshot(&pro_id, 0)
        .await
        .wrap_err("loading facts snapshot")?;
    info!(count = facts.items.len(), cursor_id = facts.cursor_id, "Facts snapshot");

    let filters = MatchFilters::default();
    let snapshot = client
        .get_matches_snapshot(&pro_id, direction, &filters)
        .await
        .wrap_err("loading matches snapshot")?;
    info!(count = snapshot.items.len(), %direction, "Matches snapshot");

    let mut cursor = snapshot.cursor();
    if cursor.is_zero() {
        cursor = FeedCursor::new(Utc::now(), 0);
    }

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let options = MatchesStreamOptions::new(direction).with_filters(filters);
    let result = client
        .stream_matches(&cancel, &pro_id, cursor, &options, |update| {
            info!(
                count = update.items.len(),
                cursor_id = update.cursor_id,
                "Matches update"
            );
            for item in &update.items {
                info!(id = item.id, target = %item.target_pro_id, score = item.score, "Match");
            }
            Ok(())
        })
        .await;

    match result {
        Ok(()) => info!("Matches stream closed by server"),
        Err(err) if err.is_cancelled() => info!("Stopped"),
        Err(err) => {
            warn!(category = %err.category(), "Matches stream failed");
            return Err(err.into());
        }
    }

    Ok(())
}
