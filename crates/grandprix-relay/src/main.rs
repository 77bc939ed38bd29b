//! Grand Prix relay binary.
//!
//! Binds a WebSocket listener and serves quiz rooms until interrupted.
//! Without `--catalog` the bundled sample rounds are used.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use grandprix::prelude::*;
use tracing_subscriber::EnvFilter;

const SAMPLE_CATALOG: &str = include_str!("../catalog.sample.json");

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SeatPolicyArg {
    /// Refuse a third connection with `error` 409.
    Reject,
    /// Seat a third connection on the guest side.
    ShareGuest,
}

impl From<SeatPolicyArg> for SeatPolicy {
    fn from(arg: SeatPolicyArg) -> Self {
        match arg {
            SeatPolicyArg::Reject => SeatPolicy::Reject,
            SeatPolicyArg::ShareGuest => SeatPolicy::ShareGuest,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Relay server for two-player Grand Prix quiz rooms")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "GRANDPRIX_BIND", default_value = "127.0.0.1:1999")]
    bind: String,

    /// Path to a JSON round catalog
    #[arg(long, env = "GRANDPRIX_CATALOG")]
    catalog: Option<PathBuf>,

    /// What to do when a third client joins a full room
    #[arg(long, env = "GRANDPRIX_SEAT_POLICY", value_enum, default_value_t = SeatPolicyArg::Reject)]
    seat_policy: SeatPolicyArg,

    /// Seconds to wait for `session:hello`
    #[arg(long, env = "GRANDPRIX_HELLO_TIMEOUT_SECS", default_value_t = 5)]
    hello_timeout_secs: u64,

    /// Close connections silent for this many seconds
    #[arg(long, env = "GRANDPRIX_IDLE_TIMEOUT_SECS")]
    idle_timeout_secs: Option<u64>,
}

async fn load_catalog(path: Option<&PathBuf>) -> Result<Catalog, Box<dyn std::error::Error>> {
    let catalog = match path {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await?;
            let catalog = Catalog::from_json(&json)?;
            tracing::info!(path = %path.display(), rounds = catalog.rounds.len(), "catalog loaded");
            catalog
        }
        None => {
            let catalog = Catalog::from_json(SAMPLE_CATALOG)?;
            tracing::info!(rounds = catalog.rounds.len(), "using bundled sample catalog");
            catalog
        }
    };
    Ok(catalog)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let catalog = load_catalog(args.catalog.as_ref()).await?;

    let server = RelayServer::builder()
        .bind(&args.bind)
        .seat_policy(args.seat_policy.into())
        .hello_timeout(Duration::from_secs(args.hello_timeout_secs))
        .idle_timeout(args.idle_timeout_secs.map(Duration::from_secs))
        .build(Arc::new(catalog))
        .await?;

    let stop = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, shutting down");
            stop.shutdown();
        }
    });

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use grandprix_core::Round;

    use super::*;

    #[test]
    fn test_sample_catalog_parses() {
        let catalog = Catalog::from_json(SAMPLE_CATALOG).unwrap();
        assert_eq!(catalog.rounds.len(), 4);
        assert!(matches!(catalog.rounds[0], Round::MrMrs { .. }));
        assert!(matches!(catalog.rounds[3], Round::Race { .. }));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["grandprix-relay"]);
        assert_eq!(args.bind, "127.0.0.1:1999");
        assert!(args.catalog.is_none());
        assert!(matches!(args.seat_policy, SeatPolicyArg::Reject));
        assert!(args.idle_timeout_secs.is_none());
    }

    #[test]
    fn test_args_share_guest_flag() {
        let args = Args::parse_from(["grandprix-relay", "--seat-policy", "share-guest"]);
        assert_eq!(SeatPolicy::from(args.seat_policy), SeatPolicy::ShareGuest);
    }
}
