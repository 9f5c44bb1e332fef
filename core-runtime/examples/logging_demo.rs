//! Logging setup demonstration
//!
//! ```bash
//! cargo run -p core-runtime --example logging_demo -- json
//! cargo run -p core-runtime --example logging_demo -- compact "core_playback=trace"
//! ```

use bridge_traits::time::LogLevel;
use core_runtime::logging::{init_logging, redact_query_param, LogFormat, LoggingConfig};
use std::env;
use tracing::{debug, info, warn};

fn main() {
    let args: Vec<String> = env::args().collect();
    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Debug);
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    if let Err(e) = init_logging(config) {
        eprintln!("failed to initialise logging: {}", e);
        return;
    }

    let url = "https://www.googleapis.com/youtube/v3/search?q=lofi+music&key=demo-key";
    info!(target: "core_service", "player core starting");
    debug!(target: "core_catalog", url = %redact_query_param(url, "key"), "catalog request");
    warn!(target: "core_playback::adapter", op = "getDuration", "engine returned NaN");
}
