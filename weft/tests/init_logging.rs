//! Installs a test-writer tracing subscriber before any test in the binary runs.
//!
//! Pull it in with `mod init_logging;`. Filter comes from `RUST_LOG` (default
//! `weft=warn`), e.g. `RUST_LOG=weft=debug cargo test -p weft -- --nocapture` shows
//! every node step, tool call and model request.

use ctor::ctor;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[ctor]
fn install_test_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("weft=warn"));
    let layer = tracing_subscriber::fmt::layer()
        .with_test_writer()
        .with_target(true)
        .with_filter(filter);
    let _ = tracing_subscriber::registry().with(layer).try_init();
}
