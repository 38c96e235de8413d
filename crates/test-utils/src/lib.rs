pub mod builders;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use inotools::Inotools;
use inotools::fs::mock::MockFileSystem;
use inotools::transport::MockTransport;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=inotools=trace cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// A session over a fresh mock transport and mock filesystem.
///
/// The returned mocks share state with the ones inside the session.
pub fn mock_session() -> (Inotools, MockTransport, MockFileSystem) {
    init_tracing();
    let transport = MockTransport::new();
    let fs = MockFileSystem::new();
    let session = Inotools::with_transport(transport.clone(), fs.clone());
    (session, transport, fs)
}
