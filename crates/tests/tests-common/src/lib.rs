//! Fixtures shared by the tests of the workspace.

pub mod configuration;
pub mod schemas;
pub mod settings;

/// Send the logs of a test to the test output. Filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
