#![allow(dead_code)]

pub mod mock_h2_server;
pub mod mock_server;
pub mod tls;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("orbit=debug")
        .with_test_writer()
        .try_init();
}
