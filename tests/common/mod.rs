#![allow(dead_code)]

use std::time::Duration;

use rgenmedia::GenConfig;

pub const TEST_KEY: &str = "test-key";
pub const VIDEO_OPERATION: &str = "models/veo-test/operations/op-1";

pub fn should_skip_httpmock() -> bool {
    if can_bind_localhost() {
        return false;
    }
    eprintln!("skipping httpmock test: sandbox forbids binding to localhost");
    true
}

fn can_bind_localhost() -> bool {
    match std::net::TcpListener::bind(("127.0.0.1", 0)) {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => false,
        Err(err) => panic!("failed to bind localhost for httpmock tests: {err}"),
    }
}

pub fn test_config(base_url: String) -> GenConfig {
    GenConfig::new()
        .with_base_url(base_url)
        .with_models("gemini-test", "veo-test")
        .with_poll_interval(Duration::from_millis(10))
}
