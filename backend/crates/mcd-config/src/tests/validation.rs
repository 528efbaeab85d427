use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, err, ok};
use serial_test::serial;

fn load_with(key: &'static str, value: &str) -> (Config, EnvGuard) {
    let guard = EnvGuard::set(key, value);
    (Config::load().unwrap(), guard)
}

#[test]
#[serial]
fn given_defaults_when_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_artifact_name_with_separator_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_ARTIFACT_NAME", "../escape");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_empty_binary_name_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_BINARY_NAME", "  ");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_poll_interval_below_minimum_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_UPDATE_POLL_INTERVAL_SECS", "59");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_poll_interval_at_minimum_when_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_UPDATE_POLL_INTERVAL_SECS", "60");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_notice_interval_over_limit_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_SHUTDOWN_NOTICE_INTERVAL_SECS", "61");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_zero_countdown_notices_when_validate_then_ok() {
    // Given - zero notices makes graceful behave like immediate
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_SHUTDOWN_COUNTDOWN_NOTICES", "0");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_liveness_interval_too_small_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_LIVENESS_INTERVAL_MS", "1");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_webhook_port_zero_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_WEBHOOK_PORT", "0");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_webhook_port_zero_but_disabled_when_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();
    let _disabled = EnvGuard::set("MCD_WEBHOOK_ENABLED", "false");
    let (config, _guard) = load_with("MCD_WEBHOOK_PORT", "0");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_non_http_discord_url_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_DISCORD_WEBHOOK_URL", "discord.com/api/webhooks/1");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_non_http_version_page_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let (config, _guard) = load_with("MCD_VERSION_PAGE_URL", "file:///tmp/page.html");

    // When
    let result = config.validate();

    // Then
    assert_that!(result, err(anything()));
}
