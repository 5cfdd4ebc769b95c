//! BDD step definitions for service builder and lifecycle feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use review_notifier::config::Config;
use review_notifier::io::HttpClient;
use review_notifier::ServiceBuilder;

use crate::world::ReviewNotifierWorld;

fn config_with_credentials() -> Config {
    let mut config = Config::default();
    config.api.endpoint = "http://api.test/homework_statuses/".to_string();
    config.api.token = "api-token".to_string();
    config.telegram.api_base = "http://telegram.test".to_string();
    config.telegram.token = "bot-token".to_string();
    config.telegram.chat_id = "42".to_string();
    config
}

fn build_service_builder(world: &mut ReviewNotifierWorld) -> ServiceBuilder {
    let config = world.config.clone().expect("config not set");
    let http = world.http();

    let mut builder = ServiceBuilder::new(config).with_http_client(http as Arc<dyn HttpClient>);
    if let Some(cancel) = world.cancel.clone() {
        builder = builder.with_cancellation_token(cancel);
    }
    builder
}

// --- Given steps ---

#[given("a config without credentials")]
fn config_without_credentials(world: &mut ReviewNotifierWorld) {
    world.config = Some(Config::default());
}

#[given("a config with credentials")]
fn config_with_creds(world: &mut ReviewNotifierWorld) {
    world.config = Some(config_with_credentials());
}

#[given(expr = "a config with credentials starting from date {int}")]
fn config_with_creds_from(world: &mut ReviewNotifierWorld, from_date: i64) {
    let mut config = config_with_credentials();
    config.polling.from_date = Some(from_date);
    world.config = Some(config);
}

#[given("a pre-cancelled cancellation token")]
fn pre_cancelled_token(world: &mut ReviewNotifierWorld) {
    let token = CancellationToken::new();
    token.cancel();
    world.cancel = Some(token);
}

// --- When steps ---

#[when("the service is built")]
async fn service_is_built(world: &mut ReviewNotifierWorld) {
    let builder = build_service_builder(world);
    world.build_error = builder.build().await.err();
}

#[when("the service is built and started")]
async fn service_is_built_and_started(world: &mut ReviewNotifierWorld) {
    let builder = build_service_builder(world);
    match builder.build().await {
        Ok(service) => {
            world.start_succeeded = Some(service.start().await.is_ok());
        }
        Err(e) => {
            world.build_error = Some(e);
            world.start_succeeded = Some(false);
        }
    }
}

#[when("the service runs until the responses are exhausted")]
async fn service_runs_until_exhausted(world: &mut ReviewNotifierWorld) {
    let cancel = CancellationToken::new();
    world.http().cancel_when_drained(cancel.clone()).await;
    world.cancel = Some(cancel);

    let builder = build_service_builder(world);
    let service = builder.build().await.expect("service should build");
    let result = tokio::time::timeout(Duration::from_secs(10), service.start())
        .await
        .expect("service did not stop after the responses ran out");
    world.start_succeeded = Some(result.is_ok());
}

// --- Then steps ---

#[then(expr = "the build should fail naming {string}")]
fn build_fails_naming(world: &mut ReviewNotifierWorld, name: String) {
    let err = world.build_error.as_ref().expect("expected build to fail");
    assert!(err.to_string().contains(&name), "{err}");
}

#[then("the service should stop cleanly")]
fn service_stops_cleanly(world: &mut ReviewNotifierWorld) {
    assert!(
        world.build_error.is_none(),
        "unexpected build error: {:?}",
        world.build_error
    );
    assert_eq!(world.start_succeeded, Some(true), "expected start to succeed");
}

#[then(expr = "the API should have been called with header {string} set to {string}")]
async fn api_called_with_header(world: &mut ReviewNotifierWorld, name: String, value: String) {
    let gets = world.http().gets().await;
    let first = gets.first().expect("the API was never queried");
    assert!(
        first.headers.iter().any(|(k, v)| *k == name && *v == value),
        "expected {}: {} in {:?}",
        name,
        value,
        first.headers
    );
    assert_eq!(first.url, "http://api.test/homework_statuses/");
}
