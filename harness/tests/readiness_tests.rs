//! Readiness probe: bounded polling of the agent's swagger document

mod common;

use common::fixtures::*;
use harness::errors::harness_error;
use harness::{HarnessError, ReadinessProbe};
use reqwest::Client;
use std::time::Duration;

const PROBE_PATH: &str = "/api/docs/swagger.json";

#[tokio::test]
async fn test_ready_on_first_poll() {
    let mock = MockAdminServer::start().await;
    mock.mock_ready().await;

    fast_probe()
        .wait_ready(&Client::new(), &mock.base_url)
        .await
        .unwrap();

    assert_eq!(mock.request_count(PROBE_PATH).await, 1);
}

#[tokio::test]
async fn test_ready_after_agent_finishes_starting() {
    let mock = MockAdminServer::start().await;
    mock.mock_starting(6).await;
    mock.mock_ready().await;

    fast_probe()
        .wait_ready(&Client::new(), &mock.base_url)
        .await
        .unwrap();

    assert_eq!(mock.request_count(PROBE_PATH).await, 7);
}

#[tokio::test]
async fn test_ready_on_last_allowed_poll() {
    let mock = MockAdminServer::start().await;
    mock.mock_starting(9).await;
    mock.mock_ready().await;

    fast_probe()
        .wait_ready(&Client::new(), &mock.base_url)
        .await
        .unwrap();

    assert_eq!(mock.request_count(PROBE_PATH).await, 10);
}

#[tokio::test]
async fn test_times_out_after_ten_polls() {
    let mock = MockAdminServer::start().await;
    mock.mock_never_ready().await;

    let err = fast_probe()
        .wait_ready(&Client::new(), &mock.base_url)
        .await
        .unwrap_err();

    assert_eq!(
        harness_error(&err),
        Some(&HarnessError::StartupTimeout { attempts: 10 })
    );
    assert_eq!(mock.request_count(PROBE_PATH).await, 10);
}

#[tokio::test]
async fn test_ready_too_late_still_times_out() {
    let mock = MockAdminServer::start().await;
    mock.mock_starting(10).await;
    mock.mock_ready().await;

    let err = fast_probe()
        .wait_ready(&Client::new(), &mock.base_url)
        .await
        .unwrap_err();

    assert!(matches!(
        harness_error(&err),
        Some(HarnessError::StartupTimeout { .. })
    ));
}

#[tokio::test]
async fn test_connection_refused_counts_as_failed_attempt() {
    let probe = ReadinessProbe::new(3, Duration::from_millis(5));

    let err = probe
        .wait_ready(&Client::new(), "http://127.0.0.1:1")
        .await
        .unwrap_err();

    assert_eq!(
        harness_error(&err),
        Some(&HarnessError::StartupTimeout { attempts: 3 })
    );
}

#[tokio::test]
async fn test_hanging_admin_api_still_times_out() {
    let mock = MockAdminServer::start().await;
    mock.mock_hanging(Duration::from_secs(3)).await;
    let probe = ReadinessProbe::new(3, Duration::from_millis(50));

    let err = tokio::time::timeout(
        Duration::from_secs(2),
        probe.wait_ready(&Client::new(), &mock.base_url),
    )
    .await
    .expect("readiness wait hung on a stalled request")
    .unwrap_err();

    assert_eq!(
        harness_error(&err),
        Some(&HarnessError::StartupTimeout { attempts: 3 })
    );
}

#[tokio::test]
async fn test_foreign_service_is_rejected() {
    let mock = MockAdminServer::start().await;
    mock.mock_foreign_service().await;

    let err = fast_probe()
        .wait_ready(&Client::new(), &mock.base_url)
        .await
        .unwrap_err();

    assert_eq!(
        harness_error(&err),
        Some(&HarnessError::UnexpectedProbeResponse)
    );
}

#[test]
fn test_default_budget() {
    let probe = ReadinessProbe::default();
    assert_eq!(probe.attempts, 10);
    assert_eq!(probe.interval, Duration::from_secs(2));
}
