//! HTTP checks against the live deployment. No browser involved.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{api_client, check};
use hrm_probe::pages::{DASHBOARD_PATH, LOGIN_PATH};
use hrm_probe::RequestOptions;

#[tokio::test]
async fn login_page_returns_200() {
    let Some((api, _logger)) = api_client("api").await else {
        return;
    };
    let response = api.get(LOGIN_PATH, &RequestOptions::default()).await.unwrap();
    api.verify_status(&response, 200).unwrap();
}

#[tokio::test]
async fn dashboard_endpoint_is_reachable() {
    let Some((api, logger)) = api_client("api").await else {
        return;
    };
    let response = api
        .get(DASHBOARD_PATH, &RequestOptions::default())
        .await
        .unwrap();
    check(
        &logger,
        &format!("dashboard status {} is expected", response.status),
        [200, 302, 401, 403].contains(&response.status),
    )
    .unwrap();
}

#[tokio::test]
async fn login_page_has_content_type() {
    let Some((api, logger)) = api_client("api").await else {
        return;
    };
    let response = api.get(LOGIN_PATH, &RequestOptions::default()).await.unwrap();
    let content_type = response.header("content-type").unwrap_or_default();
    logger.step("Content type", Some(content_type));
    check(&logger, "content-type header present", !content_type.is_empty()).unwrap();
}

#[tokio::test]
async fn missing_endpoint_is_handled() {
    let Some((api, logger)) = api_client("api").await else {
        return;
    };
    let response = api
        .get("/web/index.php/nonexistent/endpoint", &RequestOptions::default())
        .await
        .unwrap();
    check(
        &logger,
        &format!("status {} for a missing page", response.status),
        [404, 302, 200].contains(&response.status),
    )
    .unwrap();
}
