//! Dashboard widgets.

#![cfg(feature = "browser")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::check;
use hrm_probe::harness::{REGRESSION, SMOKE};
use hrm_probe::{authenticated, Scenario};

#[tokio::test]
async fn dashboard_functionality() {
    let Some(mut runner) = common::runner("dashboard").await else {
        return;
    };

    runner
        .run(
            &Scenario::new("Should display all main widgets")
                .tagged(SMOKE)
                .tagged(REGRESSION),
            |session| async move {
                let (_login, dashboard) = authenticated(&session).await?;
                dashboard.goto().await?;
                dashboard.verify_page_loaded().await?;
                dashboard.verify_time_at_work_widget().await?;
                dashboard.verify_my_actions_widget().await?;
                dashboard.verify_quick_launch_widget().await
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should verify widget count").tagged(REGRESSION),
            |session| async move {
                let (_login, dashboard) = authenticated(&session).await?;
                dashboard.goto().await?;
                let count = dashboard.widget_count().await?;
                session
                    .logger()
                    .step("Widget count", Some(&format!("Count: {count}")));
                check(session.logger(), "at least one widget", count > 0)
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should verify specific widgets are visible").tagged(REGRESSION),
            |session| async move {
                let (_login, dashboard) = authenticated(&session).await?;
                dashboard.goto().await?;
                dashboard.verify_all_widgets().await?;
                let header = dashboard.header_text().await?;
                check(session.logger(), "header reads Dashboard", header == "Dashboard")
            },
        )
        .await;

    common::finish(&runner);
}
