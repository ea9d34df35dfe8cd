//! Admin > User Management.

#![cfg(feature = "browser")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::check;
use hrm_probe::data::{random_string, UserManagementTestData, UserSearchCriteria};
use hrm_probe::harness::{INTEGRATION, REGRESSION, SMOKE};
use hrm_probe::pages::{AdminPage, HeaderPage, Module};
use hrm_probe::{authenticated, ProbeResult, Scenario, Session};

async fn open_admin(session: &Session) -> ProbeResult<AdminPage> {
    authenticated(session).await?;
    let admin = AdminPage::new(session);
    admin.goto().await?;
    Ok(admin)
}

#[tokio::test]
async fn admin_user_management() {
    let Some(mut runner) = common::runner("admin_user_management").await else {
        return;
    };

    runner
        .run(
            &Scenario::new("Should search for existing user")
                .tagged(SMOKE)
                .tagged(REGRESSION),
            |session| async move {
                let admin = open_admin(&session).await?;
                let exists = admin.verify_user_exists("Admin").await?;
                check(session.logger(), "user Admin is listed", exists)?;
                let count = admin.user_count().await?;
                check(session.logger(), "at least one row", count > 0)
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should show no results for non-existent user").tagged(REGRESSION),
            |session| async move {
                let admin = open_admin(&session).await?;
                let username = format!("nonexistent_{}", random_string(10));
                let exists = admin.verify_user_exists(&username).await?;
                check(session.logger(), "no rows for an unknown user", !exists)
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should add new user successfully").tagged(INTEGRATION),
            |session| async move {
                let admin = open_admin(&session).await?;
                let mut user = UserManagementTestData::new_user();
                user.username = format!("testuser_{}", random_string(6));
                admin.add_user(&user).await?;
                admin.verify_success_message().await
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should search users with multiple criteria").tagged(REGRESSION),
            |session| async move {
                let admin = open_admin(&session).await?;
                let criteria = UserSearchCriteria {
                    username: Some("Admin".to_string()),
                    ..UserManagementTestData::search_criteria()
                };
                admin.search_user(&criteria).await?;
                let count = admin.user_count().await?;
                session
                    .logger()
                    .step("Search results", Some(&format!("Rows: {count}")));
                check(session.logger(), "at least one row", count > 0)
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should reset search form").tagged(REGRESSION),
            |session| async move {
                let admin = open_admin(&session).await?;
                admin.search_user_by_username("Admin").await?;
                admin.reset_search().await?;
                let filter = admin.username_filter().await?;
                check(session.logger(), "username filter is empty", filter.is_empty())
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should delete user successfully").tagged(INTEGRATION),
            |session| async move {
                let admin = open_admin(&session).await?;
                let username = format!("deleteuser_{}", random_string(6));
                admin.delete_user(&username).await?;
                admin.verify_success_message().await
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should navigate to Admin module from Dashboard").tagged(SMOKE),
            |session| async move {
                let (_login, dashboard) = authenticated(&session).await?;
                dashboard.verify_page_loaded().await?;
                HeaderPage::new(&session).navigate_to(Module::Admin).await?;
                let url = session.current_url().await?;
                check(session.logger(), "URL contains /admin", url.contains("/admin"))
            },
        )
        .await;

    common::finish(&runner);
}
