//! Admin > User Management > Users (`/web/index.php/admin/viewSystemUsers`).

use super::{
    button, dropdown, table_has_results, table_rows, toast, ADMIN_USERS_PATH, SETTLE_TIMEOUT,
};
use crate::data::{NewUser, UserSearchCriteria};
use crate::driver::SelectOption;
use crate::locator::Locator;
use crate::page_object::{BasePage, PageObject};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use std::time::Duration;

/// The search button can take a while to render on a cold demo instance
const SEARCH_BUTTON_TIMEOUT: Duration = Duration::from_secs(60);

/// How long the employee-name autocomplete gets to offer a suggestion
const SUGGESTION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AdminPage {
    base: BasePage,
    add_button: Locator,
    search_button: Locator,
    reset_button: Locator,
    username_search: Locator,
    role_dropdown: Locator,
    employee_name_input: Locator,
    status_dropdown: Locator,
    confirm_delete: Locator,
    username_input: Locator,
    password_input: Locator,
    confirm_password_input: Locator,
    save_button: Locator,
}

impl AdminPage {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, "AdminPage"),
            add_button: button("button", "Add"),
            search_button: button("button[type=\"submit\"]", "Search")
                .or(button("button", "Search"))
                .first(),
            reset_button: button("button[type=\"button\"]", "Reset")
                .or(button("button", "Reset"))
                .first(),
            username_search: Locator::new("input[placeholder*=\"Username\"]").first(),
            role_dropdown: dropdown(0),
            employee_name_input: Locator::new("input[placeholder*=\"Employee Name\"]"),
            status_dropdown: dropdown(1),
            confirm_delete: Locator::new("button.oxd-button--label-danger.orangehrm-button-margin"),
            username_input: Locator::new("input[autocomplete=\"off\"]").first(),
            password_input: Locator::new("input[type=\"password\"]").nth(0),
            confirm_password_input: Locator::new("input[type=\"password\"]").nth(1),
            save_button: button("button[type=\"submit\"]", "Save"),
        }
    }

    pub async fn goto(&self) -> ProbeResult<()> {
        self.base.navigate_to(ADMIN_USERS_PATH).await?;
        self.base
            .logger()
            .step("Navigated to Admin > User Management", None);
        Ok(())
    }

    pub async fn click_add_user(&self) -> ProbeResult<()> {
        self.base.click(&self.add_button).await?;
        self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
        self.base.logger().step("Clicked Add User button", None);
        Ok(())
    }

    pub async fn search_user_by_username(&self, username: &str) -> ProbeResult<()> {
        self.base
            .guarded("User search", async {
                self.base
                    .logger()
                    .step("Searching for user", Some(&format!("Username: {username}")));
                self.base.type_text(&self.username_search, username).await?;
                self.submit_search(SEARCH_BUTTON_TIMEOUT).await
            })
            .await
    }

    /// Apply every filter the criteria set, then search.
    ///
    /// An employee name without a matching suggestion is left as typed.
    pub async fn search_user(&self, criteria: &UserSearchCriteria) -> ProbeResult<()> {
        self.base
            .guarded("User search", async {
                let summary = serde_json::to_string(criteria)?;
                self.base
                    .logger()
                    .step("Searching for user with criteria", Some(&summary));
                let timeout = self.base.action_timeout();

                if let Some(username) = &criteria.username {
                    self.base.type_text(&self.username_search, username).await?;
                }
                if let Some(role) = &criteria.user_role {
                    let option = SelectOption::label(role.as_str());
                    self.base
                        .safe_select(&self.role_dropdown, &option, timeout)
                        .await?;
                }
                if let Some(name) = &criteria.employee_name {
                    self.base.type_text(&self.employee_name_input, name).await?;
                    self.base.pick_first_suggestion(SUGGESTION_TIMEOUT).await?;
                }
                if let Some(status) = &criteria.status {
                    let option = SelectOption::label(status.as_str());
                    self.base
                        .safe_select(&self.status_dropdown, &option, timeout)
                        .await?;
                }
                self.submit_search(timeout).await
            })
            .await
    }

    async fn submit_search(&self, timeout: Duration) -> ProbeResult<()> {
        self.base.click_with_safety(&self.search_button, timeout, false).await?;
        self.base.wait_for_network_idle(self.base.action_timeout()).await?;
        self.base.logger().step("User search completed", None);
        Ok(())
    }

    /// Open the add form, fill it and save.
    ///
    /// Fails with [`ProbeError::PrerequisiteMissing`] when the employee name
    /// matches no existing employee.
    pub async fn add_user(&self, user: &NewUser) -> ProbeResult<()> {
        self.base
            .guarded("Add user", async {
                self.base
                    .logger()
                    .step("Adding new user", Some(&format!("Username: {}", user.username)));
                let timeout = self.base.action_timeout();

                self.base.click(&self.add_button).await?;
                self.base.wait_for_network_idle(timeout).await?;

                let option = SelectOption::label(user.user_role.as_str());
                self.base
                    .safe_select(&self.role_dropdown, &option, timeout)
                    .await?;
                self.base
                    .type_text(&self.employee_name_input, &user.employee_name)
                    .await?;
                if !self.base.pick_first_suggestion(SUGGESTION_TIMEOUT).await?.is_found() {
                    return Err(ProbeError::PrerequisiteMissing {
                        what: format!("employee named {:?}", user.employee_name),
                    });
                }
                let option = SelectOption::label(user.status.as_str());
                self.base
                    .safe_select(&self.status_dropdown, &option, timeout)
                    .await?;
                self.base.type_text(&self.username_input, &user.username).await?;
                self.base.type_text(&self.password_input, &user.password).await?;
                self.base
                    .type_text(&self.confirm_password_input, &user.password)
                    .await?;

                self.base.click(&self.save_button).await?;
                self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
                self.base.logger().step("User added successfully", None);
                Ok(())
            })
            .await
    }

    /// Search for `username` and delete its row
    pub async fn delete_user(&self, username: &str) -> ProbeResult<()> {
        self.base
            .guarded("Delete user", async {
                self.base
                    .logger()
                    .step("Deleting user", Some(&format!("Username: {username}")));
                self.search_user_by_username(username).await?;
                if !table_has_results(&self.base).await? {
                    return Err(ProbeError::PrerequisiteMissing {
                        what: format!("User {username} not found"),
                    });
                }

                let row = Locator::new(".oxd-table-row").with_text(username);
                if !self.base.is_visible(&row).await? {
                    return Err(ProbeError::action(
                        "delete",
                        &row,
                        format!("User row not found for {username}"),
                    ));
                }
                let delete = row.locator("button.oxd-button--label-danger").first();
                self.base.click(&delete).await?;
                self.base.click(&self.confirm_delete).await?;
                self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
                self.base.logger().step("User deleted successfully", None);
                Ok(())
            })
            .await
    }

    /// Search for `username`; true when the table has at least one row
    pub async fn verify_user_exists(&self, username: &str) -> ProbeResult<bool> {
        self.search_user_by_username(username).await?;
        table_has_results(&self.base).await
    }

    /// Rows currently listed in the users table
    pub async fn user_count(&self) -> ProbeResult<usize> {
        self.base.count(&table_rows()).await
    }

    /// Current text of the username filter
    pub async fn username_filter(&self) -> ProbeResult<String> {
        self.base.driver().input_value(&self.username_search).await
    }

    pub async fn reset_search(&self) -> ProbeResult<()> {
        self.base.click(&self.reset_button).await?;
        self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
        self.base.logger().step("Search form reset", None);
        Ok(())
    }

    /// Wait for the success toast
    pub async fn verify_success_message(&self) -> ProbeResult<()> {
        self.base
            .wait_for_visible(&toast(), self.base.action_timeout())
            .await?;
        self.base.logger().step("Success message verified", None);
        Ok(())
    }
}

impl PageObject for AdminPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> &'static str {
        ADMIN_USERS_PATH
    }

    fn page_name(&self) -> &'static str {
        "AdminPage"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::data::UserManagementTestData;
    use crate::driver::{MockDriver, MockEffect, MockElement};
    use crate::page_object::tests::mock_session;
    use crate::pages::no_records_found;
    use std::sync::Arc;

    const OPTION: &str = ".oxd-select-dropdown [role=\"option\"]";
    const SUGGESTION: &str = ".oxd-autocomplete-option";

    fn setup() -> (Arc<MockDriver>, AdminPage) {
        let (driver, session) = mock_session();
        let page = AdminPage::new(&session);
        (driver, page)
    }

    fn search_form(driver: &MockDriver, page: &AdminPage, results: &[MockEffect]) {
        driver.insert(&page.username_search, MockElement::visible("input"));
        let mut search = MockElement::visible("button");
        for effect in results {
            search = search.on_click(effect.clone());
        }
        driver.insert(&page.search_button, search);
    }

    fn option(label: &str) -> Locator {
        Locator::new(OPTION).with_text(label)
    }

    mod search_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_search_by_username_and_found() {
            let (driver, page) = setup();
            search_form(&driver, &page, &[MockEffect::Show(table_rows())]);

            assert!(page.verify_user_exists("Admin").await.unwrap());
            assert_eq!(page.username_filter().await.unwrap(), "Admin");
            assert_eq!(page.user_count().await.unwrap(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_search_with_no_records() {
            let (driver, page) = setup();
            search_form(&driver, &page, &[MockEffect::Show(no_records_found())]);

            assert!(!page.verify_user_exists("ghost").await.unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_search_by_criteria_applies_each_filter() {
            let (driver, page) = setup();
            search_form(&driver, &page, &[]);
            driver.insert(
                &page.role_dropdown,
                MockElement::visible("div").on_click(MockEffect::Show(option("Admin"))),
            );
            driver.insert(
                &page.status_dropdown,
                MockElement::visible("div").on_click(MockEffect::Show(option("Enabled"))),
            );

            page.search_user(&UserManagementTestData::search_criteria())
                .await
                .unwrap();
            assert!(driver.was_called(&format!("click:{}", option("Admin"))));
            assert!(driver.was_called(&format!("click:{}", option("Enabled"))));
            assert!(driver.was_called(&format!("click:{}", page.search_button)));
        }

        #[tokio::test(start_paused = true)]
        async fn test_employee_name_without_suggestion_is_soft() {
            let (driver, page) = setup();
            search_form(&driver, &page, &[]);
            driver.insert(&page.employee_name_input, MockElement::visible("input"));

            let criteria = UserSearchCriteria {
                employee_name: Some("Nobody".into()),
                ..UserSearchCriteria::default()
            };
            page.search_user(&criteria).await.unwrap();
            assert!(!driver.was_called(&format!("click:css={SUGGESTION}")));
        }
    }

    mod add_user_tests {
        use super::*;

        fn add_form(driver: &MockDriver, page: &AdminPage) {
            driver.insert(&page.add_button, MockElement::visible("button"));
            driver.insert(
                &page.role_dropdown,
                MockElement::visible("div").on_click(MockEffect::Show(option("Admin"))),
            );
            driver.insert(
                &page.status_dropdown,
                MockElement::visible("div").on_click(MockEffect::Show(option("Enabled"))),
            );
            driver.insert(&page.employee_name_input, MockElement::visible("input"));
            driver.insert(&page.username_input, MockElement::visible("input"));
            driver.insert(&page.password_input, MockElement::visible("input"));
            driver.insert(&page.confirm_password_input, MockElement::visible("input"));
            driver.insert(
                &page.save_button,
                MockElement::visible("button").on_click(MockEffect::Show(toast())),
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_add_user_fills_form_and_saves() {
            let (driver, page) = setup();
            add_form(&driver, &page);
            driver.insert(&Locator::new(SUGGESTION), MockElement::visible("div"));

            let user = UserManagementTestData::new_user();
            page.add_user(&user).await.unwrap();
            page.verify_success_message().await.unwrap();

            assert_eq!(driver.element(&page.username_input).unwrap().value, user.username);
            assert_eq!(driver.element(&page.password_input).unwrap().value, user.password);
            assert_eq!(
                driver.element(&page.confirm_password_input).unwrap().value,
                user.password
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_add_user_without_employee_is_prerequisite_missing() {
            let (driver, page) = setup();
            add_form(&driver, &page);

            let err = page
                .add_user(&UserManagementTestData::new_user())
                .await
                .unwrap_err();
            assert!(err.is_skip());
            assert!(!driver.was_called(&format!("click:{}", page.save_button)));
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_toast_fails_verification() {
            let (_driver, page) = setup();
            assert!(page.verify_success_message().await.unwrap_err().is_timeout());
        }
    }

    mod delete_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_delete_missing_user() {
            let (driver, page) = setup();
            search_form(&driver, &page, &[MockEffect::Show(no_records_found())]);

            let err = page.delete_user("ghost").await.unwrap_err();
            assert!(err.is_skip());
            assert!(err.to_string().contains("User ghost not found"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_delete_clicks_row_button_and_confirms() {
            let (driver, page) = setup();
            search_form(&driver, &page, &[MockEffect::Show(table_rows())]);
            let row = Locator::new(".oxd-table-row").with_text("testuser");
            let delete = row.locator("button.oxd-button--label-danger").first();
            driver.insert(&row, MockElement::visible("div"));
            driver.insert(
                &delete,
                MockElement::visible("button")
                    .on_click(MockEffect::Show(page.confirm_delete.clone())),
            );
            driver.insert(
                &page.confirm_delete,
                MockElement::hidden("button").on_click(MockEffect::Remove(row.clone())),
            );

            page.delete_user("testuser").await.unwrap();
            assert!(driver.was_called(&format!("click:{}", page.confirm_delete)));
            assert!(driver.element(&row).is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn test_reset_search() {
            let (driver, page) = setup();
            driver.insert(&page.reset_button, MockElement::visible("button"));
            page.reset_search().await.unwrap();
            assert!(driver.was_called(&format!("click:{}", page.reset_button)));
        }
    }
}
