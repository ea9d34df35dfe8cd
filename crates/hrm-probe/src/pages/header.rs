//! Top bar and side menu, present on every authenticated page.

use super::SETTLE_TIMEOUT;
use crate::locator::Locator;
use crate::page_object::BasePage;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::{wait_for_url, UrlPattern};
use std::fmt;
use std::time::Duration;

/// Budget for landing back on the login page after logout
const LOGOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Side-menu modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Admin,
    Pim,
    Leave,
    Time,
    Recruitment,
    MyInfo,
    Performance,
    Dashboard,
    Directory,
    Maintenance,
    Claim,
    Buzz,
}

impl Module {
    pub const ALL: [Self; 12] = [
        Self::Admin,
        Self::Pim,
        Self::Leave,
        Self::Time,
        Self::Recruitment,
        Self::MyInfo,
        Self::Performance,
        Self::Dashboard,
        Self::Directory,
        Self::Maintenance,
        Self::Claim,
        Self::Buzz,
    ];

    /// Path segment of the module's URLs
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Pim | Self::MyInfo => "pim",
            Self::Leave => "leave",
            Self::Time => "time",
            Self::Recruitment => "recruitment",
            Self::Performance => "performance",
            Self::Dashboard => "dashboard",
            Self::Directory => "directory",
            Self::Maintenance => "maintenance",
            Self::Claim => "claim",
            Self::Buzz => "buzz",
        }
    }

    /// First side-menu link pointing into the module
    #[must_use]
    pub fn menu_link(self) -> Locator {
        let href = match self {
            Self::MyInfo => "viewMyDetails",
            other => other.segment(),
        };
        Locator::new(format!("a[href*=\"{href}\"]")).first()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "Admin",
            Self::Pim => "PIM",
            Self::Leave => "Leave",
            Self::Time => "Time",
            Self::Recruitment => "Recruitment",
            Self::MyInfo => "My Info",
            Self::Performance => "Performance",
            Self::Dashboard => "Dashboard",
            Self::Directory => "Directory",
            Self::Maintenance => "Maintenance",
            Self::Claim => "Claim",
            Self::Buzz => "Buzz",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct HeaderPage {
    base: BasePage,
    user_dropdown: Locator,
    user_name: Locator,
    logout_link: Locator,
    search_input: Locator,
}

impl HeaderPage {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, "HeaderPage"),
            user_dropdown: Locator::new(".oxd-userdropdown-tab"),
            user_name: Locator::new(".oxd-userdropdown-name"),
            logout_link: Locator::new("a").with_text("Logout"),
            search_input: Locator::new("input[placeholder=\"Search\"]"),
        }
    }

    /// Open the user menu, click Logout and wait for the login page
    pub async fn logout(&self) -> ProbeResult<()> {
        self.base
            .guarded("Logout", async {
                self.base.logger().step("Performing logout", None);
                self.base.click(&self.user_dropdown).await?;
                self.base
                    .wait_for_visible(&self.logout_link, self.base.action_timeout())
                    .await?;
                self.base.click(&self.logout_link).await?;
                wait_for_url(
                    self.base.driver(),
                    &UrlPattern::contains("/auth/login"),
                    LOGOUT_TIMEOUT,
                )
                .await?;
                self.base.wait_for_dom_ready(LOGOUT_TIMEOUT).await?;
                self.base.logger().step("Logout completed", None);
                Ok(())
            })
            .await
    }

    /// Click the module's side-menu link and wait for its URL
    pub async fn navigate_to(&self, module: Module) -> ProbeResult<()> {
        self.base
            .guarded(&format!("Navigation to {module}"), async {
                self.base.click(&module.menu_link()).await?;
                wait_for_url(
                    self.base.driver(),
                    &UrlPattern::contains(format!("/{}/", module.segment())),
                    self.base.settings().navigation_timeout,
                )
                .await?;
                self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
                self.base
                    .logger()
                    .step(&format!("Navigated to {module} module"), None);
                Ok(())
            })
            .await
    }

    /// Type into the side-menu search box and press Enter
    pub async fn search(&self, query: &str) -> ProbeResult<()> {
        self.base.type_text(&self.search_input, query).await?;
        self.base.driver().press("Enter").await?;
        self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
        self.base
            .logger()
            .step("Performed search", Some(&format!("Query: {query}")));
        Ok(())
    }

    pub async fn verify_user_dropdown_visible(&self) -> ProbeResult<()> {
        self.base
            .wait_for_visible(&self.user_dropdown, self.base.action_timeout())
            .await?;
        self.base.logger().step("User dropdown verified as visible", None);
        Ok(())
    }

    /// Display name shown on the user menu tab
    pub async fn username(&self) -> ProbeResult<String> {
        self.base.get_text(&self.user_name).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{BrowserDriver, MockEffect, MockElement};
    use crate::page_object::tests::mock_session;

    const BASE: &str = "https://opensource-demo.orangehrmlive.com";

    mod module_tests {
        use super::*;

        #[test]
        fn test_menu_link() {
            assert_eq!(
                Module::Pim.menu_link().to_string(),
                "css=a[href*=\"pim\"]"
            );
            assert_eq!(
                Module::MyInfo.menu_link().to_string(),
                "css=a[href*=\"viewMyDetails\"]"
            );
            assert_eq!(Module::MyInfo.segment(), "pim");
        }

        #[test]
        fn test_display() {
            assert_eq!(Module::Pim.to_string(), "PIM");
            assert_eq!(Module::ALL.len(), 12);
        }
    }

    mod header_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_logout_returns_to_login() {
            let (driver, session) = mock_session();
            let header = HeaderPage::new(&session);
            driver.set_url(&format!("{BASE}/web/index.php/dashboard/index"));
            driver.insert(
                &header.user_dropdown,
                MockElement::visible("span").on_click(MockEffect::Show(header.logout_link.clone())),
            );
            driver.insert(
                &header.logout_link,
                MockElement::hidden("a").on_click(MockEffect::Navigate(format!(
                    "{BASE}/web/index.php/auth/login"
                ))),
            );

            header.logout().await.unwrap();
            assert!(driver
                .current_url()
                .await
                .unwrap()
                .ends_with("/auth/login"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_logout_without_menu_fails() {
            let (_driver, session) = mock_session();
            let header = HeaderPage::new(&session);
            assert!(header.logout().await.unwrap_err().is_timeout());
        }

        #[tokio::test(start_paused = true)]
        async fn test_navigate_to_module() {
            let (driver, session) = mock_session();
            let header = HeaderPage::new(&session);
            driver.insert(
                &Module::Admin.menu_link(),
                MockElement::visible("a").on_click(MockEffect::Navigate(format!(
                    "{BASE}/web/index.php/admin/viewAdminModule"
                ))),
            );

            header.navigate_to(Module::Admin).await.unwrap();
            assert!(driver.was_called("click:css=a[href*=\"admin\"]"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_search_presses_enter() {
            let (driver, session) = mock_session();
            let header = HeaderPage::new(&session);
            driver.insert(&header.search_input, MockElement::visible("input"));

            header.search("PIM").await.unwrap();
            assert_eq!(driver.element(&header.search_input).unwrap().value, "PIM");
            assert!(driver.was_called("press:Enter"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_username_reads_dropdown_name() {
            let (driver, session) = mock_session();
            let header = HeaderPage::new(&session);
            driver.insert(&header.user_dropdown, MockElement::visible("span"));
            driver.insert(
                &header.user_name,
                MockElement::visible("p").with_text(" Paul Collings "),
            );

            header.verify_user_dropdown_visible().await.unwrap();
            assert_eq!(header.username().await.unwrap(), "Paul Collings");
            assert!(!driver.was_called("click:"));
        }
    }
}
