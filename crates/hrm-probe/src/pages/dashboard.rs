//! Dashboard page (`/web/index.php/dashboard/index`).

use super::DASHBOARD_PATH;
use crate::locator::Locator;
use crate::page_object::{BasePage, PageObject};
use crate::result::ProbeResult;
use crate::session::Session;

const WIDGET_NAME: &str = ".orangehrm-dashboard-widget-name";

/// Title locator of a dashboard widget
fn widget(name: &str) -> Locator {
    Locator::new(WIDGET_NAME).with_text(name)
}

#[derive(Debug, Clone)]
pub struct DashboardPage {
    base: BasePage,
    header: Locator,
    time_at_work: Locator,
    my_actions: Locator,
    quick_launch: Locator,
}

impl DashboardPage {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, "DashboardPage"),
            header: Locator::new(".oxd-topbar-header-breadcrumb-module"),
            time_at_work: widget("Time at Work"),
            my_actions: widget("My Actions"),
            quick_launch: widget("Quick Launch"),
        }
    }

    pub async fn goto(&self) -> ProbeResult<()> {
        self.base.navigate_to(DASHBOARD_PATH).await?;
        self.base
            .wait_for_visible(&self.header, self.base.settings().navigation_timeout)
            .await?;
        self.base.logger().step("Navigated to dashboard", None);
        Ok(())
    }

    /// Wait for the breadcrumb header, which renders once the SPA shell is up
    pub async fn verify_page_loaded(&self) -> ProbeResult<()> {
        self.base
            .wait_for_visible(&self.header, self.base.settings().navigation_timeout)
            .await?;
        self.base.logger().step("Dashboard page verified as loaded", None);
        Ok(())
    }

    pub async fn header_text(&self) -> ProbeResult<String> {
        self.base.get_text(&self.header).await
    }

    pub async fn verify_time_at_work_widget(&self) -> ProbeResult<()> {
        self.verify_widget(&self.time_at_work, "Time at Work").await
    }

    pub async fn verify_my_actions_widget(&self) -> ProbeResult<()> {
        self.verify_widget(&self.my_actions, "My Actions").await
    }

    pub async fn verify_quick_launch_widget(&self) -> ProbeResult<()> {
        self.verify_widget(&self.quick_launch, "Quick Launch").await
    }

    async fn verify_widget(&self, locator: &Locator, name: &str) -> ProbeResult<()> {
        self.base
            .wait_for_visible(locator, self.base.action_timeout())
            .await?;
        self.base
            .logger()
            .step(&format!("{name} widget verified"), None);
        Ok(())
    }

    pub async fn verify_all_widgets(&self) -> ProbeResult<()> {
        self.base.logger().step("Verifying all dashboard widgets", None);
        self.verify_time_at_work_widget().await?;
        self.verify_my_actions_widget().await?;
        self.verify_quick_launch_widget().await?;
        self.base.logger().step("All dashboard widgets verified", None);
        Ok(())
    }

    /// Whether a widget titled `name` shows up within the probe timeout
    pub async fn is_widget_visible(&self, name: &str) -> ProbeResult<bool> {
        self.base.is_visible(&widget(name)).await
    }

    pub async fn widget_count(&self) -> ProbeResult<usize> {
        self.base
            .count(&Locator::new(".orangehrm-dashboard-widget"))
            .await
    }
}

impl PageObject for DashboardPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> &'static str {
        DASHBOARD_PATH
    }

    fn page_name(&self) -> &'static str {
        "DashboardPage"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockElement;
    use crate::page_object::tests::mock_session;

    #[tokio::test(start_paused = true)]
    async fn test_goto_and_header() {
        let (driver, session) = mock_session();
        let page = DashboardPage::new(&session);
        driver.insert(&page.header, MockElement::visible("h6").with_text("Dashboard"));

        page.goto().await.unwrap();
        assert!(page.is_current(&page.base.current_url().await.unwrap()));
        assert_eq!(page.header_text().await.unwrap(), "Dashboard");
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_widgets_verified() {
        let (driver, session) = mock_session();
        let page = DashboardPage::new(&session);
        for name in ["Time at Work", "My Actions", "Quick Launch"] {
            driver.insert(&widget(name), MockElement::visible("p"));
        }
        page.verify_all_widgets().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_widget_fails_verification() {
        let (driver, session) = mock_session();
        let page = DashboardPage::new(&session);
        driver.insert(&widget("Time at Work"), MockElement::visible("p"));

        let err = page.verify_all_widgets().await.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("My Actions"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_widget_probe_and_count() {
        let (driver, session) = mock_session();
        let page = DashboardPage::new(&session);
        driver.insert(&widget("Buzz Latest Posts"), MockElement::visible("p"));
        driver.insert(
            &Locator::new(".orangehrm-dashboard-widget"),
            MockElement::visible("div").with_matches(7),
        );

        assert!(page.is_widget_visible("Buzz Latest Posts").await.unwrap());
        assert!(!page.is_widget_visible("Legend").await.unwrap());
        assert_eq!(page.widget_count().await.unwrap(), 7);
    }
}
