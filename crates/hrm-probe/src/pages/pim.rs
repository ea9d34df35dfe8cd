//! PIM > Employee List (`/web/index.php/pim/viewEmployeeList`).

use super::{button, dropdown, table_has_results, table_rows, PIM_LIST_PATH, SETTLE_TIMEOUT};
use crate::data::EmployeeSearchCriteria;
use crate::driver::SelectOption;
use crate::locator::Locator;
use crate::page_object::{BasePage, PageObject};
use crate::result::ProbeResult;
use crate::session::Session;
use std::time::Duration;

const SUGGESTION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct PimPage {
    base: BasePage,
    header: Locator,
    add_button: Locator,
    search_button: Locator,
    reset_button: Locator,
    employee_name_input: Locator,
    employee_id_input: Locator,
    employment_status: Locator,
    include: Locator,
    supervisor_name_input: Locator,
    job_title: Locator,
    sub_unit: Locator,
}

impl PimPage {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, "PimPage"),
            header: Locator::new("h6").with_text("Employee Information"),
            add_button: button("button", "Add"),
            search_button: button("button[type=\"submit\"]", "Search"),
            reset_button: button("button[type=\"button\"]", "Reset"),
            employee_name_input: Locator::new("input[placeholder*=\"Employee Name\"]").first(),
            employee_id_input: Locator::xpath(
                "//label[normalize-space()='Employee Id']/../following-sibling::div//input",
            ),
            employment_status: dropdown(0),
            include: dropdown(1),
            supervisor_name_input: Locator::new("input[placeholder*=\"Supervisor Name\"]"),
            job_title: dropdown(2),
            sub_unit: dropdown(3),
        }
    }

    pub async fn goto(&self) -> ProbeResult<()> {
        self.base.navigate_to(PIM_LIST_PATH).await?;
        self.base
            .wait_for_visible(&self.header, self.base.settings().navigation_timeout)
            .await?;
        self.base.logger().step("Navigated to PIM > Employee List", None);
        Ok(())
    }

    pub async fn click_add_employee(&self) -> ProbeResult<()> {
        self.base.click(&self.add_button).await?;
        self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
        self.base.logger().step("Clicked Add Employee button", None);
        Ok(())
    }

    /// Type the name, take the first suggestion if any, and search
    pub async fn search_employee_by_name(&self, name: &str) -> ProbeResult<()> {
        self.base
            .guarded("Employee search", async {
                self.base
                    .logger()
                    .step("Searching for employee", Some(&format!("Name: {name}")));
                self.type_with_suggestion(&self.employee_name_input, name).await?;
                self.submit_search().await
            })
            .await
    }

    pub async fn search_employee_by_id(&self, id: &str) -> ProbeResult<()> {
        self.base
            .guarded("Employee search", async {
                self.base
                    .logger()
                    .step("Searching for employee", Some(&format!("ID: {id}")));
                self.base.type_text(&self.employee_id_input, id).await?;
                self.submit_search().await
            })
            .await
    }

    /// Apply every filter the criteria set, then search
    pub async fn search_employee(&self, criteria: &EmployeeSearchCriteria) -> ProbeResult<()> {
        self.base
            .guarded("Employee search", async {
                let summary = serde_json::to_string(criteria)?;
                self.base
                    .logger()
                    .step("Searching for employee with criteria", Some(&summary));
                let timeout = self.base.action_timeout();

                if let Some(name) = &criteria.employee_name {
                    self.type_with_suggestion(&self.employee_name_input, name).await?;
                }
                if let Some(id) = &criteria.employee_id {
                    self.base.type_text(&self.employee_id_input, id).await?;
                }
                for (value, select) in [
                    (&criteria.employment_status, &self.employment_status),
                    (&criteria.include, &self.include),
                ] {
                    if let Some(label) = value {
                        self.base
                            .safe_select(select, &SelectOption::label(label.as_str()), timeout)
                            .await?;
                    }
                }
                if let Some(supervisor) = &criteria.supervisor_name {
                    self.type_with_suggestion(&self.supervisor_name_input, supervisor)
                        .await?;
                }
                for (value, select) in [
                    (&criteria.job_title, &self.job_title),
                    (&criteria.sub_unit, &self.sub_unit),
                ] {
                    if let Some(label) = value {
                        self.base
                            .safe_select(select, &SelectOption::label(label.as_str()), timeout)
                            .await?;
                    }
                }
                self.submit_search().await
            })
            .await
    }

    async fn type_with_suggestion(&self, input: &Locator, text: &str) -> ProbeResult<()> {
        self.base.type_text(input, text).await?;
        self.base.pick_first_suggestion(SUGGESTION_TIMEOUT).await?;
        Ok(())
    }

    async fn submit_search(&self) -> ProbeResult<()> {
        self.base.click(&self.search_button).await?;
        self.base
            .wait_for_network_idle(self.base.action_timeout())
            .await?;
        self.base.logger().step("Employee search completed", None);
        Ok(())
    }

    /// Search by name; true when at least one row is listed
    pub async fn verify_employee_exists(&self, name: &str) -> ProbeResult<bool> {
        self.search_employee_by_name(name).await?;
        table_has_results(&self.base).await
    }

    /// Data rows currently listed
    pub async fn employee_count(&self) -> ProbeResult<usize> {
        self.base.count(&table_rows()).await
    }

    /// Search by name and open the first matching row
    pub async fn click_employee_row(&self, name: &str) -> ProbeResult<()> {
        self.base
            .guarded("Opening employee row", async {
                self.search_employee_by_name(name).await?;
                let row = Locator::new(".oxd-table-row").with_text(name).first();
                self.base.click(&row).await?;
                self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
                self.base
                    .logger()
                    .step("Clicked employee row", Some(&format!("Name: {name}")));
                Ok(())
            })
            .await
    }

    /// Current text of the employee name filter
    pub async fn employee_name_filter(&self) -> ProbeResult<String> {
        self.base.driver().input_value(&self.employee_name_input).await
    }

    pub async fn reset_search(&self) -> ProbeResult<()> {
        self.base.click(&self.reset_button).await?;
        self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
        self.base.logger().step("Search form reset", None);
        Ok(())
    }

    pub async fn verify_page_loaded(&self) -> ProbeResult<()> {
        self.base
            .wait_for_visible(&self.header, self.base.action_timeout())
            .await?;
        self.base.logger().step("PIM page verified as loaded", None);
        Ok(())
    }
}

impl PageObject for PimPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> &'static str {
        PIM_LIST_PATH
    }

    fn page_name(&self) -> &'static str {
        "PimPage"
    }
}
