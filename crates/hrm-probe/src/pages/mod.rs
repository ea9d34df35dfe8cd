//! Page objects for the OrangeHRM web application.

pub mod admin;
pub mod dashboard;
pub mod employee;
pub mod header;
pub mod login;
pub mod pim;

pub use admin::AdminPage;
pub use dashboard::DashboardPage;
pub use employee::EmployeePage;
pub use header::{HeaderPage, Module};
pub use login::{LoginField, LoginOutcome, LoginPage};
pub use pim::PimPage;

use crate::locator::Locator;
use crate::page_object::BasePage;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll, WaitOptions};
use std::time::Duration;

pub const LOGIN_PATH: &str = "/web/index.php/auth/login";
pub const DASHBOARD_PATH: &str = "/web/index.php/dashboard/index";
pub const ADMIN_USERS_PATH: &str = "/web/index.php/admin/viewSystemUsers";
pub const PIM_LIST_PATH: &str = "/web/index.php/pim/viewEmployeeList";
pub const PIM_ADD_PATH: &str = "/web/index.php/pim/addEmployee";

/// Budget for the `DOMContentLoaded` check after in-app clicks
pub(crate) const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Success toast shown after saves and deletes
pub(crate) fn toast() -> Locator {
    Locator::new(".oxd-text--toast-message")
}

/// Table placeholder when a search matches nothing
pub(crate) fn no_records_found() -> Locator {
    Locator::new(".oxd-text--span").with_text("No Records Found")
}

/// Data rows of the list table (the header row excluded)
pub(crate) fn table_rows() -> Locator {
    Locator::new(".oxd-table-body .oxd-table-row")
}

/// Nth `oxd-select` dropdown on the page
pub(crate) fn dropdown(index: usize) -> Locator {
    Locator::new(".oxd-select-text-input").nth(index)
}

/// Button by CSS and label
pub(crate) fn button(css: &str, label: &str) -> Locator {
    Locator::new(css).with_text(label)
}

/// Wait until a list table settles on either data rows or the
/// "No Records Found" placeholder; true when rows are listed
pub(crate) async fn table_has_results(base: &BasePage) -> ProbeResult<bool> {
    let driver = base.driver();
    let empty = no_records_found();
    let rows = table_rows();
    let (empty, rows) = (&empty, &rows);

    let probe = move || async move {
        let settled = if driver.element_state(empty).await?.visible {
            Some(false)
        } else if driver.count(rows).await? > 0 {
            Some(true)
        } else {
            None
        };
        Ok::<_, ProbeError>(settled)
    };
    let options = WaitOptions::with_timeout(base.action_timeout());
    let (found, _) = poll(options, "result table", "populated", probe).await?;
    Ok(found)
}
