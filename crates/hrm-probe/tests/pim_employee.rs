//! PIM > Employee List and Add Employee.

#![cfg(feature = "browser")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::check;
use hrm_probe::data::{
    random_string, EmployeeTestData, NewEmployee, PersonalDetailsUpdate, PimSearchCriteria,
};
use hrm_probe::harness::{INTEGRATION, REGRESSION, SMOKE};
use hrm_probe::pages::{EmployeePage, HeaderPage, Module, PimPage};
use hrm_probe::{authenticated, ProbeResult, Scenario, Session};

async fn open_pim(session: &Session) -> ProbeResult<PimPage> {
    authenticated(session).await?;
    let pim = PimPage::new(session);
    pim.goto().await?;
    Ok(pim)
}

fn unique_employee() -> NewEmployee {
    NewEmployee {
        first_name: format!("Test{}", random_string(5)),
        last_name: format!("Employee{}", random_string(5)),
        ..EmployeeTestData::minimal_employee()
    }
}

#[tokio::test]
async fn pim_employee_management() {
    let Some(mut runner) = common::runner("pim_employee").await else {
        return;
    };

    runner
        .run(
            &Scenario::new("Should add new employee successfully")
                .tagged(SMOKE)
                .tagged(INTEGRATION),
            |session| async move {
                let pim = open_pim(&session).await?;
                pim.click_add_employee().await?;

                let employee = unique_employee();
                let page = EmployeePage::new(&session);
                page.add_employee(&employee).await?;
                page.verify_success_message().await?;
                page.verify_page_loaded().await?;

                let full_name = page.full_name().await?;
                let saved = full_name.contains(&employee.first_name)
                    && full_name.contains(&employee.last_name);
                check(session.logger(), "employee name saved", saved)
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should search employee by name").tagged(REGRESSION),
            |session| async move {
                let pim = open_pim(&session).await?;
                let name = PimSearchCriteria::by_name().employee_name.unwrap_or_default();
                pim.search_employee_by_name(&name).await?;
                let count = pim.employee_count().await?;
                session
                    .logger()
                    .step("Search results", Some(&format!("Rows: {count}")));
                Ok(())
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should search employee by ID").tagged(REGRESSION),
            |session| async move {
                let pim = open_pim(&session).await?;
                let id = PimSearchCriteria::by_id().employee_id.unwrap_or_default();
                pim.search_employee_by_id(&id).await?;
                let count = pim.employee_count().await?;
                session
                    .logger()
                    .step("Search results", Some(&format!("Rows: {count}")));
                Ok(())
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should edit employee details").tagged(INTEGRATION),
            |session| async move {
                let pim = open_pim(&session).await?;
                pim.click_add_employee().await?;
                let employee = unique_employee();
                let page = EmployeePage::new(&session);
                page.add_employee(&employee).await?;
                page.verify_success_message().await?;

                pim.goto().await?;
                pim.click_employee_row(&employee.first_name).await?;
                page.edit_personal_details(&PersonalDetailsUpdate {
                    middle_name: Some("Updated".to_string()),
                    ..PersonalDetailsUpdate::default()
                })
                .await?;
                page.verify_success_message().await
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should search with multiple criteria").tagged(REGRESSION),
            |session| async move {
                let pim = open_pim(&session).await?;
                pim.search_employee(&PimSearchCriteria::multiple_criteria())
                    .await?;
                let count = pim.employee_count().await?;
                session
                    .logger()
                    .step("Search results", Some(&format!("Rows: {count}")));
                Ok(())
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should reset search form").tagged(REGRESSION),
            |session| async move {
                let pim = open_pim(&session).await?;
                pim.search_employee_by_name("Test").await?;
                pim.reset_search().await?;
                let filter = pim.employee_name_filter().await?;
                check(session.logger(), "name filter is empty", filter.is_empty())
            },
        )
        .await;

    runner
        .run(
            &Scenario::new("Should navigate to PIM from header menu").tagged(SMOKE),
            |session| async move {
                authenticated(&session).await?;
                HeaderPage::new(&session).navigate_to(Module::Pim).await?;
                PimPage::new(&session).verify_page_loaded().await?;
                let url = session.current_url().await?;
                check(session.logger(), "URL contains /pim", url.contains("/pim"))
            },
        )
        .await;

    common::finish(&runner);
}
