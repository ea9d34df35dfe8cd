//! Add Employee form and the employee Personal Details page.

use super::{button, dropdown, toast, PIM_ADD_PATH, SETTLE_TIMEOUT};
use crate::data::{AdditionalDetails, Gender, NewEmployee, PersonalDetailsUpdate};
use crate::driver::SelectOption;
use crate::locator::Locator;
use crate::page_object::{BasePage, PageObject};
use crate::result::ProbeResult;
use crate::session::Session;

/// Input in the same form group as the label `text`
fn labelled_input(text: &str) -> Locator {
    Locator::xpath(format!(
        "//label[normalize-space()=\"{text}\"]/../following-sibling::div//input"
    ))
}

fn label(text: &str) -> Locator {
    Locator::xpath(format!("//label[normalize-space()=\"{text}\"]"))
}

#[derive(Debug, Clone)]
pub struct EmployeePage {
    base: BasePage,
    personal_details_header: Locator,
    first_name: Locator,
    middle_name: Locator,
    last_name: Locator,
    employee_id: Locator,
    save_button: Locator,
    edit_button: Locator,
    other_id: Locator,
    driver_license: Locator,
    license_expiry: Locator,
    ssn_number: Locator,
    sin_number: Locator,
    nationality: Locator,
    marital_status: Locator,
    date_of_birth: Locator,
    military_service: Locator,
    smoker_label: Locator,
    smoker_checkbox: Locator,
}

impl EmployeePage {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, "EmployeePage"),
            personal_details_header: Locator::new("h6").with_text("Personal Details"),
            first_name: Locator::new("input[name=\"firstName\"]"),
            middle_name: Locator::new("input[name=\"middleName\"]"),
            last_name: Locator::new("input[name=\"lastName\"]"),
            employee_id: labelled_input("Employee Id"),
            save_button: button("button[type=\"submit\"]", "Save").first(),
            edit_button: button("button", "Edit"),
            other_id: labelled_input("Other Id"),
            driver_license: labelled_input("Driver's License Number"),
            license_expiry: labelled_input("License Expiry Date"),
            ssn_number: labelled_input("SSN Number"),
            sin_number: labelled_input("SIN Number"),
            nationality: dropdown(0),
            marital_status: dropdown(1),
            date_of_birth: labelled_input("Date of Birth"),
            military_service: labelled_input("Military Service"),
            smoker_label: label("Yes"),
            smoker_checkbox: Locator::new("input[type=\"checkbox\"]").first(),
        }
    }

    pub async fn goto_add_employee(&self) -> ProbeResult<()> {
        self.base.navigate_to(PIM_ADD_PATH).await?;
        self.base.logger().step("Navigated to Add Employee page", None);
        Ok(())
    }

    /// Fill the Add Employee form and save.
    ///
    /// The employee id field comes prefilled with a generated id; it is
    /// replaced only when `employee.employee_id` is set.
    pub async fn add_employee(&self, employee: &NewEmployee) -> ProbeResult<()> {
        self.base
            .guarded("Add employee", async {
                self.base.logger().step(
                    "Adding new employee",
                    Some(&format!("Name: {}", employee.display_name())),
                );
                self.base.type_text(&self.first_name, &employee.first_name).await?;
                if let Some(middle) = &employee.middle_name {
                    self.base.type_text(&self.middle_name, middle).await?;
                }
                self.base.type_text(&self.last_name, &employee.last_name).await?;
                if let Some(id) = &employee.employee_id {
                    self.base.type_text(&self.employee_id, id).await?;
                }
                self.save().await?;
                self.base.logger().step("Employee added successfully", None);
                Ok(())
            })
            .await
    }

    /// Change the name fields that are set, then save
    pub async fn edit_personal_details(&self, updates: &PersonalDetailsUpdate) -> ProbeResult<()> {
        self.base
            .guarded("Edit employee", async {
                self.base
                    .logger()
                    .step("Editing employee personal details", None);
                self.enter_edit_mode().await?;
                for (value, input) in [
                    (&updates.first_name, &self.first_name),
                    (&updates.middle_name, &self.middle_name),
                    (&updates.last_name, &self.last_name),
                ] {
                    if let Some(text) = value {
                        self.base.type_text(input, text).await?;
                    }
                }
                self.save().await?;
                self.base
                    .logger()
                    .step("Employee details updated successfully", None);
                Ok(())
            })
            .await
    }

    /// Fill whichever additional fields are set, then save
    pub async fn fill_additional_details(&self, details: &AdditionalDetails) -> ProbeResult<()> {
        self.base
            .guarded("Filling additional details", async {
                self.base
                    .logger()
                    .step("Filling additional employee details", None);
                self.enter_edit_mode().await?;
                let timeout = self.base.action_timeout();

                for (value, input) in [
                    (&details.other_id, &self.other_id),
                    (&details.driver_license, &self.driver_license),
                    (&details.license_expiry_date, &self.license_expiry),
                    (&details.ssn_number, &self.ssn_number),
                    (&details.sin_number, &self.sin_number),
                ] {
                    if let Some(text) = value {
                        self.base.type_text(input, text).await?;
                    }
                }
                if let Some(nationality) = &details.nationality {
                    let option = SelectOption::label(nationality.as_str());
                    self.base
                        .safe_select(&self.nationality, &option, timeout)
                        .await?;
                }
                if let Some(status) = &details.marital_status {
                    let option = SelectOption::label(status.as_str());
                    self.base
                        .safe_select(&self.marital_status, &option, timeout)
                        .await?;
                }
                if let Some(dob) = &details.date_of_birth {
                    self.base.type_text(&self.date_of_birth, dob).await?;
                }
                if let Some(gender) = details.gender {
                    self.set_gender(gender).await?;
                }
                if let Some(service) = &details.military_service {
                    self.base.type_text(&self.military_service, service).await?;
                }
                if let Some(smoker) = details.smoker {
                    self.set_smoker(smoker).await?;
                }

                self.save().await?;
                self.base
                    .logger()
                    .step("Additional details saved successfully", None);
                Ok(())
            })
            .await
    }

    /// The radio inputs are hidden behind styled labels; click the label
    async fn set_gender(&self, gender: Gender) -> ProbeResult<()> {
        let value = match gender {
            Gender::Male => "1",
            Gender::Female => "2",
        };
        let radio = Locator::new(format!("input[type=\"radio\"][value=\"{value}\"]"));
        if !self.base.driver().is_checked(&radio).await? {
            self.base.click(&label(gender.label())).await?;
        }
        Ok(())
    }

    async fn set_smoker(&self, smoker: bool) -> ProbeResult<()> {
        if self.base.driver().is_checked(&self.smoker_checkbox).await? != smoker {
            self.base.click(&self.smoker_label).await?;
        }
        Ok(())
    }

    /// Older OrangeHRM builds show the form read-only behind an Edit button
    async fn enter_edit_mode(&self) -> ProbeResult<()> {
        if self
            .base
            .probe_visible(&self.edit_button, SETTLE_TIMEOUT)
            .await?
            .is_found()
        {
            self.base.click(&self.edit_button).await?;
            self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await?;
        }
        Ok(())
    }

    async fn save(&self) -> ProbeResult<()> {
        self.base.click(&self.save_button).await?;
        self.base.wait_for_dom_ready(SETTLE_TIMEOUT).await
    }

    /// `first last` as currently entered
    pub async fn full_name(&self) -> ProbeResult<String> {
        let first = self.base.driver().input_value(&self.first_name).await?;
        let last = self.base.driver().input_value(&self.last_name).await?;
        Ok(format!("{first} {last}").trim().to_string())
    }

    pub async fn employee_id(&self) -> ProbeResult<String> {
        self.base.driver().input_value(&self.employee_id).await
    }

    pub async fn verify_success_message(&self) -> ProbeResult<()> {
        self.base
            .wait_for_visible(&toast(), self.base.action_timeout())
            .await?;
        self.base.logger().step("Success message verified", None);
        Ok(())
    }

    pub async fn verify_page_loaded(&self) -> ProbeResult<()> {
        self.base
            .wait_for_visible(
                &self.personal_details_header,
                self.base.settings().navigation_timeout,
            )
            .await?;
        self.base.logger().step("Employee page verified as loaded", None);
        Ok(())
    }
}

impl PageObject for EmployeePage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> &'static str {
        PIM_ADD_PATH
    }

    fn page_name(&self) -> &'static str {
        "EmployeePage"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::data::EmployeeTestData;
    use crate::driver::{MockDriver, MockEffect, MockElement};
    use crate::page_object::tests::mock_session;
    use std::sync::Arc;

    const DETAILS: &str = "https://opensource-demo.orangehrmlive.com\
        /web/index.php/pim/viewPersonalDetails/empNumber/42";

    fn setup() -> (Arc<MockDriver>, EmployeePage) {
        let (driver, session) = mock_session();
        let page = EmployeePage::new(&session);
        for input in [&page.first_name, &page.middle_name, &page.last_name] {
            driver.insert(input, MockElement::visible("input"));
        }
        driver.insert(&page.employee_id, MockElement::visible("input").with_value("0385"));
        driver.insert(
            &page.save_button,
            MockElement::visible("button")
                .on_click(MockEffect::Show(toast()))
                .on_click(MockEffect::Navigate(DETAILS.into())),
        );
        (driver, page)
    }

    mod add_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_add_employee_with_id() {
            let (driver, page) = setup();
            page.goto_add_employee().await.unwrap();
            page.add_employee(&EmployeeTestData::valid_employee()).await.unwrap();
            page.verify_success_message().await.unwrap();

            assert_eq!(page.full_name().await.unwrap(), "John Doe");
            assert_eq!(page.employee_id().await.unwrap(), "EMP001");
            assert_eq!(driver.element(&page.middle_name).unwrap().value, "Michael");
        }

        #[tokio::test(start_paused = true)]
        async fn test_minimal_employee_keeps_generated_id() {
            let (driver, page) = setup();
            page.add_employee(&EmployeeTestData::minimal_employee())
                .await
                .unwrap();
            assert_eq!(page.employee_id().await.unwrap(), "0385");
            assert!(!driver.was_called(&format!("fill:{}", page.middle_name)));
        }

        #[test]
        fn test_labelled_input_xpath() {
            assert_eq!(
                labelled_input("Other Id").to_string(),
                "xpath=//label[normalize-space()=\"Other Id\"]/../following-sibling::div//input"
            );
        }
    }

    mod edit_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_edit_clicks_edit_button_when_shown() {
            let (driver, page) = setup();
            driver.insert(&page.edit_button, MockElement::visible("button"));

            let updates = PersonalDetailsUpdate {
                first_name: Some("Johnny".into()),
                ..PersonalDetailsUpdate::default()
            };
            page.edit_personal_details(&updates).await.unwrap();
            assert!(driver.was_called(&format!("click:{}", page.edit_button)));
            assert_eq!(driver.element(&page.first_name).unwrap().value, "Johnny");
            assert!(!driver.was_called(&format!("fill:{}", page.last_name)));
        }

        #[tokio::test(start_paused = true)]
        async fn test_edit_without_edit_button() {
            let (driver, page) = setup();
            let updates = PersonalDetailsUpdate {
                last_name: Some("Smith".into()),
                ..PersonalDetailsUpdate::default()
            };
            page.edit_personal_details(&updates).await.unwrap();
            assert!(!driver.was_called(&format!("click:{}", page.edit_button)));
            assert_eq!(page.full_name().await.unwrap(), "Smith");
        }
    }

    mod additional_details_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_fill_additional_details() {
            let (driver, page) = setup();
            for input in [&page.other_id, &page.driver_license, &page.date_of_birth] {
                driver.insert(input, MockElement::visible("input"));
            }
            let married =
                Locator::new(".oxd-select-dropdown [role=\"option\"]").with_text("Married");
            driver.insert(
                &page.marital_status,
                MockElement::visible("div").on_click(MockEffect::Show(married.clone())),
            );
            let male = Locator::new("input[type=\"radio\"][value=\"1\"]");
            driver.insert(&male, MockElement::hidden("input"));
            driver.insert(
                &label("Male"),
                MockElement::visible("label").on_click(MockEffect::Toggle(male.clone())),
            );
            driver.insert(&page.smoker_checkbox, MockElement::hidden("input").checked(true));
            driver.insert(
                &page.smoker_label,
                MockElement::visible("label")
                    .on_click(MockEffect::Toggle(page.smoker_checkbox.clone())),
            );

            let details = AdditionalDetails {
                other_id: Some("OID-7".into()),
                driver_license: Some("DL-123".into()),
                marital_status: Some("Married".into()),
                date_of_birth: Some("1990-05-17".into()),
                gender: Some(Gender::Male),
                smoker: Some(false),
                ..AdditionalDetails::default()
            };
            page.fill_additional_details(&details).await.unwrap();

            assert_eq!(driver.element(&page.other_id).unwrap().value, "OID-7");
            assert!(driver.was_called(&format!("click:{married}")));
            assert!(driver.element(&male).unwrap().checked);
            assert!(!driver.element(&page.smoker_checkbox).unwrap().checked);
            assert!(driver.was_called(&format!("click:{}", page.save_button)));
        }

        #[tokio::test(start_paused = true)]
        async fn test_smoker_already_in_state_is_left_alone() {
            let (driver, page) = setup();
            driver.insert(&page.smoker_checkbox, MockElement::hidden("input").checked(true));
            driver.insert(&page.smoker_label, MockElement::visible("label"));

            let details = AdditionalDetails {
                smoker: Some(true),
                ..AdditionalDetails::default()
            };
            page.fill_additional_details(&details).await.unwrap();
            assert!(!driver.was_called(&format!("click:{}", page.smoker_label)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_verify_page_loaded() {
        let (driver, page) = setup();
        driver.insert(&page.personal_details_header, MockElement::visible("h6"));
        page.verify_page_loaded().await.unwrap();
    }
}
