//! Login page (`/web/index.php/auth/login`).

use super::LOGIN_PATH;
use crate::data::Credentials;
use crate::driver::BrowserDriver;
use crate::locator::Locator;
use crate::page_object::{BasePage, PageObject};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::{poll, WaitOptions};
use std::time::Duration;

/// What the application did after the login form was submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The browser reached the dashboard
    LoggedIn,
    /// The page stayed put and showed an alert or a field validation message
    Rejected { message: String },
    /// Neither happened within the navigation timeout
    NoResponse,
}

impl LoginOutcome {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn)
    }

    /// Alert or validation text of a rejected login
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

/// Form controls whose DOM properties the validation scenarios inspect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
    Submit,
}

#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
    username_input: Locator,
    password_input: Locator,
    login_button: Locator,
    forgot_password_link: Locator,
    error_message: Locator,
    field_error: Locator,
    login_form: Locator,
}

impl LoginPage {
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, "LoginPage"),
            username_input: Locator::new("input[name=\"username\"]"),
            password_input: Locator::new("input[name=\"password\"]"),
            login_button: Locator::new("button[type=\"submit\"]"),
            forgot_password_link: Locator::new(".orangehrm-login-forgot"),
            error_message: Locator::new(".oxd-alert-content-text"),
            field_error: Locator::new(".oxd-input-field-error-message").first(),
            login_form: Locator::new(".orangehrm-login-form"),
        }
    }

    pub async fn goto(&self) -> ProbeResult<()> {
        self.base.navigate_to(LOGIN_PATH).await?;
        self.base
            .wait_for_visible(&self.login_form, self.base.settings().navigation_timeout)
            .await?;
        self.base.logger().step("Navigated to login page", None);
        Ok(())
    }

    /// Fill the form, submit it and wait for the application's answer.
    ///
    /// The answer is whichever shows first: the dashboard URL, the alert
    /// banner, or a field validation message. A rejected login is an
    /// outcome, not an error.
    pub async fn login(&self, credentials: &Credentials) -> ProbeResult<LoginOutcome> {
        self.base
            .guarded("Login", async {
                self.base.logger().step(
                    "Performing login",
                    Some(&format!("Username: {}", credentials.username)),
                );
                self.base
                    .type_text(&self.username_input, &credentials.username)
                    .await?;
                self.base
                    .type_text(&self.password_input, &credentials.password)
                    .await?;
                self.base.click(&self.login_button).await?;

                let outcome = self.await_response().await?;
                self.base
                    .logger()
                    .step("Login completed", Some(&format!("{outcome:?}")));
                Ok(outcome)
            })
            .await
    }

    /// Log in with the configured default credentials
    pub async fn login_with_defaults(&self) -> ProbeResult<LoginOutcome> {
        let credentials = self.base.settings().credentials();
        self.login(&credentials).await
    }

    async fn await_response(&self) -> ProbeResult<LoginOutcome> {
        let driver = self.base.driver();
        let alert = &self.error_message;
        let field_error = &self.field_error;

        let probe = move || async move {
            let outcome = if driver.current_url().await?.contains("/dashboard") {
                Some(LoginOutcome::LoggedIn)
            } else if driver.element_state(alert).await?.visible {
                Some(LoginOutcome::Rejected {
                    message: read_text(driver, alert).await?,
                })
            } else if driver.element_state(field_error).await?.visible {
                Some(LoginOutcome::Rejected {
                    message: read_text(driver, field_error).await?,
                })
            } else {
                None
            };
            Ok::<_, ProbeError>(outcome)
        };

        let options = WaitOptions::with_timeout(self.base.settings().navigation_timeout);
        match poll(options, "login form", "dashboard or error", probe).await {
            Ok((outcome, _)) => Ok(outcome),
            Err(ProbeError::WaitTimeout { .. }) => {
                self.base.logger().warn("No response to login submit");
                Ok(LoginOutcome::NoResponse)
            }
            Err(err) => Err(err),
        }
    }

    /// Alert text, if the alert shows up within the probe timeout
    pub async fn error_message(&self) -> ProbeResult<Option<String>> {
        if self.is_error_message_visible().await? {
            Ok(Some(self.base.get_text(&self.error_message).await?))
        } else {
            Ok(None)
        }
    }

    pub async fn is_error_message_visible(&self) -> ProbeResult<bool> {
        self.base.is_visible(&self.error_message).await
    }

    pub async fn click_forgot_password(&self) -> ProbeResult<()> {
        self.base.click(&self.forgot_password_link).await?;
        self.base.logger().step("Clicked forgot password link", None);
        Ok(())
    }

    pub async fn verify_page_loaded(&self) -> ProbeResult<()> {
        self.base
            .wait_for_visible(&self.login_form, self.base.action_timeout())
            .await?;
        self.base.logger().step("Login page verified as loaded", None);
        Ok(())
    }

    pub async fn clear_form(&self) -> ProbeResult<()> {
        self.base.driver().clear(&self.username_input).await?;
        self.base.driver().clear(&self.password_input).await?;
        self.base.logger().debug("Login form cleared");
        Ok(())
    }

    /// Current `(username, password)` input values
    pub async fn field_values(&self) -> ProbeResult<(String, String)> {
        Ok((
            self.base.driver().input_value(&self.username_input).await?,
            self.base.driver().input_value(&self.password_input).await?,
        ))
    }

    /// DOM property of a form control, e.g. `required` or `validationMessage`
    pub async fn property(&self, field: LoginField, name: &str) -> ProbeResult<serde_json::Value> {
        self.base.driver().property(self.field(field), name).await
    }

    /// Submit the form without touching the inputs
    pub async fn submit(&self) -> ProbeResult<()> {
        self.base.click(&self.login_button).await
    }

    #[must_use]
    pub const fn field(&self, field: LoginField) -> &Locator {
        match field {
            LoginField::Username => &self.username_input,
            LoginField::Password => &self.password_input,
            LoginField::Submit => &self.login_button,
        }
    }

    /// Whether the submit button renders within `timeout`
    pub async fn is_submit_visible(&self, timeout: Duration) -> ProbeResult<bool> {
        Ok(self
            .base
            .probe_visible(&self.login_button, timeout)
            .await?
            .is_found())
    }
}

async fn read_text(driver: &dyn BrowserDriver, locator: &Locator) -> ProbeResult<String> {
    Ok(driver
        .text_content(locator)
        .await?
        .unwrap_or_default()
        .trim()
        .to_string())
}

impl PageObject for LoginPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn path(&self) -> &'static str {
        LOGIN_PATH
    }

    fn page_name(&self) -> &'static str {
        "LoginPage"
    }
}
