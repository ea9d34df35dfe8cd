//! Test data records, canned fixtures and random generators.
//!
//! Records are plain values created per scenario and dropped at its end.
//! Optional fields on the criteria and update structs mean "leave this
//! filter or field untouched".

use crate::result::{ProbeError, ProbeResult};
use chrono::{NaiveDate, TimeDelta, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

// =============================================================================
// RECORDS
// =============================================================================

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Employee created through PIM > Add Employee
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub employee_id: Option<String>,
}

impl NewEmployee {
    /// `first last`, used for searches and log lines
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// System user created through Admin > Add User
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub user_role: String,
    /// Existing employee the account is attached to
    pub employee_name: String,
    pub status: String,
    pub username: String,
    pub password: String,
}

/// Admin > System Users filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSearchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// PIM > Employee List filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeeSearchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_unit: Option<String>,
}

/// Name changes on the Personal Details form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonalDetailsUpdate {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Radio label on the Personal Details form
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Remaining Personal Details fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdditionalDetails {
    pub other_id: Option<String>,
    pub driver_license: Option<String>,
    pub license_expiry_date: Option<String>,
    pub ssn_number: Option<String>,
    pub sin_number: Option<String>,
    pub nationality: Option<String>,
    pub marital_status: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub military_service: Option<String>,
    pub smoker: Option<bool>,
}

// =============================================================================
// CANNED FIXTURES
// =============================================================================

/// Login fixtures
#[derive(Debug)]
pub struct TestUsers;

impl TestUsers {
    #[must_use]
    pub fn valid_admin() -> Credentials {
        Credentials::new("Admin", "admin123")
    }

    #[must_use]
    pub fn invalid_user() -> Credentials {
        Credentials::new("InvalidUser", "wrongpassword")
    }

    #[must_use]
    pub fn empty() -> Credentials {
        Credentials::new("", "")
    }
}

/// PIM fixtures
#[derive(Debug)]
pub struct EmployeeTestData;

impl EmployeeTestData {
    #[must_use]
    pub fn valid_employee() -> NewEmployee {
        NewEmployee {
            first_name: "John".to_string(),
            middle_name: Some("Michael".to_string()),
            last_name: "Doe".to_string(),
            employee_id: Some("EMP001".to_string()),
        }
    }

    #[must_use]
    pub fn minimal_employee() -> NewEmployee {
        NewEmployee {
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            ..NewEmployee::default()
        }
    }
}

/// Admin fixtures
#[derive(Debug)]
pub struct UserManagementTestData;

impl UserManagementTestData {
    #[must_use]
    pub fn new_user() -> NewUser {
        NewUser {
            user_role: "Admin".to_string(),
            employee_name: "Odis  Adalwin".to_string(),
            status: "Enabled".to_string(),
            username: "testuser".to_string(),
            password: "Test@123456".to_string(),
        }
    }

    #[must_use]
    pub fn search_criteria() -> UserSearchCriteria {
        UserSearchCriteria {
            user_role: Some("Admin".to_string()),
            status: Some("Enabled".to_string()),
            ..UserSearchCriteria::default()
        }
    }
}

/// PIM search fixtures
#[derive(Debug)]
pub struct PimSearchCriteria;

impl PimSearchCriteria {
    #[must_use]
    pub fn by_name() -> EmployeeSearchCriteria {
        EmployeeSearchCriteria {
            employee_name: Some("Odis".to_string()),
            ..EmployeeSearchCriteria::default()
        }
    }

    #[must_use]
    pub fn by_id() -> EmployeeSearchCriteria {
        EmployeeSearchCriteria {
            employee_id: Some("0001".to_string()),
            ..EmployeeSearchCriteria::default()
        }
    }

    #[must_use]
    pub fn multiple_criteria() -> EmployeeSearchCriteria {
        EmployeeSearchCriteria {
            employment_status: Some("Full-Time Permanent".to_string()),
            job_title: Some("Software Engineer".to_string()),
            ..EmployeeSearchCriteria::default()
        }
    }
}

// =============================================================================
// GENERATORS
// =============================================================================

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Random ASCII alphanumeric string
#[must_use]
pub fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// `testuser_<millis>_<0..10000>@domain`
#[must_use]
pub fn random_email(domain: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!(
        "testuser_{}_{suffix}@{domain}",
        Utc::now().timestamp_millis()
    )
}

/// Uniform integer in `min..=max`
pub fn random_number(min: i64, max: i64) -> ProbeResult<i64> {
    if min > max {
        return Err(ProbeError::InvalidArgument {
            message: format!("empty range {min}..={max}"),
        });
    }
    Ok(rand::thread_rng().gen_range(min..=max))
}

/// Random v4 UUID
#[must_use]
pub fn generate_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Today (UTC) as `YYYY-MM-DD`
#[must_use]
pub fn current_date() -> String {
    Utc::now().date_naive().format(DATE_FORMAT).to_string()
}

/// `days` from today (UTC) as `YYYY-MM-DD`
pub fn future_date(days: i64) -> ProbeResult<String> {
    shift_today(Some(days))
}

/// `days` before today (UTC) as `YYYY-MM-DD`
pub fn past_date(days: i64) -> ProbeResult<String> {
    shift_today(days.checked_neg())
}

/// Today shifted by `days`; `None` means the offset itself overflowed
fn shift_today(days: Option<i64>) -> ProbeResult<String> {
    days.and_then(TimeDelta::try_days)
        .and_then(|delta| Utc::now().date_naive().checked_add_signed(delta))
        .map(|date| date.format(DATE_FORMAT).to_string())
        .ok_or_else(|| ProbeError::InvalidArgument {
            message: "date offset is out of range".to_string(),
        })
}

/// `DD-MM-YYYY`
#[must_use]
pub fn format_date_dd_mm_yyyy(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Parse `YYYY-MM-DD` and reformat as `DD-MM-YYYY`
pub fn reformat_iso_date(date: &str) -> ProbeResult<String> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map(format_date_dd_mm_yyyy)
        .map_err(|_| ProbeError::InvalidArgument {
            message: format!("not a YYYY-MM-DD date: {date:?}"),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod fixture_tests {
        use super::*;

        #[test]
        fn test_users() {
            assert_eq!(TestUsers::valid_admin().username, "Admin");
            assert_eq!(TestUsers::invalid_user().password, "wrongpassword");
            assert!(TestUsers::empty().username.is_empty());
        }

        #[test]
        fn test_employees() {
            let employee = EmployeeTestData::valid_employee();
            assert_eq!(employee.display_name(), "John Doe");
            assert_eq!(employee.employee_id.as_deref(), Some("EMP001"));
            assert!(EmployeeTestData::minimal_employee().middle_name.is_none());
        }

        #[test]
        fn test_criteria_serialize_only_set_fields() {
            let json = serde_json::to_string(&UserManagementTestData::search_criteria()).unwrap();
            assert_eq!(json, r#"{"user_role":"Admin","status":"Enabled"}"#);
            let json = serde_json::to_string(&PimSearchCriteria::by_id()).unwrap();
            assert_eq!(json, r#"{"employee_id":"0001"}"#);
        }

        #[test]
        fn test_gender_label() {
            assert_eq!(Gender::Female.label(), "Female");
        }
    }

    mod generator_tests {
        use super::*;

        #[test]
        fn test_random_string() {
            let s = random_string(16);
            assert_eq!(s.len(), 16);
            assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(random_string(0).is_empty());
        }

        #[test]
        fn test_random_email() {
            let email = random_email("test.com");
            assert!(email.starts_with("testuser_"));
            assert!(email.ends_with("@test.com"));
        }

        #[test]
        fn test_random_number_bounds() {
            for _ in 0..100 {
                let n = random_number(3, 5).unwrap();
                assert!((3..=5).contains(&n));
            }
            assert_eq!(random_number(4, 4).unwrap(), 4);
            assert!(random_number(5, 3).is_err());
        }

        #[test]
        fn test_uuid_is_v4() {
            let id = generate_uuid();
            let parsed = uuid::Uuid::parse_str(&id).unwrap();
            assert_eq!(parsed.get_version_num(), 4);
        }

        #[test]
        fn test_dates() {
            let today = NaiveDate::parse_from_str(&current_date(), "%Y-%m-%d").unwrap();
            let later = NaiveDate::parse_from_str(&future_date(10).unwrap(), "%Y-%m-%d").unwrap();
            let earlier = NaiveDate::parse_from_str(&past_date(10).unwrap(), "%Y-%m-%d").unwrap();
            // a midnight rollover between calls can shift by one day
            assert!((later - today).num_days() >= 10);
            assert!((today - earlier).num_days() >= 9);
        }

        #[test]
        fn test_out_of_range_offsets_are_errors() {
            assert!(future_date(i64::MAX).is_err());
            assert!(future_date(400_000_000).is_err());
            assert!(past_date(i64::MIN).is_err());
            assert!(past_date(400_000_000).is_err());
            assert!(past_date(0).is_ok());
        }

        #[test]
        fn test_format_dd_mm_yyyy() {
            let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
            assert_eq!(format_date_dd_mm_yyyy(date), "07-03-2024");
            assert_eq!(reformat_iso_date("2024-12-31").unwrap(), "31-12-2024");
            assert!(reformat_iso_date("31/12/2024").is_err());
        }
    }
}
