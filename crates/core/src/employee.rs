//! Employee accounts and the admin dashboard read models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::attendance::LoginRecord;
use crate::error::CoreError;
use crate::types::{RecordId, Timestamp};

/// Display order of form fields when reporting validation failures.
const FORM_FIELD_ORDER: &[&str] = &["name", "email", "password", "employee_id", "department"];

/// An employee account as listed on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub employee_id: String,
    pub department: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Headline counters for the admin dashboard. Missing counters read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_employees: u64,
    pub active_employees: u64,
    pub today_logins: u64,
    pub weekly_logins: u64,
}

/// A login record joined with the employee who made it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRecord {
    #[serde(flatten)]
    pub record: LoginRecord,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub department: String,
}

/// Body of `PATCH /admin/employee/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStatusUpdate {
    pub is_active: bool,
}

/// Create-employee form input.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid email")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Employee ID is required"))]
    pub employee_id: String,
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,
}

impl CreateEmployee {
    /// Run the form rules, collecting every failing field's message.
    ///
    /// Messages are ordered as the fields appear on the form and joined
    /// with `"; "`.
    pub fn check(&self) -> Result<(), CoreError> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };

        let mut failures: Vec<(usize, String)> = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            let field: &str = &field;
            let rank = FORM_FIELD_ORDER
                .iter()
                .position(|f| *f == field)
                .unwrap_or(FORM_FIELD_ORDER.len());
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_deref()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{field} is invalid"));
                failures.push((rank, message));
            }
        }
        failures.sort();

        let joined = failures
            .into_iter()
            .map(|(_, message)| message)
            .collect::<Vec<_>>()
            .join("; ");
        Err(CoreError::Validation(joined))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
