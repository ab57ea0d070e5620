//! REST client for the attendance API.
//!
//! Every endpoint answers with a JSON envelope carrying `success` and an
//! optional `message`; the payload fields sit next to them. A 2xx with
//! `success: false` is reported as [`ApiError::Rejected`], a non-2xx as
//! [`ApiError::Status`] with the body's `message` when it has one.

use reqwest::{Method, Url};
use rollcall_core::attendance::{CheckInStatus, LoginRecord};
use rollcall_core::employee::{
    AdminLoginRecord, AdminStats, CreateEmployee, Employee, EmployeeStatusUpdate,
};
use rollcall_core::pagination::{ListQuery, Pagination};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::photo::PhotoUpload;

/// HTTP client for one attendance API deployment.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct AttendanceApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Ack {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    #[serde(default)]
    login_record: Option<LoginRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRecordsData<T> {
    #[serde(default = "Vec::new")]
    login_records: Vec<T>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct EmployeesData {
    #[serde(default)]
    employees: Vec<Employee>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct EmployeeData {
    #[serde(default)]
    employee: Option<Employee>,
}

#[derive(Debug, Deserialize)]
struct StatsData {
    #[serde(default)]
    stats: AdminStats,
}

// ---------------------------------------------------------------------------
// AttendanceApi
// ---------------------------------------------------------------------------

impl AttendanceApi {
    /// Create a client from configuration, building a dedicated
    /// [`reqwest::Client`] with the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Self::with_client(client, &config.api_url, config.api_token.clone())
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: &str,
        token: Option<String>,
    ) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(api_url).map_err(|e| ApiError::InvalidUrl(format!("{api_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{api_url}: not a base URL")));
        }
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ---- employee endpoints ----

    /// `GET /employee/check-login-status`
    pub async fn check_login_status(&self) -> Result<CheckInStatus, ApiError> {
        let response = self
            .request(Method::GET, &["employee", "check-login-status"])?
            .send()
            .await?;
        Self::parse_envelope(response).await
    }

    /// `POST /employee/login-with-photo` as multipart.
    ///
    /// Returns the created record when the server echoes it back.
    pub async fn login_with_photo(
        &self,
        upload: PhotoUpload,
    ) -> Result<Option<LoginRecord>, ApiError> {
        let photo_bytes = upload.jpeg.len();
        let with_location = upload.coordinates.is_some();
        let form = upload.into_form()?;

        let response = self
            .request(Method::POST, &["employee", "login-with-photo"])?
            .multipart(form)
            .send()
            .await?;
        let data: LoginData = Self::parse_envelope(response).await?;

        tracing::info!(
            photo_bytes,
            with_location,
            record_id = data.login_record.as_ref().map(|r| r.id.as_str()),
            "Check-in photo accepted",
        );
        Ok(data.login_record)
    }

    /// `GET /employee/login-history?page&limit`
    pub async fn login_history(&self, query: &ListQuery) -> Result<Page<LoginRecord>, ApiError> {
        let response = self
            .request(Method::GET, &["employee", "login-history"])?
            .query(&[("page", query.page), ("limit", query.limit)])
            .send()
            .await?;
        let data: LoginRecordsData<LoginRecord> = Self::parse_envelope(response).await?;
        Ok(Page {
            items: data.login_records,
            pagination: data.pagination,
        })
    }

    // ---- admin endpoints ----

    /// `GET /admin/stats`
    pub async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        let response = self.request(Method::GET, &["admin", "stats"])?.send().await?;
        let data: StatsData = Self::parse_envelope(response).await?;
        Ok(data.stats)
    }

    /// `GET /admin/employees?page&limit&search`
    pub async fn list_employees(&self, query: &ListQuery) -> Result<Page<Employee>, ApiError> {
        let response = self
            .request(Method::GET, &["admin", "employees"])?
            .query(query)
            .send()
            .await?;
        let data: EmployeesData = Self::parse_envelope(response).await?;
        Ok(Page {
            items: data.employees,
            pagination: data.pagination,
        })
    }

    /// `GET /admin/login-records?page&limit&search`
    pub async fn list_login_records(
        &self,
        query: &ListQuery,
    ) -> Result<Page<AdminLoginRecord>, ApiError> {
        let response = self
            .request(Method::GET, &["admin", "login-records"])?
            .query(query)
            .send()
            .await?;
        let data: LoginRecordsData<AdminLoginRecord> = Self::parse_envelope(response).await?;
        Ok(Page {
            items: data.login_records,
            pagination: data.pagination,
        })
    }

    /// `POST /admin/create-employee`
    ///
    /// The form is validated locally first; nothing is sent when it fails.
    pub async fn create_employee(
        &self,
        form: &CreateEmployee,
    ) -> Result<Option<Employee>, ApiError> {
        form.check()?;

        let response = self
            .request(Method::POST, &["admin", "create-employee"])?
            .json(form)
            .send()
            .await?;
        let data: EmployeeData = Self::parse_envelope(response).await?;

        tracing::info!(employee_id = %form.employee_id, "Employee created");
        Ok(data.employee)
    }

    /// `DELETE /admin/employee/{id}`
    pub async fn delete_employee(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &["admin", "employee", id])?
            .send()
            .await?;
        let _: Ack = Self::parse_envelope(response).await?;

        tracing::info!(id, "Employee deleted");
        Ok(())
    }

    /// `PATCH /admin/employee/{id}/status`
    pub async fn set_employee_active(&self, id: &str, is_active: bool) -> Result<(), ApiError> {
        let response = self
            .request(Method::PATCH, &["admin", "employee", id, "status"])?
            .json(&EmployeeStatusUpdate { is_active })
            .send()
            .await?;
        let _: Ack = Self::parse_envelope(response).await?;

        tracing::info!(id, is_active, "Employee status updated");
        Ok(())
    }

    // ---- private helpers ----

    /// Build a request for `segments` under the base URL. Each segment is
    /// percent-encoded, so opaque IDs cannot escape their path position.
    fn request(&self, method: Method, segments: &[&str]) -> Result<reqwest::RequestBuilder, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        tracing::debug!(%method, %url, "Attendance API request");

        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Check the status code, decode the envelope, and unwrap its payload.
    async fn parse_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            tracing::warn!(status = status.as_u16(), message = ?message, "Attendance API error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope = response.json::<Envelope<T>>().await?;
        if !envelope.success {
            return Err(ApiError::Rejected {
                message: envelope.message,
            });
        }
        Ok(envelope.data)
    }
}
