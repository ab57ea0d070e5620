//! Subcommands of the `rollcall` binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};

use rollcall_capture::config::FlowConfig;
use rollcall_capture::device::PositionSource;
use rollcall_capture::flow::{FlowDeps, FlowHandle, UploadOutcome};
use rollcall_capture::geolocation::{FixedPositionSource, UnsupportedPositionSource};
use rollcall_capture::preview::PreviewRegistry;
use rollcall_capture::still::StillImageSource;
use rollcall_capture::submit::SUBMIT_SUCCESS_MESSAGE;
use rollcall_client::error::{
    CREATE_EMPLOYEE_FALLBACK, DELETE_EMPLOYEE_FALLBACK, UPDATE_STATUS_FALLBACK,
};
use rollcall_client::{AttendanceApi, ClientConfig};
use rollcall_core::attendance::{CheckInStatus, Coordinates};
use rollcall_core::employee::CreateEmployee;
use rollcall_core::pagination::{ListQuery, DEFAULT_PAGE_LIMIT};

use crate::render;

/// Daily attendance check-in client
#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether you have checked in today.
    Status,
    /// Check in with a photo, optionally tagged with your location.
    CheckIn {
        /// Photo to submit (PNG, JPEG or WebP). It is mirrored like a selfie preview.
        #[arg(long)]
        photo: PathBuf,
        #[arg(long, requires = "longitude", allow_negative_numbers = true)]
        latitude: Option<f64>,
        #[arg(long, requires = "latitude", allow_negative_numbers = true)]
        longitude: Option<f64>,
        /// Accuracy radius in metres.
        #[arg(long, default_value_t = 0.0)]
        accuracy: f64,
    },
    /// List your past check-ins.
    History {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Admin dashboard operations.
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Headline counters.
    Stats,
    /// List employees.
    Employees {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        search: Option<String>,
    },
    /// List everyone's check-ins.
    Records {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        search: Option<String>,
    },
    /// Create an employee account.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        employee_id: String,
        #[arg(long)]
        department: String,
    },
    /// Delete an employee.
    Delete { id: String },
    /// Re-enable a deactivated employee.
    Activate { id: String },
    /// Deactivate an employee.
    Deactivate { id: String },
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    pub limit: u32,
}

impl PageArgs {
    fn query(self, search: Option<String>) -> ListQuery {
        let query = ListQuery::page(self.page).with_limit(self.limit);
        match search {
            Some(term) => query.with_search(term),
            None => query,
        }
    }
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::from_env()?;
    let api = AttendanceApi::new(&config)?;
    tracing::debug!(api_url = %api.base_url(), "Attendance API configured");

    match cli.command {
        Command::Status => {
            let status = api.check_login_status().await?;
            println!("{}", render::status_line(&status));
        }
        Command::CheckIn {
            photo,
            latitude,
            longitude,
            accuracy,
        } => {
            let location = latitude
                .zip(longitude)
                .map(|(lat, lon)| Coordinates::new(lat, lon, accuracy));
            check_in(api, photo, location).await?;
        }
        Command::History { page } => {
            let query = page.query(None);
            let result = api.login_history(&query).await?;
            println!("{}", render::history_table(&result.items));
            println!("{}", render::page_footer(&result.pagination, query.limit));
        }
        Command::Admin { command } => admin(&api, command).await?,
    }
    Ok(())
}

async fn admin(api: &AttendanceApi, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Stats => {
            let stats = api.admin_stats().await?;
            println!("{}", render::stats_table(&stats));
        }
        AdminCommand::Employees { page, search } => {
            let query = page.query(search);
            let result = api.list_employees(&query).await?;
            println!("{}", render::employees_table(&result.items));
            println!("{}", render::page_footer(&result.pagination, query.limit));
        }
        AdminCommand::Records { page, search } => {
            let query = page.query(search);
            let result = api.list_login_records(&query).await?;
            println!("{}", render::records_table(&result.items));
            println!("{}", render::page_footer(&result.pagination, query.limit));
        }
        AdminCommand::Create {
            name,
            email,
            password,
            employee_id,
            department,
        } => {
            let form = CreateEmployee {
                name,
                email,
                password,
                employee_id,
                department,
            };
            api.create_employee(&form)
                .await
                .map_err(|e| anyhow!(e.user_message(CREATE_EMPLOYEE_FALLBACK)))?;
            println!("Employee created successfully");
        }
        AdminCommand::Delete { id } => {
            api.delete_employee(&id)
                .await
                .map_err(|e| anyhow!(e.user_message(DELETE_EMPLOYEE_FALLBACK)))?;
            println!("Employee deleted successfully");
        }
        AdminCommand::Activate { id } => set_active(api, &id, true).await?,
        AdminCommand::Deactivate { id } => set_active(api, &id, false).await?,
    }
    Ok(())
}

async fn set_active(api: &AttendanceApi, id: &str, is_active: bool) -> Result<()> {
    api.set_employee_active(id, is_active)
        .await
        .map_err(|e| anyhow!(e.user_message(UPDATE_STATUS_FALLBACK)))?;
    let verb = if is_active { "activated" } else { "deactivated" };
    println!("Employee {verb} successfully");
    Ok(())
}

/// Run one capture flow over a still image and report the outcome.
async fn check_in(api: AttendanceApi, photo: PathBuf, location: Option<Coordinates>) -> Result<()> {
    let config = FlowConfig::from_env()?;
    let positions: Arc<dyn PositionSource> = match location {
        Some(coordinates) => Arc::new(FixedPositionSource::new(coordinates)),
        None => Arc::new(UnsupportedPositionSource),
    };

    let flow = FlowHandle::spawn(
        FlowDeps {
            media: Arc::new(StillImageSource::new(photo)),
            positions,
            api: Arc::new(api),
            previews: PreviewRegistry::new(),
        },
        config,
    );

    let result = drive_check_in(&flow).await;
    flow.close().await;
    result
}

async fn drive_check_in(flow: &FlowHandle) -> Result<()> {
    let snapshot = flow.ready().await?;
    if snapshot.status.has_logged_in_today {
        let status = CheckInStatus {
            has_logged_in_today: true,
            login_record: snapshot.status.record,
        };
        println!("{}", render::status_line(&status));
        return Ok(());
    }

    flow.start().await?;
    let frame_id = flow.capture().await?;
    let snapshot = flow.wait_for(|s| !s.locating).await?;
    tracing::info!(%frame_id, has_location = snapshot.coordinates.is_some(), "Photo ready");

    match flow.confirm().await?.settled().await? {
        UploadOutcome::Recorded(_) => {
            println!("{SUBMIT_SUCCESS_MESSAGE}");
            let snapshot = flow.wait_for(|s| !s.status.loading).await?;
            if let Some(record) = &snapshot.status.record {
                println!("{}", render::record_summary(record));
            }
            Ok(())
        }
        UploadOutcome::Failed(message) => bail!(message),
        UploadOutcome::Superseded => bail!("Check-in was interrupted before it completed"),
    }
}
