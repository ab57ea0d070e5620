//! `rollcall` -- daily attendance check-in client.
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default                     | Description                  |
//! |---------------------------------|----------|-----------------------------|------------------------------|
//! | `ROLLCALL_API_URL`              | no       | `http://localhost:5000/api` | Attendance API base URL      |
//! | `ROLLCALL_API_TOKEN`            | no       | --                          | Bearer token                 |
//! | `ROLLCALL_REQUEST_TIMEOUT_SECS` | no       | `30`                        | HTTP request timeout         |
//! | `ROLLCALL_JPEG_QUALITY`         | no       | `80`                        | Photo JPEG quality (1-100)   |
//! | `ROLLCALL_GEO_TIMEOUT_SECS`     | no       | `10`                        | Wait for a location fix      |

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rollcall_cli::commands::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    commands::run(cli).await
}
