//! Terminal rendering of API results.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use rollcall_core::attendance::{CheckInStatus, Coordinates, LoginRecord};
use rollcall_core::employee::{AdminLoginRecord, AdminStats, Employee};
use rollcall_core::pagination::Pagination;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn location_cell(location: Option<&Coordinates>) -> String {
    match location {
        Some(c) => format!("{:.5}, {:.5} (±{:.0} m)", c.latitude, c.longitude, c.accuracy),
        None => "-".to_string(),
    }
}

fn photo_cell(record: &LoginRecord) -> String {
    match record.viewable_photo() {
        Some(url) => url.to_string(),
        None if record.is_photo_deleted => "deleted".to_string(),
        None => "-".to_string(),
    }
}

/// One line describing today's check-in state.
pub fn status_line(status: &CheckInStatus) -> String {
    match (&status.login_record, status.has_logged_in_today) {
        (Some(record), true) => format!(
            "Checked in today at {} UTC",
            record.login_date.format("%H:%M:%S")
        ),
        (None, true) => "Checked in today".to_string(),
        (_, false) => "Not checked in yet today".to_string(),
    }
}

pub fn record_summary(record: &LoginRecord) -> String {
    format!(
        "Record {} at {} UTC, location: {}",
        record.id,
        record.login_date.format("%Y-%m-%d %H:%M:%S"),
        location_cell(record.location.as_ref()),
    )
}

pub fn history_table(records: &[LoginRecord]) -> Table {
    let mut t = table(&["Date", "Time (UTC)", "Location", "Photo"]);
    for record in records {
        t.add_row(vec![
            record.login_date.format("%Y-%m-%d").to_string(),
            record.login_date.format("%H:%M:%S").to_string(),
            location_cell(record.location.as_ref()),
            photo_cell(record),
        ]);
    }
    t
}

pub fn employees_table(employees: &[Employee]) -> Table {
    let mut t = table(&["ID", "Name", "Email", "Employee ID", "Department", "Status"]);
    for employee in employees {
        t.add_row(vec![
            employee.id.clone(),
            employee.name.clone(),
            employee.email.clone(),
            employee.employee_id.clone(),
            employee.department.clone(),
            if employee.is_active { "active" } else { "inactive" }.to_string(),
        ]);
    }
    t
}

pub fn records_table(records: &[AdminLoginRecord]) -> Table {
    let mut t = table(&[
        "Employee",
        "Employee ID",
        "Email",
        "Department",
        "Date",
        "Time (UTC)",
        "Location",
        "Photo",
    ]);
    for entry in records {
        t.add_row(vec![
            entry.name.clone(),
            entry.employee_id.clone(),
            entry.email.clone(),
            entry.department.clone(),
            entry.record.login_date.format("%Y-%m-%d").to_string(),
            entry.record.login_date.format("%H:%M:%S").to_string(),
            location_cell(entry.record.location.as_ref()),
            photo_cell(&entry.record),
        ]);
    }
    t
}

pub fn stats_table(stats: &AdminStats) -> Table {
    let mut t = table(&["Metric", "Count"]);
    t.add_row(vec!["Total employees".to_string(), stats.total_employees.to_string()]);
    t.add_row(vec!["Active employees".to_string(), stats.active_employees.to_string()]);
    t.add_row(vec!["Logins today".to_string(), stats.today_logins.to_string()]);
    t.add_row(vec!["Logins this week".to_string(), stats.weekly_logins.to_string()]);
    t
}

/// "Showing 11 to 20 of 23 (page 2 of 3)".
pub fn page_footer(pagination: &Pagination, limit: u32) -> String {
    match pagination.shown_range(limit) {
        Some((first, last)) => format!(
            "Showing {first} to {last} of {} (page {} of {})",
            pagination.total_records,
            pagination.current_page,
            pagination.total_pages.max(1),
        ),
        None => "No records found".to_string(),
    }
}
