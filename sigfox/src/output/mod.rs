use comfy_table::{Cell, Table};
use sigfox_core::{Settings, Timeouts};

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

/// Current session and persisted settings, one row each
pub fn settings_table(
    settings: &Settings,
    device: Option<&str>,
    username: Option<&str>,
    timeouts: Timeouts,
) -> Table {
    let mut table = create_table();
    table.set_header(vec![Cell::new("Setting"), Cell::new("Value")]);
    table.add_row(vec![Cell::new("Device"), Cell::new(device.unwrap_or("-"))]);
    table.add_row(vec![Cell::new("Baud rate"), Cell::new(settings.baud_rate)]);
    table.add_row(vec![Cell::new("AT library"), Cell::new(&settings.at_library)]);
    table.add_row(vec![
        Cell::new("Query timeout"),
        Cell::new(humantime::format_duration(timeouts.query)),
    ]);
    table.add_row(vec![
        Cell::new("Send timeout"),
        Cell::new(humantime::format_duration(timeouts.send)),
    ]);
    table.add_row(vec![Cell::new("Signed in as"), Cell::new(username.unwrap_or("-"))]);
    table
}

/// Installed AT libraries with the active one marked
pub fn library_table(names: &[String], current: &str) -> Table {
    let mut table = create_table();
    table.set_header(vec![Cell::new("#"), Cell::new("AT library"), Cell::new("")]);
    for (index, name) in names.iter().enumerate() {
        let marker = if name == current { "current" } else { "" };
        table.add_row(vec![Cell::new(index + 1), Cell::new(name), Cell::new(marker)]);
    }
    table
}
