//! Shared presentation helpers.

use comfy_table::{presets::UTF8_FULL, Table};

/// Table with the house style and the given header.
pub fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}
