// curator/src/commands/mod.rs

pub mod run;
pub mod validate;

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

pub(crate) fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

pub(crate) fn status_cell(text: &str, ok: bool) -> Cell {
    Cell::new(text).fg(if ok { Color::Green } else { Color::Red })
}

pub(crate) fn warn_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::Yellow)
}
