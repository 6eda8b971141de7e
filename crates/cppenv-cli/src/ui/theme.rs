//! Icons, colours and formatting helpers shared by every command.

use crossterm::style::{StyledContent, Stylize};

pub const ICON_SUCCESS: &str = "✓";
pub const ICON_WARNING: &str = "⚠";
pub const ICON_INFO: &str = "ℹ";
pub const ICON_ARROW: &str = "→";

/// Dim label padded to a fixed column, for `key: value` listings.
pub fn label(text: &str) -> StyledContent<String> {
    format!("{text:<14}").dark_grey()
}

/// Format bytes for human-readable display
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}
