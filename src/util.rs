//! Shared utility functions

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `s` to at most `max_cols` terminal columns, ending in "…" when
/// anything was cut.
///
/// Width is measured in display columns, so CJK characters count as two.
///
/// ```ignore
/// assert_eq!(truncate_to_width("Accounts Payable", 8), "Account…");
/// assert_eq!(truncate_to_width("日本語", 4), "日…");
/// ```
pub fn truncate_to_width(s: &str, max_cols: usize) -> String {
    if s.width() <= max_cols {
        return s.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }

    // Reserve one column for the ellipsis
    let budget = max_cols - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Collapse newlines to spaces so a value fits on one line
pub fn single_line(s: &str) -> String {
    s.split(['\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
