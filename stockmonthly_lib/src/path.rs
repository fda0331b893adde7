//! Storage keys for monthly snapshots.
//!
//! Keys come from a printf-style template taking the year and then the month,
//! e.g. `data/%04d/%02d.json`.

use crate::dates::TargetDate;

/// Rendered in place of a slot that has no value left to fill it.
const MISSING: &str = "%!d(MISSING)";

/// Render one key per date, preserving order.
pub fn format_paths(dates: &[TargetDate], template: &str) -> Vec<String> {
    dates
        .iter()
        .map(|date| format_path(template, &[i64::from(date.year), i64::from(date.month)]))
        .collect()
}

/// Substitute `values` into the integer slots of `template`.
///
/// Supported slots are `%d` with an optional `0` flag and width (`%02d`,
/// `%4d`) plus `%%` for a literal percent. A template is never rejected:
/// slots without a value render as `%!d(MISSING)`, surplus values are
/// dropped and any other `%` sequence is copied through unchanged.
pub fn format_path(template: &str, values: &[i64]) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut values = values.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let mut raw = String::from("%");
        let zero_pad = chars.peek() == Some(&'0');
        if zero_pad {
            raw.push('0');
            chars.next();
        }
        let mut width = 0usize;
        while let Some(&d) = chars.peek() {
            let Some(digit) = d.to_digit(10) else { break };
            width = width * 10 + digit as usize;
            raw.push(d);
            chars.next();
        }

        if chars.peek() != Some(&'d') {
            out.push_str(&raw);
            continue;
        }
        chars.next();

        match values.next() {
            Some(v) if zero_pad => out.push_str(&format!("{:0width$}", v, width = width)),
            Some(v) => out.push_str(&format!("{:width$}", v, width = width)),
            None => out.push_str(MISSING),
        }
    }

    out
}
