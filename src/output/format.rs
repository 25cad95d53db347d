//! Human-readable number formatting and text tables.

use crate::aggregator::RankedAlloc;
use crate::utils::config::MAX_DISPLAY_NAME;

/// Scale a byte count by powers of 1024: `"   512 B"`, `"   1.5kB"`, ...
pub fn format_bytes(bytes: u64) -> String {
    scaled(bytes as f64, 1024.0, "B")
}

/// Scale an event count by powers of 1000
pub fn format_count(count: u64) -> String {
    scaled(count as f64, 1000.0, "")
}

fn scaled(value: f64, step: f64, suffix: &str) -> String {
    if value < step {
        format!("{:>6.0} {}", value, suffix)
    } else if value < step * step {
        format!("{:>6.1}k{}", value / step, suffix)
    } else if value < step * step * step {
        format!("{:>6.1}M{}", value / step / step, suffix)
    } else {
        format!("{:>6.1}G{}", value / step / step / step, suffix)
    }
}

/// Shorten long names in the middle, keeping both ends readable
pub fn truncate_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= MAX_DISPLAY_NAME {
        return name.to_string();
    }
    let head: String = chars[..20].iter().collect();
    let tail: String = chars[chars.len() - 57..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Render ranked rows as `bytes count name` lines
///
/// Rows with zero bytes are left out. `with_count` drops the count column
/// for peak listings.
pub fn render_allocation_table(rows: &[RankedAlloc], with_count: bool) -> String {
    rows.iter()
        .filter(|row| row.bytes > 0)
        .map(|row| {
            if with_count {
                format!(
                    "    {} {} {}",
                    format_bytes(row.bytes),
                    format_count(row.count),
                    truncate_name(&row.name)
                )
            } else {
                format!("    {} {}", format_bytes(row.bytes), truncate_name(&row.name))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
