use std::cmp::Ordering;

/// Compare two dotted version strings by the numeric prefix of each segment.
///
/// A leading `v` is ignored, missing segments count as zero and a segment is
/// cut at its first non-digit, so `"3.0-beta"` equals `"3.0"`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = strip_prefix(a).split('.').collect();
    let right: Vec<&str> = strip_prefix(b).split('.').collect();
    let len = left.len().max(right.len());

    (0..len)
        .map(|i| {
            let l = numeric_prefix(left.get(i).copied().unwrap_or(""));
            let r = numeric_prefix(right.get(i).copied().unwrap_or(""));
            compare_digits(l, r)
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Strip an optional leading `v` and surrounding whitespace from a tag.
pub fn strip_prefix(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed).trim()
}

/// Leading decimal digits without leading zeros; empty means zero.
fn numeric_prefix(segment: &str) -> &str {
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    segment[..end].trim_start_matches('0')
}

// Digit strings without leading zeros: longer is larger, then lexicographic.
fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Human-readable byte size: `0 B`, `512.00 B`, `1.50 KB`, ... up to GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
