//! Human-readable size formatting.

const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Formats a byte count with binary prefixes.
///
/// Plain bytes print without decimals (`512 B`), every larger unit with one
/// (`1.5 KiB`). The unit is picked with integer comparisons so exact powers
/// of 1024 never fall into the unit below.
pub fn pretty_size(bytes: u64) -> String {
    let mut unit = 0;
    let mut threshold: u64 = 1024;
    while unit + 1 < UNITS.len() && bytes >= threshold {
        unit += 1;
        threshold = match threshold.checked_mul(1024) {
            Some(next) => next,
            None => break,
        };
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        let scaled = bytes as f64 / 1024f64.powi(unit as i32);
        format!("{:.1} {}", scaled, UNITS[unit])
    }
}
