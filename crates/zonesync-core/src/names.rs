// # Name Conversion
//
// Backends speak absolute names (`www.example.com.`). The comparison layer
// keys records by the name without its trailing dot, and descriptions use
// the label relative to the zone (`www`, or `@` for the apex).
//
// Matching is exact. `absolutize(relativize(n, z)?, z) == n` holds for any
// absolute `n` equal to `z` or a strict subdomain of it.

use crate::error::{Error, Result};

/// Label used for the zone apex
pub const APEX_LABEL: &str = "@";

/// Append a trailing dot if missing
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Remove a single trailing dot, if present
pub fn strip_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Convert a name to its label relative to `zone`
///
/// Both arguments may be given with or without a trailing dot.
///
/// # Errors
///
/// [`Error::Reconciliation`] when `name` is neither `zone` nor a subdomain
/// of it.
pub fn relativize(name: &str, zone: &str) -> Result<String> {
    let name = strip_fqdn(name);
    let zone = strip_fqdn(zone);

    if name == zone {
        return Ok(APEX_LABEL.to_string());
    }

    name.strip_suffix(zone)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::reconciliation(format!("name {} is not within zone {}", name, zone))
        })
}

/// Convert a zone-relative label back to an absolute name
pub fn absolutize(label: &str, zone: &str) -> String {
    let zone = strip_fqdn(zone);
    if label == APEX_LABEL || label.is_empty() {
        format!("{}.", zone)
    } else {
        format!("{}.{}.", label, zone)
    }
}
