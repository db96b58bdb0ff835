//! Vendor epoch timestamps.
//!
//! The bookmark store records times as microseconds elapsed since
//! `1601-01-01T00:00:00Z`. Conversion is an exact integer shift onto the Unix
//! epoch, so `to_vendor_epoch(from_vendor_epoch(u)?) == u` for every value in
//! range.

use chrono::{DateTime, Utc};

/// Microseconds between `1601-01-01T00:00:00Z` and `1970-01-01T00:00:00Z`.
pub const VENDOR_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// The vendor epoch base, `1601-01-01T00:00:00Z`.
#[must_use]
pub fn epoch_base() -> DateTime<Utc> {
    DateTime::from_timestamp_micros(-VENDOR_EPOCH_OFFSET_MICROS).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Convert raw vendor-epoch microseconds into an absolute UTC timestamp.
///
/// Returns `None` when the value does not fit chrono's representable range.
#[must_use]
pub fn from_vendor_epoch(micros: u64) -> Option<DateTime<Utc>> {
    let micros = i64::try_from(micros).ok()?;
    let unix_micros = micros.checked_sub(VENDOR_EPOCH_OFFSET_MICROS)?;
    DateTime::from_timestamp_micros(unix_micros)
}

/// Inverse of [`from_vendor_epoch`]: microseconds since the vendor epoch.
///
/// Returns `None` for instants before `1601-01-01T00:00:00Z` or with
/// sub-microsecond precision that cannot be represented.
#[must_use]
pub fn to_vendor_epoch(at: DateTime<Utc>) -> Option<u64> {
    let micros = at.timestamp_micros().checked_add(VENDOR_EPOCH_OFFSET_MICROS)?;
    u64::try_from(micros).ok()
}

/// Parse the textual form of a vendor timestamp.
///
/// Accepts only ASCII decimal digits (surrounding whitespace is trimmed).
/// Signs, fractions, and exponents are rejected.
#[must_use]
pub fn parse_vendor_micros(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
