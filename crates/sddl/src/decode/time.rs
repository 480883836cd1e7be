//! Time-of-day conversions.
//!
//! ASTERIX carries time of day in units of 1/128 s since midnight. Some
//! category 001 records truncate it to the low 16 bits; the full value is
//! recovered from the most recent complete ToD seen on the stream.

pub const TOD_LSB: f64 = 1.0 / 128.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a raw 24-bit ToD to seconds, folding a day overrun back once.
pub fn tod_to_seconds(tod: u32) -> f64 {
    let mut tm = TOD_LSB * tod as f64;
    if tm >= SECONDS_PER_DAY {
        tm -= SECONDS_PER_DAY;
    }
    tm
}

/// Recover a full 24-bit ToD from a truncated 16-bit one.
///
/// The high octet is taken from `reference`, the most recent full ToD on
/// the stream. When the rebuilt value lags the reference by more than half
/// the 16-bit span the truncated clock has wrapped past a 512 s boundary
/// since the reference was taken, so the high octet is advanced by one.
pub fn fill_truncated_tod(truncated: u16, reference: u32) -> u32 {
    let mut tod = (reference & 0x00ff_0000) | truncated as u32;
    if tod < reference && reference - tod > 0x8000 {
        tod = tod.wrapping_add(0x0001_0000) & 0x00ff_ffff;
    }
    tod
}

/// Render seconds since midnight as `hh:mm:ss.fff` for diagnostics.
pub fn utc_text(secs: f64) -> String {
    let total_ms = (secs * 1000.0).round() as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms / 60_000) % 60;
    let s = (total_ms / 1000) % 60;
    let ms = total_ms % 1000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_conversion() {
        assert_eq!(tod_to_seconds(128), 1.0);
        assert_eq!(tod_to_seconds(0), 0.0);
        // 24 h in 1/128 s folds back to zero.
        assert_eq!(tod_to_seconds(86_400 * 128), 0.0);
    }

    #[test]
    fn fill_without_wrap() {
        // Reference 0x123456, truncated value slightly ahead of it.
        assert_eq!(fill_truncated_tod(0x4000, 0x12_3456), 0x12_4000);
    }

    #[test]
    fn fill_with_wrap() {
        // Truncated clock wrapped past the 512 s boundary: the low 16 bits
        // restart near zero while the reference still sits near the top.
        assert_eq!(fill_truncated_tod(0x0010, 0x12_ff00), 0x13_0010);
    }

    #[test]
    fn fill_small_lag_keeps_octet() {
        // A small lag is late data, not a wrap.
        assert_eq!(fill_truncated_tod(0x3400, 0x12_3456), 0x12_3400);
    }

    #[test]
    fn clock_text() {
        assert_eq!(utc_text(0.0), "00:00:00.000");
        assert_eq!(utc_text(45_296.5), "12:34:56.500");
    }
}
