//! Per-stream decoder state.
//!
//! One value owned by the caller, created once per input stream. UAP
//! tables stay global because they are immutable after construction;
//! everything that mutates during decoding lives here.

use super::report::{
    FrameDate, Plot, ReportHeader, SafetyNetAlert, SensorStatus, ServiceMessage, Track,
};

/// Reference editions implemented for category 048.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Cat048Edition {
    /// Edition 1.14 (November 2000).
    Ed1_14,
    /// Edition 1.15 (April 2007).
    #[default]
    Ed1_15,
    /// Edition 1.16 (March 2009); adds the SI/II capability bit.
    Ed1_16,
}

/// Width of the system track number in categories 030/032.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TrackNumberBits {
    /// Standard encoding, the full 16-bit field is the track number.
    #[default]
    Sixteen,
    /// Legacy ARTAS encoding: low 12 bits plus a numbering indicator bit.
    Twelve,
}

/// Static decoding options, frozen into the context at construction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DecoderConfig {
    pub cat048_edition: Cat048Edition,
    pub track_number_bits: TrackNumberBits,
    /// Assumed height in metres for consumers without a height source.
    pub assumed_height: Option<f64>,
    /// Date of the start of the recording.
    pub start_date: Option<FrameDate>,
    /// Time bias applied by the framer, seconds.
    pub time_bias: Option<f64>,
}

/// Mutable per-stream decoder state.
///
/// Not `Sync`: one context per worker. The current-record scratch areas are
/// cleared at the start of each record and frozen into the emitted report
/// at its end.
#[derive(Debug, Default)]
pub struct DecoderContext {
    pub config: DecoderConfig,

    /// Last SAC/SIC seen in the current category 001 data block; category
    /// 001 records without I001/010 inherit it.
    pub(crate) last_sacsic: Option<u16>,
    /// Most recent full time of day (1/128 s) for truncated-ToD fill-up.
    pub(crate) last_tod: Option<u32>,

    /// Frame context supplied by the framer before each data block.
    pub frame_date: Option<FrameDate>,
    pub frame_time: Option<f64>,
    pub line_number: Option<u16>,

    /// Records decoded from the current frame, maintained for the framer.
    pub records_in_current_frame: usize,

    // Current-record scratch, one per report family.
    pub(crate) plot: Plot,
    pub(crate) track: Track,
    pub(crate) service: ServiceMessage,
    pub(crate) sensor: SensorStatus,
    pub(crate) alert: SafetyNetAlert,

    /// Category 001 only: the record announced itself as a track via
    /// I001/020, so FRNs from 3 up resolve through the track UAP.
    pub(crate) cat001_track_uap: bool,
}

impl DecoderContext {
    pub fn new(config: DecoderConfig) -> Self {
        let start_date = config.start_date;
        DecoderContext {
            config,
            frame_date: start_date,
            ..DecoderContext::default()
        }
    }

    /// Install the frame context for the next data block(s).
    pub fn set_frame(&mut self, date: Option<FrameDate>, time: Option<f64>, line: Option<u16>) {
        self.frame_date = date;
        self.frame_time = time;
        self.line_number = line;
        self.records_in_current_frame = 0;
    }

    pub(crate) fn header(&self, category: u8) -> ReportHeader {
        ReportHeader {
            category,
            frame_date: self.frame_date,
            frame_time: self.frame_time,
            line_number: self.line_number,
        }
    }

    pub(crate) fn remember_sacsic(&mut self, dsi: u16) {
        self.last_sacsic = Some(dsi);
    }

    pub(crate) fn remember_tod(&mut self, tod: u32) {
        self.last_tod = Some(tod);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_date_seeds_frame_date() {
        let date = FrameDate { year: 2018, month: 4, day: 27 };
        let ctx = DecoderContext::new(DecoderConfig {
            start_date: Some(date),
            ..DecoderConfig::default()
        });
        assert_eq!(ctx.frame_date, Some(date));
    }

    #[test]
    fn set_frame_resets_record_counter() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        ctx.records_in_current_frame = 7;
        ctx.set_frame(None, Some(1.5), Some(3));
        assert_eq!(ctx.records_in_current_frame, 0);
        assert_eq!(ctx.frame_time, Some(1.5));
        assert_eq!(ctx.line_number, Some(3));
    }
}
