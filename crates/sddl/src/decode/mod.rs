//! ASTERIX record decoding.
//!
//! The framing layer locates data blocks inside whatever container the
//! recording uses and hands over `(category, records payload)` pairs; this
//! module turns each record of the payload into one typed [`Report`].
//!
//! | Category | Contents                              | Report          |
//! |----------|---------------------------------------|-----------------|
//! | 000      | MADAP track server supervisory        | `Service`       |
//! | 001      | Monoradar plots and tracks            | `Plot`          |
//! | 002      | Monoradar service messages            | `Service`       |
//! | 004      | Safety net alerts                     | `SafetyNet`     |
//! | 030      | ARTAS system tracks                   | `Track`         |
//! | 032      | ARTAS miniplan updates                | `Track`         |
//! | 048      | Monoradar target reports              | `Plot`          |
//! | 063      | Sensor status                         | `SensorStatus`  |
//! | 252      | ARTAS server/service control          | `Service`       |

pub mod bits;
pub mod cat000;
pub mod cat001;
pub mod cat002;
pub mod cat004;
pub mod cat030;
pub mod cat032;
pub mod cat048;
pub mod cat063;
pub mod cat252;
pub mod context;
pub mod error;
pub mod fspec;
pub mod item;
pub mod report;
pub mod time;

use context::DecoderContext;
use error::{DecodeError, ItemFlow, Result};
use fspec::Fspec;
use item::Uap;
use report::Report;
use tracing::warn;

use crate::sink::Sink;

/// Metres per nautical mile.
pub const NMI_TO_METRES: f64 = 1852.0;
/// Metres per foot.
pub const FT_TO_METRES: f64 = 0.3048;

/// Decode every record of one data block payload, emitting reports in
/// order.
///
/// The payload is the records region only: the CAT/LEN block header has
/// already been consumed by the framer. An error aborts the current record
/// and the remainder of the block; records emitted before the error stay
/// emitted.
pub fn decode_data_block<S: Sink + ?Sized>(
    ctx: &mut DecoderContext,
    category: u8,
    payload: &[u8],
    sink: &mut S,
) -> Result<()> {
    match category {
        0 => cat000::decode_block(ctx, payload, sink),
        1 => cat001::decode_block(ctx, payload, sink),
        2 => cat002::decode_block(ctx, payload, sink),
        4 => cat004::decode_block(ctx, payload, sink),
        30 => cat030::decode_block(ctx, payload, sink),
        32 => cat032::decode_block(ctx, payload, sink),
        48 => cat048::decode_block(ctx, payload, sink),
        63 => cat063::decode_block(ctx, payload, sink),
        252 => cat252::decode_block(ctx, payload, sink),
        _ => Err(DecodeError::UnknownCategory { category }),
    }
}

/// Whether a category treats a record with no presence bits as a soft end
/// of the block rather than a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmptyRecord {
    Error,
    SkipBlock,
}

/// Shared record loop.
///
/// For each record: reset the category scratch (`begin`), read the FSPEC,
/// resolve each set FRN through `uap_for` (re-read per FRN so category 001
/// can swap tables mid-record), run the item kernel, then freeze the scratch
/// into a report (`finish`) and hand it to the sink.
pub(crate) fn run_records<S, U, B, F>(
    ctx: &mut DecoderContext,
    payload: &[u8],
    on_empty: EmptyRecord,
    uap_for: U,
    begin: B,
    finish: F,
    sink: &mut S,
) -> Result<()>
where
    S: Sink + ?Sized,
    U: Fn(&DecoderContext) -> &'static Uap,
    B: Fn(&mut DecoderContext),
    F: Fn(&mut DecoderContext) -> Report,
{
    let mut pos = 0;

    while pos < payload.len() {
        ctx.records_in_current_frame += 1;

        begin(ctx);

        let record_start = pos;
        let cap = uap_for(ctx).max_fspec();
        let fspec = Fspec::read(payload, &mut pos, cap)?;

        if fspec.is_empty() {
            match on_empty {
                EmptyRecord::Error => {
                    return Err(DecodeError::EmptyRecord { offset: record_start })
                }
                EmptyRecord::SkipBlock => {
                    warn!(offset = record_start, "empty record, skipping rest of block");
                    return Ok(());
                }
            }
        }

        for &frn in fspec.frns() {
            let uap = uap_for(ctx);
            let desc = uap.descriptor(frn)?;
            match item::decode_item(ctx, desc, payload, &mut pos, cap)? {
                ItemFlow::Done => {}
                ItemFlow::Skip => continue,
            }
        }

        let report = finish(ctx);
        sink.emit(report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::context::DecoderConfig;
    use crate::sink::VecSink;

    #[test]
    fn unknown_category_is_rejected() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        let err = decode_data_block(&mut ctx, 42, &[0x80, 0x00], &mut sink).unwrap_err();
        assert_eq!(err, DecodeError::UnknownCategory { category: 42 });
    }

    #[test]
    fn empty_payload_is_a_no_op() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        decode_data_block(&mut ctx, 48, &[], &mut sink).unwrap();
        assert!(sink.reports.is_empty());
    }
}
