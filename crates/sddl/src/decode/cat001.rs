//! ASTERIX category 001: monoradar plots and tracks.
//!
//! Reference: EUROCONTROL SUR.ET1.ST05.2000-STD-02a-01, edition 1.1.
//!
//! Two category quirks live here:
//!
//! - **UAP switch.** Bit 8 of the first octet of I001/020 announces whether
//!   the record is a plot or a track, and the two layouts assign different
//!   items to FRNs 3 and up (the first two FRNs coincide, which is the only
//!   reason the scheme works). The dispatcher re-reads the active table
//!   before every FRN lookup; the plot table is restored at each record
//!   start.
//! - **SAC/SIC inheritance.** Records without I001/010 inherit the last
//!   SAC/SIC seen in the same data block (from a category 001 record or an
//!   interleaved category 002 service message); such reports are marked
//!   `supplemented`. The memory resets at the start of every block.

use std::f64::consts::TAU;

use once_cell::sync::Lazy;
use tracing::debug;

use super::bits::{sign_extend, u16_be};
use super::context::DecoderContext;
use super::error::{DecodeError, ItemFlow, Result};
use super::item::{
    decode_item, read_opaque, Descriptor, ItemKind, Uap, RFS_INDICATOR, SPF_INDICATOR,
};
use super::report::{
    CartesianPosition, DataSourceIdentifier, DetectionType, GroundVector, GrayModeCCode,
    MeasuredPosition, ModeCHeight, Plot, Report, ReportedTrackStatus, SsrCode, XPulses,
};
use super::time::{fill_truncated_tod, tod_to_seconds};
use super::{run_records, EmptyRecord, FT_TO_METRES, NMI_TO_METRES};
use crate::sink::Sink;

const CAT: u8 = 1;
const MAX_FRN: usize = 28;
const MAX_FSPEC_LENGTH: usize = 4;

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

fn variable(item: u16, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Variable { decode } }
}

fn spf() -> Descriptor {
    Descriptor { category: CAT, item: SPF_INDICATOR, kind: ItemKind::Opaque { read: i001_spf } }
}

fn rfs() -> Descriptor {
    Descriptor { category: CAT, item: RFS_INDICATOR, kind: ItemKind::Opaque { read: i001_rfs } }
}

/// Standard plot UAP.
static PLOT_UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i001_010))
        .set(2, variable(20, i001_020))
        .set(3, fixed(40, 4, i001_040))
        .set(4, fixed(70, 2, i001_070))
        .set(5, fixed(90, 2, i001_090))
        .set(6, variable(130, i001_130))
        .set(7, fixed(141, 2, i001_141))
        .set(8, fixed(50, 2, i001_050))
        .set(9, fixed(120, 1, i001_120))
        .set(10, fixed(131, 1, i001_131))
        .set(11, fixed(80, 2, i001_080))
        .set(12, fixed(100, 4, i001_100))
        .set(13, fixed(60, 2, i001_060))
        .set(14, variable(30, i001_030))
        .set(15, fixed(150, 1, i001_150))
        .set(20, spf())
        .set(21, rfs())
});

/// Standard radar track UAP, active from FRN 3 once I001/020 flags the
/// record as a track.
static TRACK_UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i001_010))
        .set(2, variable(20, i001_020))
        .set(3, fixed(161, 2, i001_161))
        .set(4, fixed(40, 4, i001_040))
        .set(5, fixed(42, 4, i001_042))
        .set(6, fixed(200, 4, i001_200))
        .set(7, fixed(70, 2, i001_070))
        .set(8, fixed(90, 2, i001_090))
        .set(9, fixed(141, 2, i001_141))
        .set(10, variable(130, i001_130))
        .set(11, fixed(131, 1, i001_131))
        .set(12, fixed(120, 1, i001_120))
        .set(13, variable(170, i001_170))
        .set(14, variable(210, i001_210))
        .set(15, fixed(50, 2, i001_050))
        .set(16, fixed(80, 2, i001_080))
        .set(17, fixed(100, 4, i001_100))
        .set(18, fixed(60, 2, i001_060))
        .set(19, variable(30, i001_030))
        .set(20, spf())
        .set(21, rfs())
        .set(22, fixed(150, 1, i001_150))
});

fn active_uap(ctx: &DecoderContext) -> &'static Uap {
    if ctx.cat001_track_uap {
        &TRACK_UAP
    } else {
        &PLOT_UAP
    }
}

pub fn decode_block<S: Sink + ?Sized>(
    ctx: &mut DecoderContext,
    payload: &[u8],
    sink: &mut S,
) -> Result<()> {
    // The inheritance buffer never crosses a data block boundary.
    ctx.last_sacsic = None;

    run_records(
        ctx,
        payload,
        EmptyRecord::SkipBlock,
        active_uap,
        |ctx| {
            ctx.plot = Plot::default();
            ctx.plot.header = ctx.header(CAT);
            ctx.cat001_track_uap = false;
        },
        |ctx| {
            let mut plot = std::mem::take(&mut ctx.plot);
            if plot.data_source.is_none() {
                if let Some(dsi) = ctx.last_sacsic {
                    plot.data_source = Some(DataSourceIdentifier {
                        sac: (dsi >> 8) as u8,
                        sic: dsi as u8,
                        supplemented: true,
                    });
                }
            }
            Report::Plot(plot)
        },
        sink,
    )
}

/// I001/010, data source identifier. Remembered for inheritance by later
/// records of the same block.
fn i001_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.remember_sacsic(u16_be(data[0], data[1]));
    ctx.plot.data_source = Some(DataSourceIdentifier::new(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I001/020, target report descriptor. The first octet selects the UAP for
/// the remaining FRNs of this record.
fn i001_020(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.cat001_track_uap = data[0] & 0x80 != 0;

    let mut dt = DetectionType { is_radar_track: ctx.cat001_track_uap, ..Default::default() };
    for (ix, &dfo) in data.iter().enumerate() {
        match ix {
            0 => {
                dt.simulated = dfo & 0x40 != 0;
                dt.reported_from_ssr = dfo & 0x20 != 0;
                dt.reported_from_psr = dfo & 0x10 != 0;
                ctx.plot.antenna_number = Some(if dfo & 0x08 != 0 { 2 } else { 1 });
                ctx.plot.special_position_indication = dfo & 0x04 != 0;
                dt.from_fixed_field_transponder = dfo & 0x02 != 0;
            }
            1 => {
                dt.test_target = dfo & 0x80 != 0;
                let emg = (dfo >> 5) & 0x03;
                ctx.plot.emergency_1 = emg == 1;
                ctx.plot.emergency_2 = emg == 2;
                ctx.plot.emergency_3 = emg == 3;
                ctx.plot.military_emergency = dfo & 0x10 != 0;
                ctx.plot.military_ident = dfo & 0x08 != 0;
            }
            _ => {}
        }
    }
    ctx.plot.detection_type = Some(dt);
    Ok(ItemFlow::Done)
}

/// I001/030, warning/error conditions: 7-bit codes above the extension bit.
fn i001_030(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.wec_list = Some(data.iter().map(|b| (b >> 1) & 0x7f).collect());
    Ok(ItemFlow::Done)
}

/// I001/040, measured position in polar coordinates: slant range in 1/128
/// NM, azimuth in 360/2^16 degrees.
fn i001_040(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rho = u16_be(data[0], data[1]);
    let theta = u16_be(data[2], data[3]);
    ctx.plot.measured_position = Some(MeasuredPosition {
        range: NMI_TO_METRES / 128.0 * rho as f64,
        azimuth: TAU / 65536.0 * theta as f64,
    });
    Ok(ItemFlow::Done)
}

/// I001/042, calculated position in Cartesian coordinates, 1/64 NM.
fn i001_042(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let x = u16_be(data[0], data[1]) as i16;
    let y = u16_be(data[2], data[3]) as i16;
    ctx.plot.computed_position = Some(CartesianPosition {
        x: NMI_TO_METRES / 64.0 * x as f64,
        y: NMI_TO_METRES / 64.0 * y as f64,
    });
    Ok(ItemFlow::Done)
}

/// I001/050, mode 2 code. A zero code flagged invalid is not stored.
fn i001_050(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let code = u16_be(data[0] & 0x0f, data[1]);
    if code != 0 || data[0] & 0x80 == 0 {
        ctx.plot.mode_2 = Some(SsrCode {
            code,
            garbled: data[0] & 0x40 != 0,
            invalid: data[0] & 0x80 != 0,
            smoothed: data[0] & 0x20 != 0,
            ..Default::default()
        });
    }
    Ok(ItemFlow::Done)
}

/// I001/060, mode 2 code confidence; only meaningful next to a stored code.
fn i001_060(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let confidence = u16_be(data[0] & 0x0f, data[1]);
    if let Some(mode_2) = &mut ctx.plot.mode_2 {
        mode_2.confidence = Some(confidence);
    }
    Ok(ItemFlow::Done)
}

/// I001/070, mode 3/A code. A zero code flagged invalid is not stored.
fn i001_070(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let code = u16_be(data[0] & 0x0f, data[1]);
    if code == 0 && data[0] & 0x80 != 0 {
        return Ok(ItemFlow::Done);
    }
    ctx.plot.mode_3a = Some(SsrCode {
        code,
        garbled: data[0] & 0x40 != 0,
        invalid: data[0] & 0x80 != 0,
        smoothed: data[0] & 0x20 != 0,
        ..Default::default()
    });
    Ok(ItemFlow::Done)
}

/// I001/080, mode 3/A code confidence.
fn i001_080(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let confidence = u16_be(data[0] & 0x0f, data[1]);
    if let Some(mode_3a) = &mut ctx.plot.mode_3a {
        mode_3a.confidence = Some(confidence);
    }
    Ok(ItemFlow::Done)
}

/// I001/090, mode C height: 13-bit two's complement in 25 ft. A zero height
/// flagged invalid is not stored.
fn i001_090(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let raw = ((data[0] as u32 & 0x1f) << 8) | data[1] as u32;
    let mch = sign_extend((data[0] as u32 & 0x20) << 8 | raw, 14);
    if mch == 0 && data[0] & 0x80 != 0 {
        return Ok(ItemFlow::Done);
    }
    ctx.plot.mode_c_height = Some(ModeCHeight {
        value: 25.0 * FT_TO_METRES * mch as f64,
        value_in_feet: 25 * mch,
        garbled: data[0] & 0x40 != 0,
        invalid: data[0] & 0x80 != 0,
        in_25_feet: mch % 4 != 0,
    });
    Ok(ItemFlow::Done)
}

/// I001/100, mode C code and confidence in Gray notation.
fn i001_100(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.mode_c_code = Some(GrayModeCCode {
        code: u16_be(data[0] & 0x0f, data[1]),
        garbled: data[0] & 0x40 != 0,
        invalid: data[0] & 0x80 != 0,
        confidence: Some(u16_be(data[2] & 0x0f, data[3])),
    });
    Ok(ItemFlow::Done)
}

/// I001/120, measured radial Doppler speed, 8-bit two's complement in
/// 1/256 NM/s.
fn i001_120(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let spd = sign_extend(data[0] as u32, 8);
    ctx.plot.radial_speed = Some(NMI_TO_METRES / 256.0 * spd as f64);
    Ok(ItemFlow::Done)
}

/// I001/130, radar plot characteristics. Consumed for length accounting;
/// the profile leaves the contents sensor specific.
fn i001_130(_ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    debug!("I001/130: 0x{}", hex::encode(data));
    Ok(ItemFlow::Done)
}

/// I001/131, received power in dBm, two's complement.
fn i001_131(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.received_power = Some(sign_extend(data[0] as u32, 8) as i16);
    Ok(ItemFlow::Done)
}

/// I001/141, truncated time of day in 1/128 s. Filled up to a full ToD from
/// the most recent complete one on the stream, when available.
fn i001_141(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let ttod = u16_be(data[0], data[1]);
    ctx.plot.truncated_time_of_day = Some(ttod);
    if let Some(reference) = ctx.last_tod {
        let tod = fill_truncated_tod(ttod, reference);
        ctx.plot.detection_time = Some(tod_to_seconds(tod));
    }
    Ok(ItemFlow::Done)
}

/// I001/150, presence of X pulses.
fn i001_150(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.x_pulses = Some(XPulses {
        mode_3a: data[0] & 0x80 != 0,
        mode_c: data[0] & 0x20 != 0,
        mode_2: data[0] & 0x04 != 0,
    });
    Ok(ItemFlow::Done)
}

/// I001/161, track/plot number.
fn i001_161(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.track_number = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I001/170, track status.
fn i001_170(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mut status = ReportedTrackStatus::default();
    for (ix, &dfo) in data.iter().enumerate() {
        match ix {
            0 => {
                status.confirmed = dfo & 0x80 == 0;
                status.secondary_track = dfo & 0x40 != 0;
                status.primary_track = dfo & 0x40 == 0;
                status.horizontal_manoeuvre = dfo & 0x20 != 0;
                status.doubtful_association = dfo & 0x10 != 0;
                status.ghost = dfo & 0x02 != 0;
            }
            1 => {
                status.track_end = dfo & 0x80 != 0;
                if dfo & 0x80 != 0 {
                    ctx.plot.to_be_cancelled = true;
                }
            }
            _ => {}
        }
    }
    ctx.plot.track_status = Some(status);
    Ok(ItemFlow::Done)
}

/// I001/200, calculated ground speed (2^-14 NM/s) and heading (360/2^16
/// degrees).
fn i001_200(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let spd = u16_be(data[0] & 0x7f, data[1]);
    let hdg = u16_be(data[2], data[3]);
    ctx.plot.ground_vector = Some(GroundVector {
        speed: NMI_TO_METRES / 16384.0 * spd as f64,
        heading: TAU / 65536.0 * hdg as f64,
    });
    Ok(ItemFlow::Done)
}

/// I001/210, track quality: first (up to two) octets kept as reported.
fn i001_210(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.track_quality = Some(if data.len() == 1 {
        data[0] as u16
    } else {
        u16_be(data[0], data[1])
    });
    Ok(ItemFlow::Done)
}

fn i001_spf(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I001/SPF: 0x{}", hex::encode(raw));
    Ok(ItemFlow::Done)
}

/// Random field sequencing, resolved through the UAP active for this
/// record.
fn i001_rfs(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let n = *payload.get(*pos).ok_or(DecodeError::Truncated {
        category: CAT,
        item: RFS_INDICATOR,
        needed: 1,
        offset: *pos,
    })?;
    *pos += 1;
    if n == 0 {
        return Err(DecodeError::ZeroRepetition {
            category: CAT,
            item: RFS_INDICATOR,
            offset: *pos - 1,
        });
    }
    for _ in 0..n {
        let frn = *payload.get(*pos).ok_or(DecodeError::Truncated {
            category: CAT,
            item: RFS_INDICATOR,
            needed: 1,
            offset: *pos,
        })?;
        *pos += 1;
        if frn == 0 || frn as usize > MAX_FRN {
            return Err(DecodeError::BadRfsFrn { frn, offset: *pos - 1 });
        }
        let desc = active_uap(ctx).descriptor(frn as usize)?;
        decode_item(ctx, desc, payload, pos, MAX_FSPEC_LENGTH)?;
    }
    Ok(ItemFlow::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::context::DecoderConfig;
    use crate::sink::VecSink;
    use approx::assert_relative_eq;
    use hexlit::hex;

    fn decode(payload: &[u8]) -> Vec<Report> {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        decode_block(&mut ctx, payload, &mut sink).unwrap();
        sink.reports
    }

    fn plot(report: &Report) -> &Plot {
        match report {
            Report::Plot(p) => p,
            _ => panic!("expected a plot"),
        }
    }

    #[test]
    fn sacsic_inheritance_within_a_block() {
        // Record 1: FRN 1 + 3 (DSI 0x0102, measured position), record 2:
        // FRN 3 only.
        let reports = decode(&hex!("a00102400080002040008000"));
        assert_eq!(reports.len(), 2);

        let first = plot(&reports[0]);
        let dsi = first.data_source.unwrap();
        assert_eq!(dsi.value(), 0x0102);
        assert!(!dsi.supplemented);

        let second = plot(&reports[1]);
        let dsi = second.data_source.unwrap();
        assert_eq!(dsi.value(), 0x0102);
        assert!(dsi.supplemented);

        // rho = 0x4000 -> 128 NM, theta = 0x8000 -> pi.
        let pos = first.measured_position.unwrap();
        assert_relative_eq!(pos.range, 237_009.6, epsilon = 1000.0);
        assert_relative_eq!(pos.azimuth, std::f64::consts::PI, epsilon = 1e-4);
    }

    #[test]
    fn inheritance_resets_between_blocks() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        decode_block(&mut ctx, &hex!("a0010240008000"), &mut sink).unwrap();
        // New block: the lone FRN 3 record has no SAC/SIC to inherit.
        decode_block(&mut ctx, &hex!("2040008000"), &mut sink).unwrap();
        assert_eq!(sink.reports.len(), 2);
        assert_eq!(plot(&sink.reports[1]).data_source, None);
    }

    #[test]
    fn uap_switch_follows_i001_020() {
        // Two records, FSPEC 0x60 each (I001/020 + FRN 3). The first is a
        // plot: FRN 3 is the measured position. The second flags a track:
        // FRN 3 becomes the track number.
        let reports = decode(&hex!("6000400080006080012c"));
        assert_eq!(reports.len(), 2);

        let first = plot(&reports[0]);
        assert!(!first.detection_type.unwrap().is_radar_track);
        assert!(first.measured_position.is_some());
        assert_eq!(first.track_number, None);

        let second = plot(&reports[1]);
        assert!(second.detection_type.unwrap().is_radar_track);
        assert_eq!(second.track_number, Some(300));
        assert_eq!(second.measured_position, None);
    }

    #[test]
    fn mode_3a_zero_invalid_is_dropped() {
        // FSPEC 0x90: FRN 1 + 4 (mode 3/A). Code zero with the invalid bit.
        let reports = decode(&hex!("9001028000"));
        assert_eq!(plot(&reports[0]).mode_3a, None);

        // Same code without the invalid bit is kept.
        let reports = decode(&hex!("9001020000"));
        let code = plot(&reports[0]).mode_3a.unwrap();
        assert_eq!(code.code, 0);
        assert!(!code.invalid);
    }

    #[test]
    fn mode_2_confidence_needs_a_code() {
        // Plot UAP, FSPEC 0x01 0x84: FRN 8 (I001/050) and FRN 13
        // (I001/060).
        let reports = decode(&hex!("01840255023f"));
        let mode_2 = plot(&reports[0]).mode_2.unwrap();
        assert_eq!(mode_2.code, 0x255);
        assert_eq!(mode_2.confidence, Some(0x23f));
    }

    #[test]
    fn mode_c_height_sign_extension() {
        // FSPEC 0x88: FRN 1 + 5 (I001/090), value 0x2000 -> -8192 * 25 ft.
        let reports = decode(&hex!("8801022000"));
        let mch = plot(&reports[0]).mode_c_height.unwrap();
        assert_eq!(mch.value_in_feet, -204_800);

        let reports = decode(&hex!("8801020050"));
        let mch = plot(&reports[0]).mode_c_height.unwrap();
        assert_eq!(mch.value_in_feet, 2000);
        assert!(!mch.garbled);
        assert!(!mch.invalid);
    }

    #[test]
    fn truncated_tod_uses_stream_reference() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();

        // A category 002 sector message sets the full ToD reference.
        crate::decode::cat002::decode_block(
            &mut ctx,
            &hex!("d000100212a480"),
            &mut sink,
        )
        .unwrap();

        // FSPEC 0x82: FRN 1 + 7 (I001/141), truncated ToD 0xb000.
        decode_block(&mut ctx, &hex!("820102b000"), &mut sink).unwrap();
        let report = plot(sink.reports.last().unwrap());
        assert_eq!(report.truncated_time_of_day, Some(0xb000));
        // Reference 0x12a480 -> filled 0x12b000.
        assert_relative_eq!(report.detection_time.unwrap(), 0x12b000 as f64 / 128.0);
    }

    #[test]
    fn doppler_speed_is_signed() {
        // FSPEC 0x81 0x40: FRN 1 + FRN 9 (I001/120), value 0x80 -> -128.
        let reports = decode(&hex!("8140010280"));
        let spd = plot(&reports[0]).radial_speed.unwrap();
        assert_relative_eq!(spd, NMI_TO_METRES / 256.0 * -128.0);
    }

    #[test]
    fn empty_record_skips_rest_of_block() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        decode_block(&mut ctx, &hex!("00ff"), &mut sink).unwrap();
        assert!(sink.reports.is_empty());
    }
}
