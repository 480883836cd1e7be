//! ASTERIX category 002: monoradar service messages.
//!
//! Reference: EUROCONTROL SUR.ET1.ST05.2000-STD-02b-01, edition 1.0.
//!
//! North/south markers, sector crossings and blind-zone filtering
//! notifications. The data source identifier seen here feeds the category
//! 001 SAC/SIC inheritance, and the time of day refreshes the reference
//! used to fill up truncated category 001 timestamps.

use std::f64::consts::{PI, TAU};

use once_cell::sync::Lazy;
use tracing::debug;

use super::bits::{u16_be, u32_be};
use super::context::DecoderContext;
use super::error::{DecodeError, ItemFlow, Result};
use super::item::{
    decode_item, read_opaque, Descriptor, EmptyRep, ItemKind, Uap, RFS_INDICATOR, SPF_INDICATOR,
};
use super::report::{
    CollimationError, DataSourceIdentifier, PlotCount, PolarWindow, Report, ServiceKind,
    ServiceMessage,
};
use super::time::tod_to_seconds;
use super::{run_records, EmptyRecord, NMI_TO_METRES};
use crate::sink::Sink;

const CAT: u8 = 2;
const MAX_FRN: usize = 14;
const MAX_FSPEC_LENGTH: usize = 2;

static UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i002_010))
        .set(2, fixed(0, 1, i002_000))
        .set(3, fixed(20, 1, i002_020))
        .set(4, fixed(30, 3, i002_030))
        .set(5, fixed(41, 2, i002_041))
        .set(6, variable(50, i002_050))
        .set(7, variable(60, i002_060))
        .set(8, Descriptor {
            category: CAT,
            item: 70,
            kind: ItemKind::Repetitive { elem: 2, empty: EmptyRep::Allow, decode: i002_070 },
        })
        .set(9, fixed(100, 8, i002_100))
        .set(10, fixed(90, 2, i002_090))
        .set(11, variable(80, i002_080))
        .set(13, Descriptor {
            category: CAT,
            item: SPF_INDICATOR,
            kind: ItemKind::Opaque { read: i002_spf },
        })
        .set(14, Descriptor {
            category: CAT,
            item: RFS_INDICATOR,
            kind: ItemKind::Opaque { read: i002_rfs },
        })
});

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

fn variable(item: u16, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Variable { decode } }
}

pub fn decode_block<S: Sink + ?Sized>(
    ctx: &mut DecoderContext,
    payload: &[u8],
    sink: &mut S,
) -> Result<()> {
    run_records(
        ctx,
        payload,
        EmptyRecord::Error,
        |_| &*UAP,
        |ctx| {
            ctx.service = ServiceMessage::default();
            ctx.service.header = ctx.header(CAT);
        },
        |ctx| Report::Service(std::mem::take(&mut ctx.service)),
        sink,
    )
}

/// I002/000, message type.
fn i002_000(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mtp = data[0];
    let service = &mut ctx.service;
    service.kind = match mtp {
        1 => {
            service.antenna_azimuth = Some(0.0);
            ServiceKind::NorthMarker
        }
        2 => ServiceKind::SectorCrossing,
        3 => {
            service.antenna_azimuth = Some(PI);
            ServiceKind::SouthMarker
        }
        8 => {
            service.activate_filtering_zone = true;
            ServiceKind::FilteringZone
        }
        9 => {
            service.deactivate_filtering_zone = true;
            ServiceKind::FilteringZone
        }
        _ => ServiceKind::Undefined,
    };
    Ok(ItemFlow::Done)
}

/// I002/010, data source identifier. Also remembered for the category 001
/// SAC/SIC inheritance.
fn i002_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let dsi = u16_be(data[0], data[1]);
    ctx.remember_sacsic(dsi);
    ctx.service.data_source = Some(DataSourceIdentifier::new(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I002/020, sector angle in 360/256 degrees.
fn i002_020(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.antenna_azimuth = Some(TAU / 256.0 * data[0] as f64);
    Ok(ItemFlow::Done)
}

/// I002/030, time of day in 1/128 s. Refreshes the truncated-ToD reference.
fn i002_030(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.remember_tod(tod);
    ctx.service.message_time = Some(tod_to_seconds(tod));
    ctx.service.time_of_day = Some(tod);
    Ok(ItemFlow::Done)
}

/// I002/041, antenna rotation period in 1/128 s; zero periods carry no
/// speed.
fn i002_041(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let ars = u16_be(data[0], data[1]);
    if ars > 0 {
        ctx.service.antenna_rotation_speed = Some(TAU * 128.0 / ars as f64);
    }
    Ok(ItemFlow::Done)
}

/// I002/050, station configuration status (opaque bit pattern).
fn i002_050(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.station_configuration = Some(data.to_vec());
    Ok(ItemFlow::Done)
}

/// I002/060, station processing mode (opaque bit pattern).
fn i002_060(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.station_processing_mode = Some(data.to_vec());
    Ok(ItemFlow::Done)
}

/// I002/070, plot count values.
fn i002_070(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rep = data[0] as usize;
    for chunk in data[1..1 + 2 * rep].chunks_exact(2) {
        let u = u16_be(chunk[0], chunk[1]);
        ctx.service.plot_counts.push(PlotCount {
            aerial: ((u >> 15) & 0x01) as u8,
            ident: ((u >> 10) & 0x1f) as u8,
            counter: u & 0x03ff,
        });
    }
    Ok(ItemFlow::Done)
}

/// I002/080, warning/error conditions (opaque bit pattern).
fn i002_080(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.warning_error_conditions = Some(data.to_vec());
    Ok(ItemFlow::Done)
}

/// I002/090, collimation error. Both octets are sign-and-magnitude, not
/// two's complement.
fn i002_090(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let magnitude = |b: u8| {
        let v = (b & 0x7f) as f64;
        if b & 0x80 != 0 {
            -v
        } else {
            v
        }
    };
    ctx.service.collimation_error = Some(CollimationError {
        range: NMI_TO_METRES / 128.0 * magnitude(data[0]),
        azimuth: TAU / 16384.0 * magnitude(data[1]),
    });
    Ok(ItemFlow::Done)
}

/// I002/100, dynamic window in polar coordinates.
fn i002_100(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rho_start = u16_be(data[0], data[1]);
    let rho_end = u16_be(data[2], data[3]);
    let theta_start = u16_be(data[4], data[5]);
    let theta_end = u16_be(data[6], data[7]);
    ctx.service.polar_window = Some(PolarWindow {
        range_start: NMI_TO_METRES / 128.0 * rho_start as f64,
        range_stop: NMI_TO_METRES / 128.0 * rho_end as f64,
        azimuth_start: TAU / 65536.0 * theta_start as f64,
        azimuth_stop: TAU / 65536.0 * theta_end as f64,
    });
    Ok(ItemFlow::Done)
}

fn i002_spf(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I002/SPF: 0x{}", hex::encode(raw));
    Ok(ItemFlow::Done)
}

/// Random field sequencing: a count followed by (FRN, item) pairs resolved
/// through the standard UAP.
fn i002_rfs(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
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
        let desc = UAP.descriptor(frn as usize)?;
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

    #[test]
    fn north_marker_message() {
        // I002/010 SAC=0x00 SIC=0x10, then I002/000 MTP=1.
        let reports = decode(&hex!("c0001001"));
        assert_eq!(reports.len(), 1);
        let Report::Service(msg) = &reports[0] else { panic!("not a service message") };
        assert_eq!(msg.kind, ServiceKind::NorthMarker);
        assert_eq!(msg.antenna_azimuth, Some(0.0));
        let dsi = msg.data_source.unwrap();
        assert_eq!(dsi.value(), 0x0010);
        assert!(!dsi.supplemented);
    }

    #[test]
    fn sector_crossing_with_time() {
        // MTP=2, sector 64 (90 deg), ToD 512 (4 s).
        let reports = decode(&hex!("f000100240000200"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_eq!(msg.kind, ServiceKind::SectorCrossing);
        assert_relative_eq!(msg.antenna_azimuth.unwrap(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(msg.message_time.unwrap(), 4.0);
        assert_eq!(msg.time_of_day, Some(512));
    }

    #[test]
    fn south_marker_azimuth() {
        let reports = decode(&hex!("c0001003"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_eq!(msg.kind, ServiceKind::SouthMarker);
        assert_relative_eq!(msg.antenna_azimuth.unwrap(), PI);
    }

    #[test]
    fn rotation_speed_guards_zero_period() {
        // I002/010, I002/000, I002/041 with a zero rotation period.
        let reports = decode(&hex!("c80010020000"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_eq!(msg.antenna_rotation_speed, None);

        // A 10 s period (1280 LSB) reads back as 2 pi / 10 rad/s.
        let reports = decode(&hex!("c80010020500"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_relative_eq!(msg.antenna_rotation_speed.unwrap(), TAU / 10.0);
    }

    #[test]
    fn collimation_error_sign_magnitude() {
        // FSPEC 0xc1 0x20: I002/010, I002/000, I002/090.
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        decode_block(&mut ctx, &hex!("c120001001817f"), &mut sink).unwrap();
        let Report::Service(msg) = &sink.reports[0] else { panic!() };
        let ce = msg.collimation_error.unwrap();
        // Range -1/128 NM, azimuth +127 * 360/2^14 deg.
        assert_relative_eq!(ce.range, -NMI_TO_METRES / 128.0);
        assert_relative_eq!(ce.azimuth, TAU / 16384.0 * 127.0);
    }

    #[test]
    fn rfs_reroutes_items() {
        // FSPEC 0x01 0x02 selects FRN 14 (RFS); one field, FRN 2 = I002/000
        // with MTP 1.
        let reports = decode(&hex!("0102010201"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_eq!(msg.kind, ServiceKind::NorthMarker);
    }

    #[test]
    fn empty_record_is_an_error() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        let err = decode_block(&mut ctx, &hex!("00"), &mut sink).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyRecord { .. }));
    }
}
