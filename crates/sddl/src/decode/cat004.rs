//! ASTERIX category 004: safety net messages.
//!
//! Reference: EUROCONTROL SUR.ET1.ST05.2000-STD-17-02, edition 1.2.
//!
//! STCA, APW, MSAW, RIMCAS and related alerts. The per-aircraft blocks
//! I004/170 and I004/171 use a two-octet extensible primary subfield; a set
//! reserved bit in the second primary octet is a decode error. The REF and
//! SPF slots both parse as length-prefixed opaque fields.

use once_cell::sync::Lazy;
use tracing::debug;

use super::bits::{i16_be, i32_be, sign_extend, u16_be, u32_be};
use super::context::DecoderContext;
use super::error::{DecodeError, ItemFlow, Result};
use super::item::{
    read_opaque, Descriptor, EmptyRep, ItemKind, Uap, REF_INDICATOR, SPF_INDICATOR,
};
use super::report::{
    AlertAircraft, AreaDefinition, ConflictCharacteristics, ConflictPositionCartesian,
    ConflictPositionWgs84, ConflictTiming, DataSourceIdentifier, Report, SafetyNetAlert,
};
use super::time::tod_to_seconds;
use super::{run_records, EmptyRecord};
use crate::sink::Sink;

const CAT: u8 = 4;
const MAX_FRN: usize = 21;
const MAX_FSPEC_LENGTH: usize = 3;

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

fn compound(item: u16, read: super::item::ItemReader) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Compound { read } }
}

static UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i004_010))
        .set(2, fixed(0, 1, i004_000))
        .set(3, Descriptor {
            category: CAT,
            item: 15,
            kind: ItemKind::Repetitive { elem: 2, empty: EmptyRep::Skip, decode: i004_015 },
        })
        .set(4, fixed(20, 3, i004_020))
        .set(5, fixed(40, 2, i004_040))
        .set(6, fixed(45, 1, i004_045))
        .set(7, Descriptor {
            category: CAT,
            item: 60,
            kind: ItemKind::Variable { decode: i004_060 },
        })
        .set(8, fixed(30, 2, i004_030))
        .set(9, compound(170, i004_170))
        .set(10, compound(120, i004_120))
        .set(11, compound(70, i004_070))
        .set(12, fixed(76, 2, i004_076))
        .set(13, fixed(74, 2, i004_074))
        .set(14, fixed(75, 3, i004_075))
        .set(15, compound(100, i004_100))
        .set(16, fixed(35, 2, i004_035))
        .set(17, compound(171, i004_171))
        .set(18, Descriptor {
            category: CAT,
            item: 110,
            kind: ItemKind::Repetitive { elem: 2, empty: EmptyRep::Skip, decode: i004_110 },
        })
        .set(20, Descriptor {
            category: CAT,
            item: REF_INDICATOR,
            kind: ItemKind::Opaque { read: i004_ref },
        })
        .set(21, Descriptor {
            category: CAT,
            item: SPF_INDICATOR,
            kind: ItemKind::Opaque { read: i004_spf },
        })
});

pub fn decode_block<S: Sink + ?Sized>(
    ctx: &mut DecoderContext,
    payload: &[u8],
    sink: &mut S,
) -> Result<()> {
    run_records(
        ctx,
        payload,
        EmptyRecord::SkipBlock,
        |_| &*UAP,
        |ctx| {
            ctx.alert = SafetyNetAlert::default();
            ctx.alert.header = ctx.header(CAT);
        },
        |ctx| Report::SafetyNet(std::mem::take(&mut ctx.alert)),
        sink,
    )
}

/// I004/000, message type (1..17 standard alerts, 99 AIW).
fn i004_000(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.message_type = Some(data[0]);
    Ok(ItemFlow::Done)
}

/// I004/010, data source identifier.
fn i004_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.data_source = Some(DataSourceIdentifier::new(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I004/015, SDPS identifiers contributing to the alert.
fn i004_015(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rep = data[0] as usize;
    for pair in data[1..1 + 2 * rep].chunks_exact(2) {
        ctx.alert.sdps_identifiers.push((pair[0], pair[1]));
    }
    Ok(ItemFlow::Done)
}

/// I004/020, time of day in 1/128 s.
fn i004_020(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.alert.time_of_day = Some(tod_to_seconds(tod));
    Ok(ItemFlow::Done)
}

/// I004/030, track number 1.
fn i004_030(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.track_number_1 = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I004/035, track number 2.
fn i004_035(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.track_number_2 = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I004/040, alert identifier.
fn i004_040(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.alert_identifier = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I004/045, alert status.
fn i004_045(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.alert_status = Some((data[0] >> 1) & 0x07);
    Ok(ItemFlow::Done)
}

/// I004/060, safety net function status: kept as the raw extent octets.
fn i004_060(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.function_status = Some(data.to_vec());
    Ok(ItemFlow::Done)
}

/// I004/070, conflict timing and separation.
fn i004_070(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let df1 = primary_octet(payload, pos, 70)?;
    let mut timing = ConflictTiming::default();

    if df1 & 0x80 != 0 {
        let b = take(payload, pos, 3, 70)?;
        timing.time_to_conflict =
            Some(tod_to_seconds(u32_be(0, b[0], b[1], b[2])));
    }
    if df1 & 0x40 != 0 {
        let b = take(payload, pos, 3, 70)?;
        timing.time_to_closest_approach =
            Some(tod_to_seconds(u32_be(0, b[0], b[1], b[2])));
    }
    if df1 & 0x20 != 0 {
        let b = take(payload, pos, 3, 70)?;
        timing.current_horizontal_separation =
            Some(0.5 * u32_be(0, b[0], b[1], b[2]) as f64);
    }
    if df1 & 0x10 != 0 {
        let b = take(payload, pos, 2, 70)?;
        timing.minimum_horizontal_separation = Some(0.5 * u16_be(b[0], b[1]) as f64);
    }
    if df1 & 0x08 != 0 {
        let b = take(payload, pos, 2, 70)?;
        timing.current_vertical_separation_feet = Some(25 * u16_be(b[0], b[1]) as i32);
    }
    if df1 & 0x04 != 0 {
        let b = take(payload, pos, 2, 70)?;
        timing.minimum_vertical_separation_feet = Some(25 * u16_be(b[0], b[1]) as i32);
    }

    ctx.alert.conflict_timing = Some(timing);
    Ok(ItemFlow::Done)
}

/// I004/074, longitudinal deviation in 32 m.
fn i004_074(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.longitudinal_deviation = Some(32.0 * u16_be(data[0], data[1]) as f64);
    Ok(ItemFlow::Done)
}

/// I004/075, transversal distance deviation: 24-bit two's complement in
/// 0.5 m.
fn i004_075(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let raw = u32_be(0, data[0], data[1], data[2]);
    ctx.alert.transversal_deviation = Some(0.5 * sign_extend(raw, 24) as f64);
    Ok(ItemFlow::Done)
}

/// I004/076, vertical deviation in 25 ft.
fn i004_076(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.alert.vertical_deviation_feet = Some(25 * i16_be(data[0], data[1]) as i32);
    Ok(ItemFlow::Done)
}

/// I004/100, area definition: up to six 6/7-character name subfields.
fn i004_100(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let df1 = primary_octet(payload, pos, 100)?;
    let mut area = AreaDefinition::default();

    let text = |pos: &mut usize, len: usize| -> Result<String> {
        let b = take(payload, pos, len, 100)?;
        Ok(trimmed_text(b))
    };

    if df1 & 0x80 != 0 {
        area.area_name = Some(text(pos, 6)?);
    }
    if df1 & 0x40 != 0 {
        area.crossing_area_name = Some(text(pos, 7)?);
    }
    if df1 & 0x20 != 0 {
        area.runway_taxiway_1 = Some(text(pos, 7)?);
    }
    if df1 & 0x10 != 0 {
        area.runway_taxiway_2 = Some(text(pos, 7)?);
    }
    if df1 & 0x08 != 0 {
        area.stop_bar = Some(text(pos, 7)?);
    }
    if df1 & 0x04 != 0 {
        area.gate = Some(text(pos, 7)?);
    }

    ctx.alert.area_definition = Some(area);
    Ok(ItemFlow::Done)
}

/// I004/110, FDPS sector control identification (centre, position) pairs.
fn i004_110(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rep = data[0] as usize;
    for pair in data[1..1 + 2 * rep].chunks_exact(2) {
        ctx.alert.fdps_sectors.push((pair[0], pair[1]));
    }
    Ok(ItemFlow::Done)
}

/// I004/120, conflict characteristics. The conflict nature subfield itself
/// extends through its own FX bit.
fn i004_120(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let df1 = primary_octet(payload, pos, 120)?;
    let mut cc = ConflictCharacteristics::default();

    if df1 & 0x80 != 0 {
        let first = take(payload, pos, 1, 120)?[0];
        cc.nature = Some(if first & 0x01 != 0 {
            let second = take(payload, pos, 1, 120)?[0];
            u16_be(first, second)
        } else {
            u16_be(first, 0)
        });
    }
    if df1 & 0x40 != 0 {
        cc.classification = Some(take(payload, pos, 1, 120)?[0]);
    }
    if df1 & 0x20 != 0 {
        cc.probability = Some(0.5 * take(payload, pos, 1, 120)?[0] as f64);
    }
    if df1 & 0x10 != 0 {
        let b = take(payload, pos, 3, 120)?;
        cc.duration = Some(tod_to_seconds(u32_be(0, b[0], b[1], b[2])));
    }

    ctx.alert.conflict_characteristics = Some(cc);
    Ok(ItemFlow::Done)
}

/// I004/170, aircraft 1 identification and characteristics.
fn i004_170(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let aircraft = read_alert_aircraft(payload, pos, 170)?;
    ctx.alert.aircraft_1 = aircraft;
    Ok(ItemFlow::Done)
}

/// I004/171, aircraft 2 identification and characteristics.
fn i004_171(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let aircraft = read_alert_aircraft(payload, pos, 171)?;
    ctx.alert.aircraft_2 = aircraft;
    Ok(ItemFlow::Done)
}

/// Shared layout of I004/170 and I004/171: a primary subfield of up to two
/// octets (ten subfield bits plus reserved bits that must stay clear).
fn read_alert_aircraft(payload: &[u8], pos: &mut usize, item: u16) -> Result<AlertAircraft> {
    let start = *pos;
    let df1 = primary_octet(payload, pos, item)?;
    let mut df2 = 0;
    if df1 & 0x01 != 0 {
        df2 = take(payload, pos, 1, item)?[0];
        if df2 & 0x01 != 0 {
            return Err(DecodeError::BadCompoundEncoding { category: CAT, item, offset: start });
        }
    }

    let mut ac = AlertAircraft::default();

    if df1 & 0x80 != 0 {
        let b = take(payload, pos, 7, item)?;
        ac.identifier = Some(trimmed_text(b));
    }
    if df1 & 0x40 != 0 {
        let b = take(payload, pos, 2, item)?;
        ac.mode_3a = Some(u16_be(b[0], b[1]) & 0x0fff);
    }
    if df1 & 0x20 != 0 {
        let b = take(payload, pos, 10, item)?;
        ac.predicted_position_wgs84 = Some(ConflictPositionWgs84 {
            latitude: 180.0 / (1u32 << 25) as f64 * i32_be(b[0], b[1], b[2], b[3]) as f64,
            longitude: 180.0 / (1u32 << 25) as f64 * i32_be(b[4], b[5], b[6], b[7]) as f64,
            altitude_feet: 25 * i16_be(b[8], b[9]) as i32,
        });
    }
    if df1 & 0x10 != 0 {
        let b = take(payload, pos, 8, item)?;
        let x = sign_extend(u32_be(0, b[0], b[1], b[2]), 24);
        let y = sign_extend(u32_be(0, b[3], b[4], b[5]), 24);
        ac.predicted_position_cartesian = Some(ConflictPositionCartesian {
            x: 0.5 * x as f64,
            y: 0.5 * y as f64,
            z_feet: 25 * i16_be(b[6], b[7]) as i32,
        });
    }
    if df1 & 0x08 != 0 {
        let b = take(payload, pos, 3, item)?;
        ac.time_to_threshold = Some(tod_to_seconds(u32_be(0, b[0], b[1], b[2])));
    }
    if df1 & 0x04 != 0 {
        let b = take(payload, pos, 2, item)?;
        ac.distance_to_threshold = Some(0.5 * u16_be(b[0], b[1]) as f64);
    }
    if df1 & 0x02 != 0 {
        let first = take(payload, pos, 1, item)?[0];
        let second = if first & 0x01 != 0 {
            Some(take(payload, pos, 1, item)?[0])
        } else {
            None
        };
        ac.characteristics = Some((first, second));
    }
    if df2 & 0x80 != 0 {
        let b = take(payload, pos, 6, item)?;
        ac.mode_s_identifier = Some(b.try_into().expect("fixed length"));
    }
    if df2 & 0x40 != 0 {
        let b = take(payload, pos, 4, item)?;
        ac.flight_plan_number = Some(u32_be(b[0], b[1], b[2], b[3]));
    }
    if df2 & 0x20 != 0 {
        let b = take(payload, pos, 2, item)?;
        ac.cleared_flight_level_feet = Some(25 * i16_be(b[0], b[1]) as i32);
    }

    Ok(ac)
}

fn i004_ref(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I004/REF: 0x{}", hex::encode(raw));
    Ok(ItemFlow::Done)
}

fn i004_spf(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I004/SPF: 0x{}", hex::encode(raw));
    Ok(ItemFlow::Done)
}

fn primary_octet(payload: &[u8], pos: &mut usize, item: u16) -> Result<u8> {
    let b = *payload.get(*pos).ok_or(DecodeError::Truncated {
        category: CAT,
        item,
        needed: 1,
        offset: *pos,
    })?;
    *pos += 1;
    Ok(b)
}

fn take<'a>(payload: &'a [u8], pos: &mut usize, len: usize, item: u16) -> Result<&'a [u8]> {
    let b = payload.get(*pos..*pos + len).ok_or(DecodeError::Truncated {
        category: CAT,
        item,
        needed: len,
        offset: *pos,
    })?;
    *pos += len;
    Ok(b)
}

fn trimmed_text(b: &[u8]) -> String {
    let s: String = b
        .iter()
        .map(|&c| if c.is_ascii_graphic() || c == b' ' { c as char } else { ' ' })
        .collect();
    s.trim_end().to_string()
}
