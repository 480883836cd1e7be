//! ASTERIX category 032: ARTAS miniplan update messages.
//!
//! Reference: DED.3/SUR/ARTAS.ASTX.015, version 2.8.1.
//!
//! Flight-plan related track updates. The track number of I032/040 is
//! decoded with 16 bits per the written standard, or with the legacy ARTAS
//! 12-bit encoding (low 12 bits plus a numbering indicator) when the
//! context is configured for it.

use once_cell::sync::Lazy;

use super::bits::{i16_be, u16_be, u32_be};
use super::context::{DecoderContext, TrackNumberBits};
use super::error::{DecodeError, ItemFlow, Result};
use super::item::{Descriptor, EmptyRep, ItemKind, Uap};
use super::report::{
    ArtasTrackNumber, DepartureArrivalTime, Report, SsrCode, SupplementaryFlightData, Track,
};
use super::time::tod_to_seconds;
use super::{run_records, EmptyRecord};
use crate::sink::Sink;

const CAT: u8 = 32;
const MAX_FRN: usize = 21;
const MAX_FSPEC_LENGTH: usize = 3;

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

static UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i032_010))
        .set(2, fixed(15, 2, i032_015))
        .set(3, fixed(18, 2, i032_018))
        .set(4, fixed(35, 1, i032_035))
        .set(5, fixed(20, 3, i032_020))
        .set(6, fixed(40, 2, i032_040))
        .set(7, Descriptor {
            category: CAT,
            item: 50,
            kind: ItemKind::Compound { read: i032_050 },
        })
        .set(8, fixed(60, 2, i032_060))
        .set(9, fixed(400, 7, i032_400))
        .set(10, fixed(410, 2, i032_410))
        .set(11, fixed(420, 1, i032_420))
        .set(12, fixed(440, 4, i032_440))
        .set(13, fixed(450, 4, i032_450))
        .set(14, fixed(480, 2, i032_480))
        .set(15, fixed(490, 2, i032_490))
        .set(16, fixed(430, 4, i032_430))
        .set(17, fixed(435, 1, i032_435))
        .set(18, Descriptor {
            category: CAT,
            item: 460,
            kind: ItemKind::Repetitive { elem: 2, empty: EmptyRep::Allow, decode: i032_460 },
        })
        .set(19, Descriptor {
            category: CAT,
            item: 500,
            kind: ItemKind::Compound { read: i032_500 },
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
            ctx.track = Track::default();
            ctx.track.header = ctx.header(CAT);
        },
        |ctx| Report::Track(std::mem::take(&mut ctx.track)),
        sink,
    )
}

/// I032/010, server identification tag.
fn i032_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.server_id = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I032/015, user number.
fn i032_015(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.user_number = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I032/018, data source identification tag. Consumed for length
/// accounting; the miniplan carries the association through I032/010.
fn i032_018(_ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    tracing::debug!("I032/018: 0x{}", hex::encode(data));
    Ok(ItemFlow::Done)
}

/// I032/020, time of message in 1/128 s.
fn i032_020(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.track.time_of_message = Some(tod_to_seconds(tod));
    Ok(ItemFlow::Done)
}

/// I032/035, type of message: family and nature nibbles.
fn i032_035(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.message_type = Some(((data[0] >> 4) & 0x0f, data[0] & 0x0f));
    Ok(ItemFlow::Done)
}

/// I032/040, track number.
///
/// With 12-bit numbering the top nibble carries the numbering indicator;
/// this matches the long-standing ARTAS implementation rather than the
/// ASTERIX standards document and is only used behind the explicit switch.
fn i032_040(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    match ctx.config.track_number_bits {
        TrackNumberBits::Twelve => {
            ctx.track.track_number = Some(u16_be(data[0] & 0x0f, data[1]));
            ctx.track.track_numbering_indicator = Some((data[0] >> 4) & 0x01);
        }
        TrackNumberBits::Sixteen => {
            ctx.track.track_number = Some(u16_be(data[0], data[1]));
        }
    }
    Ok(ItemFlow::Done)
}

/// I032/050, ARTAS track number chain, same layout as the category 030
/// item.
fn i032_050(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let mut first = true;
    loop {
        let group = payload.get(*pos..*pos + 3).ok_or(DecodeError::Truncated {
            category: CAT,
            item: 50,
            needed: 3,
            offset: *pos,
        })?;
        *pos += 3;

        let unit = ((group[0] as u16) << 3) | ((group[1] >> 5) & 0x07) as u16;
        let number = (((group[1] & 0x1f) as u16) << 7) | ((group[2] >> 1) & 0x7f) as u16;
        ctx.track.artas_track_numbers.push(ArtasTrackNumber { unit, number, master: first });
        first = false;

        if group[2] & 0x01 == 0 {
            return Ok(ItemFlow::Done);
        }
    }
}

/// I032/060, track mode 3/A (code only).
fn i032_060(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.mode_3a = Some(SsrCode {
        code: u16_be(data[0] & 0x0f, data[1]),
        ..Default::default()
    });
    Ok(ItemFlow::Done)
}

/// I032/400, callsign, seven ASCII characters.
fn i032_400(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let cs: String = data.iter().map(|&c| c as char).collect();
    ctx.track.callsign = Some(cs.trim_end().to_string());
    Ok(ItemFlow::Done)
}

/// I032/410, PLN number.
fn i032_410(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.flight_plan_number = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I032/420, flight category.
fn i032_420(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.flight_category = Some(data[0]);
    Ok(ItemFlow::Done)
}

/// I032/430, type of aircraft (ICAO designator).
fn i032_430(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let toa: String = data.iter().map(|&c| c as char).collect();
    ctx.track.type_of_aircraft = Some(toa.trim_end().to_string());
    Ok(ItemFlow::Done)
}

/// I032/435, category of turbulence.
fn i032_435(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.wake_turbulence_category = Some(data[0] as char);
    Ok(ItemFlow::Done)
}

/// I032/440, departure airport.
fn i032_440(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let adep: String = data.iter().map(|&c| c as char).collect();
    ctx.track.departure_airport = Some(adep.trim_end().to_string());
    Ok(ItemFlow::Done)
}

/// I032/450, destination airport.
fn i032_450(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let ades: String = data.iter().map(|&c| c as char).collect();
    ctx.track.destination_airport = Some(ades.trim_end().to_string());
    Ok(ItemFlow::Done)
}

/// I032/460, allocated SSR codes.
fn i032_460(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rep = data[0] as usize;
    let codes = data[1..1 + 2 * rep]
        .chunks_exact(2)
        .map(|pair| u16_be(pair[0] & 0x0f, pair[1]))
        .collect();
    ctx.track.allocated_ssr_codes = Some(codes);
    Ok(ItemFlow::Done)
}

/// I032/480, current cleared flight level, 25 ft.
fn i032_480(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.cleared_flight_level_feet = Some(25 * i16_be(data[0], data[1]) as i32);
    Ok(ItemFlow::Done)
}

/// I032/490, current control position (centre, position).
fn i032_490(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.control_position = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I032/500, supplementary flight data. The primary subfield covers two
/// octets when its extension bit is set; the time-of-departure/arrival
/// subfield is repetitive with its own repetition factor.
fn i032_500(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    fn take<'a>(payload: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
        let b = payload.get(*pos..*pos + len).ok_or(DecodeError::Truncated {
            category: CAT,
            item: 500,
            needed: len,
            offset: *pos,
        })?;
        *pos += len;
        Ok(b)
    }

    let df1 = take(payload, pos, 1)?[0];
    let df2 = if df1 & 0x01 != 0 { take(payload, pos, 1)?[0] } else { 0 };

    let mut sup = SupplementaryFlightData::default();

    if df1 & 0x80 != 0 {
        let b = take(payload, pos, 4)?;
        sup.ifps_flight_id = Some(((b[0] >> 6) & 0x03, u32_be(0, b[1], b[2], b[3])));
    }
    if df1 & 0x40 != 0 {
        sup.rvsm_flight_priority = Some(take(payload, pos, 1)?[0]);
    }
    if df1 & 0x20 != 0 {
        let b = take(payload, pos, 3)?;
        sup.runway_designation = Some(ascii_trimmed(b));
    }
    if df1 & 0x10 != 0 {
        let rep = take(payload, pos, 1)?[0];
        if rep == 0 {
            return Err(DecodeError::ZeroRepetition { category: CAT, item: 500, offset: *pos - 1 });
        }
        for _ in 0..rep {
            let b = take(payload, pos, 4)?;
            sup.times.push(DepartureArrivalTime {
                kind: (b[0] >> 3) & 0x1f,
                day: (b[0] >> 1) & 0x03,
                hour: b[1] & 0x1f,
                minute: b[2] & 0x3f,
                second: b[3] & 0x3f,
            });
        }
    }
    if df1 & 0x08 != 0 {
        let b = take(payload, pos, 6)?;
        sup.aircraft_stand = Some(ascii_trimmed(b));
    }
    if df1 & 0x04 != 0 {
        sup.stand_status = Some(take(payload, pos, 1)?[0]);
    }
    if df1 & 0x02 != 0 {
        let b = take(payload, pos, 7)?;
        sup.standard_instrument_departure = Some(ascii_trimmed(b));
    }
    if df2 & 0x80 != 0 {
        let b = take(payload, pos, 7)?;
        sup.standard_instrument_arrival = Some(ascii_trimmed(b));
    }

    ctx.track.supplementary = Some(sup);
    Ok(ItemFlow::Done)
}

fn ascii_trimmed(b: &[u8]) -> String {
    let s: String = b.iter().map(|&c| c as char).collect();
    s.trim_end_matches(['\0', ' ']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::context::DecoderConfig;
    use crate::sink::VecSink;
    use hexlit::hex;

    fn decode_with(config: DecoderConfig, payload: &[u8]) -> Vec<Report> {
        let mut ctx = DecoderContext::new(config);
        let mut sink = VecSink::default();
        decode_block(&mut ctx, payload, &mut sink).unwrap();
        sink.reports
    }

    fn decode(payload: &[u8]) -> Vec<Report> {
        decode_with(DecoderConfig::default(), payload)
    }

    fn track(report: &Report) -> &Track {
        match report {
            Report::Track(t) => t,
            _ => panic!("expected a track"),
        }
    }

    #[test]
    fn sixteen_bit_track_number() {
        // FSPEC 0x84: server id + I032/040 = 0x1234.
        let reports = decode(&hex!("84c8011234"));
        let t = track(&reports[0]);
        assert_eq!(t.track_number, Some(0x1234));
        assert_eq!(t.track_numbering_indicator, None);
    }

    #[test]
    fn twelve_bit_track_number() {
        let config = DecoderConfig {
            track_number_bits: TrackNumberBits::Twelve,
            ..DecoderConfig::default()
        };
        let reports = decode_with(config, &hex!("84c8011234"));
        let t = track(&reports[0]);
        assert_eq!(t.track_number, Some(0x234));
        assert_eq!(t.track_numbering_indicator, Some(1));
    }

    #[test]
    fn flight_plan_update() {
        // FSPEC 0xc1 0xc0: server id, user number, track mode 3/A,
        // callsign.
        let reports = decode(&hex!("c1c0c801003307554d414333343120"));
        let t = track(&reports[0]);
        assert_eq!(t.user_number, Some(0x33));
        assert_eq!(t.mode_3a.unwrap().code, 0x755);
        assert_eq!(t.callsign.as_deref(), Some("MAC341"));
    }

    #[test]
    fn supplementary_flight_data() {
        // FSPEC chain to FRN 19: I032/500 with runway designation and one
        // departure time.
        let payload = hex!("0101083031344c010a0b2238");
        let reports = decode(&payload);
        let sup = track(&reports[0]).supplementary.as_ref().unwrap();
        assert_eq!(sup.runway_designation.as_deref(), Some("14L"));
        assert_eq!(sup.times.len(), 1);
        let time = sup.times[0];
        assert_eq!(time.kind, 1);
        assert_eq!(time.hour, 11);
        assert_eq!(time.minute, 34);
        assert_eq!(time.second, 56);
    }

    #[test]
    fn supplementary_zero_times_is_an_error() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        let err = decode_block(&mut ctx, &hex!("0101081000"), &mut sink).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ZeroRepetition { category: 32, item: 500, .. }
        ));
    }
}
