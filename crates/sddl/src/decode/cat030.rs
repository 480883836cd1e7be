//! ASTERIX category 030: ARTAS system track messages.
//!
//! Reference: DED.3/SUR/ARTAS.ASTX.015, version 2.8.1.
//!
//! The richest category of the ARTAS interface: positions, velocities and
//! their accuracies, altitude and flight level with sources, mode of flight
//! with probabilities, data ages, the last measured plot values and the
//! flight plan association.

use std::f64::consts::TAU;

use once_cell::sync::Lazy;
use tracing::debug;

use super::bits::{i16_be, icao6_string, sign_extend, u16_be, u32_be};
use super::context::DecoderContext;
use super::error::{DecodeError, ItemFlow, Result};
use super::item::{read_opaque, Descriptor, EmptyRep, ItemKind, Uap, SPF_INDICATOR};
use super::report::{
    ArtasTrackNumber, CartesianPosition, FlightLevel, GroundVector, MeasuredPosition,
    ModeOfFlight, Report, SsrCode, SystemTrackStatus, Track, TrackAltitude,
};
use super::time::tod_to_seconds;
use super::{run_records, EmptyRecord, FT_TO_METRES, NMI_TO_METRES};
use crate::sink::Sink;

const CAT: u8 = 30;
const MAX_FRN: usize = 56;
const MAX_FSPEC_LENGTH: usize = 8;

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

fn variable(item: u16, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Variable { decode } }
}

static UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i030_010))
        .set(2, fixed(15, 2, i030_015))
        .set(3, variable(30, i030_030))
        .set(4, fixed(35, 1, i030_035))
        .set(5, fixed(40, 2, i030_040))
        .set(6, fixed(70, 3, i030_070))
        .set(7, fixed(170, 4, i030_170))
        .set(8, fixed(100, 4, i030_100))
        .set(9, fixed(180, 4, i030_180))
        .set(10, fixed(181, 4, i030_181))
        .set(11, fixed(60, 2, i030_060))
        .set(12, fixed(150, 2, i030_150))
        .set(13, fixed(130, 2, i030_130))
        .set(14, fixed(160, 2, i030_160))
        .set(15, variable(80, i030_080))
        .set(16, fixed(90, 1, i030_090))
        .set(17, fixed(200, 1, i030_200))
        .set(18, fixed(220, 2, i030_220))
        .set(19, fixed(240, 1, i030_240))
        .set(20, fixed(290, 2, i030_290))
        .set(21, fixed(260, 2, i030_260))
        .set(22, fixed(360, 4, i030_360))
        .set(23, fixed(140, 2, i030_140))
        .set(24, fixed(340, 2, i030_340))
        .set(25, Descriptor {
            category: CAT,
            item: SPF_INDICATOR,
            kind: ItemKind::Opaque { read: i030_spf },
        })
        .set(26, fixed(390, 2, i030_390))
        .set(27, fixed(400, 7, i030_400))
        .set(28, fixed(410, 2, i030_410))
        .set(29, fixed(440, 4, i030_440))
        .set(30, fixed(450, 4, i030_450))
        .set(31, fixed(435, 1, i030_435))
        .set(32, fixed(430, 4, i030_430))
        .set(33, Descriptor {
            category: CAT,
            item: 460,
            kind: ItemKind::Repetitive { elem: 2, empty: EmptyRep::Allow, decode: i030_460 },
        })
        .set(34, fixed(480, 2, i030_480))
        .set(35, fixed(420, 1, i030_420))
        .set(36, fixed(490, 2, i030_490))
        .set(37, fixed(20, 3, i030_020))
        .set(38, fixed(382, 3, i030_382))
        .set(39, fixed(384, 6, i030_384))
        .set(40, fixed(386, 1, i030_386))
        .set(41, fixed(110, 4, i030_110))
        .set(42, fixed(190, 4, i030_190))
        .set(43, fixed(191, 4, i030_191))
        .set(44, fixed(135, 2, i030_135))
        .set(45, fixed(165, 2, i030_165))
        .set(46, fixed(230, 2, i030_230))
        .set(47, fixed(250, 1, i030_250))
        .set(48, fixed(210, 3, i030_210))
        .set(49, fixed(120, 2, i030_120))
        .set(50, Descriptor {
            category: CAT,
            item: 50,
            kind: ItemKind::Compound { read: i030_050 },
        })
        .set(51, fixed(270, 2, i030_270))
        .set(52, fixed(370, 2, i030_370))
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

/// I030/010, server identification tag.
fn i030_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.server_id = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I030/015, user number.
fn i030_015(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.user_number = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I030/020, time of message in 1/128 s.
fn i030_020(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.track.time_of_message = Some(tod_to_seconds(tod));
    Ok(ItemFlow::Done)
}

/// I030/030, service identification bits packed into one octet.
fn i030_030(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mut si = 0u8;
    for (ix, &dfo) in data.iter().enumerate() {
        match ix {
            0 => si |= (dfo & 0x06) << 3,
            1 => si |= (dfo >> 4) & 0x0f,
            _ => {}
        }
    }
    ctx.track.service_identification = Some(si);
    Ok(ItemFlow::Done)
}

/// I030/035, type of message: family and nature nibbles.
fn i030_035(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.message_type = Some(((data[0] >> 4) & 0x0f, data[0] & 0x0f));
    Ok(ItemFlow::Done)
}

/// I030/040, track number: 12 bits plus the numbering indicator.
fn i030_040(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.track_number = Some(u16_be(data[0] & 0x0f, data[1]));
    ctx.track.track_numbering_indicator = Some((data[0] >> 4) & 0x01);
    Ok(ItemFlow::Done)
}

/// I030/050, ARTAS track number chain: 3-octet unit/number groups linked by
/// the extension bit of the third octet.
fn i030_050(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
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

/// I030/060, track mode 3/A.
fn i030_060(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.mode_3a = Some(SsrCode {
        code: u16_be(data[0] & 0x0f, data[1]),
        invalid: data[0] & 0x80 != 0,
        garbled: data[0] & 0x40 != 0,
        changed: data[0] & 0x20 != 0,
        ..Default::default()
    });
    Ok(ItemFlow::Done)
}

/// I030/070, time of last update in 1/128 s.
fn i030_070(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.track.time_of_last_update = Some(tod_to_seconds(tod));
    Ok(ItemFlow::Done)
}

/// I030/080, ARTAS track status.
fn i030_080(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mut status = SystemTrackStatus::default();
    for (ix, &octet) in data.iter().enumerate() {
        let dfo = octet & !0x01;
        match ix {
            0 => {
                status.simulated = dfo & 0x80 != 0;
                status.tentative = dfo & 0x40 != 0;
                status.aircraft_derived_data = dfo & 0x20 != 0;
                status.coasted = dfo & 0x10 != 0;
                match (dfo >> 1) & 0x07 {
                    0 => {
                        status.multi_sensor = Some(true);
                        status.observed_by_psr = Some(true);
                        status.observed_by_ssr = Some(true);
                    }
                    1 => {
                        status.multi_sensor = Some(true);
                        status.observed_by_psr = Some(true);
                        status.observed_by_ssr = Some(false);
                    }
                    2 => {
                        status.multi_sensor = Some(true);
                        status.observed_by_psr = Some(false);
                        status.observed_by_ssr = Some(true);
                    }
                    4 => {
                        status.observed_by_psr = Some(true);
                        status.observed_by_ssr = Some(true);
                    }
                    5 => {
                        status.observed_by_psr = Some(true);
                        status.observed_by_ssr = Some(false);
                    }
                    6 => {
                        status.observed_by_psr = Some(false);
                        status.observed_by_ssr = Some(true);
                    }
                    _ => {}
                }
            }
            1 => {
                status.terminated = dfo & 0x80 != 0;
                status.created = dfo & 0x40 != 0;
                match (dfo >> 4) & 0x03 {
                    0 => status.most_reliable_height = Some(0),
                    1 | 2 => status.most_reliable_height = Some(1),
                    _ => {}
                }
            }
            2 => {
                status.formation_flight = dfo & 0x20 != 0;
                status.amalgamated = dfo & 0x10 != 0;
                status.special_position_indication = dfo & 0x08 != 0;
                status.military_emergency = dfo & 0x04 != 0;
                status.transponder_delay_correction = dfo & 0x02 != 0;
            }
            3 => {
                status.position_coding_precision = Some((dfo >> 7) & 0x01);
            }
            _ => {}
        }
    }
    ctx.track.track_status = Some(status);
    Ok(ItemFlow::Done)
}

/// I030/090, ARTAS track quality.
fn i030_090(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.track_quality = Some(data[0] & 0x07);
    Ok(ItemFlow::Done)
}

/// I030/100, calculated track position, Cartesian, 1/64 NM.
fn i030_100(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.calculated_position = Some(CartesianPosition {
        x: NMI_TO_METRES / 64.0 * i16_be(data[0], data[1]) as f64,
        y: NMI_TO_METRES / 64.0 * i16_be(data[2], data[3]) as f64,
    });
    Ok(ItemFlow::Done)
}

/// I030/110, estimated position accuracy, 1/64 NM.
fn i030_110(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.calculated_position_accuracy = Some(CartesianPosition {
        x: NMI_TO_METRES / 64.0 * i16_be(data[0], data[1]) as f64,
        y: NMI_TO_METRES / 64.0 * i16_be(data[2], data[3]) as f64,
    });
    Ok(ItemFlow::Done)
}

/// I030/120, track mode 2 code.
fn i030_120(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.mode_2 = Some(SsrCode {
        code: u16_be(data[0] & 0x0f, data[1]),
        invalid: data[0] & 0x80 != 0,
        garbled: data[0] & 0x40 != 0,
        changed: data[0] & 0x20 != 0,
        ..Default::default()
    });
    Ok(ItemFlow::Done)
}

/// 14-bit two's complement altitude in 25 ft, sign bit at 0x20.
fn altitude_25ft(data: &[u8]) -> i32 {
    sign_extend((((data[0] & 0x3f) as u32) << 8) | data[1] as u32, 14)
}

/// I030/130, calculated track altitude with its source.
fn i030_130(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let alt = altitude_25ft(data);
    ctx.track.calculated_altitude = Some(TrackAltitude {
        value: 25.0 * FT_TO_METRES * alt as f64,
        source: (data[0] >> 6) & 0x03,
    });
    Ok(ItemFlow::Done)
}

/// I030/135, estimated accuracy of track altitude, 25 ft.
fn i030_135(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let acc = u16_be(data[0], data[1]);
    ctx.track.calculated_altitude_accuracy = Some(25.0 * FT_TO_METRES * acc as f64);
    Ok(ItemFlow::Done)
}

/// I030/140, last measured mode C, 25 ft.
fn i030_140(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mch = altitude_25ft(data);
    ctx.track.measured.last_mode_c_feet = Some(25 * mch);
    ctx.track.measured.last_mode_c_garbled = data[0] & 0x40 != 0;
    ctx.track.measured.last_mode_c_invalid = data[0] & 0x80 != 0;
    Ok(ItemFlow::Done)
}

/// I030/150, measured track mode C, 25 ft.
fn i030_150(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mch = altitude_25ft(data);
    ctx.track.measured_mode_c_height = Some(FlightLevel {
        value: 25.0 * FT_TO_METRES * mch as f64,
        value_in_feet: 25 * mch,
    });
    Ok(ItemFlow::Done)
}

/// I030/160, calculated track flight level, 25 ft.
fn i030_160(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let cfl = altitude_25ft(data);
    ctx.track.calculated_flight_level = Some(FlightLevel {
        value: 25.0 * FT_TO_METRES * cfl as f64,
        value_in_feet: 25 * cfl,
    });
    Ok(ItemFlow::Done)
}

/// I030/165, estimated accuracy of the calculated flight level, 25 ft.
fn i030_165(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let acc = u16_be(data[0], data[1]);
    ctx.track.calculated_flight_level_accuracy = Some(25.0 * FT_TO_METRES * acc as f64);
    Ok(ItemFlow::Done)
}

/// I030/170, track ages: PSR, SSR, mode 3/A and mode C, 1/4 s each.
fn i030_170(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.psr_age = Some(0.25 * data[0] as f64);
    ctx.track.ssr_age = Some(0.25 * data[1] as f64);
    ctx.track.mode_3a_age = Some(0.25 * data[2] as f64);
    ctx.track.mode_c_age = Some(0.25 * data[3] as f64);
    Ok(ItemFlow::Done)
}

/// I030/180, calculated track velocity, polar: speed in 2^-14 NM/s,
/// heading in 360/2^16 degrees.
fn i030_180(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.ground_vector = Some(GroundVector {
        speed: NMI_TO_METRES / 16384.0 * u16_be(data[0], data[1]) as f64,
        heading: TAU / 65536.0 * u16_be(data[2], data[3]) as f64,
    });
    Ok(ItemFlow::Done)
}

/// I030/181, calculated track velocity, Cartesian, 2^-14 NM/s.
fn i030_181(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.cartesian_velocity = Some(CartesianPosition {
        x: NMI_TO_METRES / 16384.0 * i16_be(data[0], data[1]) as f64,
        y: NMI_TO_METRES / 16384.0 * i16_be(data[2], data[3]) as f64,
    });
    Ok(ItemFlow::Done)
}

/// I030/190, estimated accuracy of the polar velocity.
fn i030_190(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.ground_vector_accuracy = Some(GroundVector {
        speed: NMI_TO_METRES / 16384.0 * u16_be(data[0], data[1]) as f64,
        heading: TAU / 65536.0 * u16_be(data[2], data[3]) as f64,
    });
    Ok(ItemFlow::Done)
}

/// I030/191, estimated accuracy of the Cartesian velocity.
fn i030_191(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.cartesian_velocity_accuracy = Some(CartesianPosition {
        x: NMI_TO_METRES / 16384.0 * i16_be(data[0], data[1]) as f64,
        y: NMI_TO_METRES / 16384.0 * i16_be(data[2], data[3]) as f64,
    });
    Ok(ItemFlow::Done)
}

/// I030/200, mode of flight.
fn i030_200(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.mode_of_flight = Some(ModeOfFlight {
        transversal: (data[0] >> 6) & 0x03,
        longitudinal: (data[0] >> 4) & 0x03,
        vertical: (data[0] >> 2) & 0x03,
    });
    Ok(ItemFlow::Done)
}

/// I030/210, mode of flight probabilities, 0.5 % each.
fn i030_210(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.mode_of_flight_probabilities = Some((
        0.5 * data[0] as f64,
        0.5 * data[1] as f64,
        0.5 * data[2] as f64,
    ));
    Ok(ItemFlow::Done)
}

/// I030/220, calculated rate of climb/descent, 2^-10 FL/s.
fn i030_220(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rcd = i16_be(data[0], data[1]);
    ctx.track.rate_of_climb_descent = Some(100.0 * FT_TO_METRES / 1024.0 * rcd as f64);
    Ok(ItemFlow::Done)
}

/// I030/230, estimated accuracy of the rate of climb/descent.
fn i030_230(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let acc = u16_be(data[0], data[1]);
    ctx.track.rate_of_climb_descent_accuracy =
        Some(100.0 * FT_TO_METRES / 1024.0 * acc as f64);
    Ok(ItemFlow::Done)
}

/// I030/240, calculated rate of turn, 1/4 degree/s.
fn i030_240(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let crt = sign_extend(data[0] as u32, 8);
    ctx.track.rate_of_turn = Some(0.25 * crt as f64);
    Ok(ItemFlow::Done)
}

/// I030/250, estimated accuracy of the rate of turn, 1/4 degree/s.
fn i030_250(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.rate_of_turn_accuracy = Some(0.25 * data[0] as f64);
    Ok(ItemFlow::Done)
}

/// I030/260, radar identification tag of the last updating sensor.
fn i030_260(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.last_updating_sensor = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I030/270, local track number of the last updating sensor.
fn i030_270(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.local_track_number = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I030/290, plot ages: mode 3/A and mode C, 1/4 s.
fn i030_290(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.plot_mode_3a_age = Some(0.25 * data[0] as f64);
    ctx.track.plot_mode_c_age = Some(0.25 * data[1] as f64);
    Ok(ItemFlow::Done)
}

/// I030/340, last measured mode 3/A.
fn i030_340(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.measured.last_mode_3a = Some(SsrCode {
        code: u16_be(data[0] & 0x0f, data[1]),
        invalid: data[0] & 0x80 != 0,
        garbled: data[0] & 0x40 != 0,
        smoothed: data[0] & 0x20 != 0,
        ..Default::default()
    });
    Ok(ItemFlow::Done)
}

/// I030/360, measured position, polar: range in 1/128 NM, azimuth in
/// 360/2^16 degrees.
fn i030_360(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.measured.position = Some(MeasuredPosition {
        range: NMI_TO_METRES / 128.0 * u16_be(data[0], data[1]) as f64,
        azimuth: TAU / 65536.0 * u16_be(data[2], data[3]) as f64,
    });
    Ok(ItemFlow::Done)
}

/// I030/370, measured 3D height, 25 ft.
fn i030_370(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.measured.height_3d_feet = Some(25 * i16_be(data[0], data[1]) as i32);
    Ok(ItemFlow::Done)
}

/// I030/382, aircraft address.
fn i030_382(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.aircraft_address = Some(u32_be(0, data[0], data[1], data[2]));
    Ok(ItemFlow::Done)
}

/// I030/384, aircraft identification in 6-bit characters.
fn i030_384(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let packed: [u8; 6] = data.try_into().expect("fixed length");
    ctx.track.aircraft_identification = Some(icao6_string(&packed));
    Ok(ItemFlow::Done)
}

/// I030/386, communications capability and flight status.
fn i030_386(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.communications_capability = Some((data[0] >> 5) & 0x07);
    ctx.track.flight_status = Some((data[0] >> 2) & 0x07);
    Ok(ItemFlow::Done)
}

/// I030/390, FPPS identification tag.
fn i030_390(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.fpps_id = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I030/400, callsign, seven ASCII characters.
fn i030_400(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let cs: String = data.iter().map(|&c| c as char).collect();
    ctx.track.callsign = Some(cs.trim_end().to_string());
    Ok(ItemFlow::Done)
}

/// I030/410, PLN number.
fn i030_410(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.flight_plan_number = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I030/420, flight category.
fn i030_420(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.flight_category = Some(data[0]);
    Ok(ItemFlow::Done)
}

/// I030/430, type of aircraft (ICAO designator).
fn i030_430(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let toa: String = data.iter().map(|&c| c as char).collect();
    ctx.track.type_of_aircraft = Some(toa.trim_end().to_string());
    Ok(ItemFlow::Done)
}

/// I030/435, category of turbulence.
fn i030_435(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.wake_turbulence_category = Some(data[0] as char);
    Ok(ItemFlow::Done)
}

/// I030/440, departure airport.
fn i030_440(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let adep: String = data.iter().map(|&c| c as char).collect();
    ctx.track.departure_airport = Some(adep.trim_end().to_string());
    Ok(ItemFlow::Done)
}

/// I030/450, destination airport.
fn i030_450(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let ades: String = data.iter().map(|&c| c as char).collect();
    ctx.track.destination_airport = Some(ades.trim_end().to_string());
    Ok(ItemFlow::Done)
}

/// I030/460, allocated SSR codes.
fn i030_460(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rep = data[0] as usize;
    let codes = data[1..1 + 2 * rep]
        .chunks_exact(2)
        .map(|pair| u16_be(pair[0] & 0x0f, pair[1]))
        .collect();
    ctx.track.allocated_ssr_codes = Some(codes);
    Ok(ItemFlow::Done)
}

/// I030/480, current cleared flight level, 25 ft.
fn i030_480(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.cleared_flight_level_feet = Some(25 * i16_be(data[0], data[1]) as i32);
    Ok(ItemFlow::Done)
}

/// I030/490, current control position (centre, position).
fn i030_490(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.track.control_position = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

fn i030_spf(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I030/SPF: 0x{}", hex::encode(raw));
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

    fn track(report: &Report) -> &Track {
        match report {
            Report::Track(t) => t,
            _ => panic!("expected a track"),
        }
    }

    #[test]
    fn kinematics() {
        // FSPEC 0xd9 0xc1 0x20: server id, user number, type of message,
        // track number, position, polar velocity, mode of flight.
        let payload = hex!("d9c120c8010021121234004000400cd0200094");
        let reports = decode(&payload);
        let t = track(&reports[0]);
        assert_eq!(t.server_id, Some(0xc801));
        assert_eq!(t.user_number, Some(0x21));
        assert_eq!(t.message_type, Some((1, 2)));
        assert_eq!(t.track_number, Some(0x234));
        assert_eq!(t.track_numbering_indicator, Some(1));

        let pos = t.calculated_position.unwrap();
        assert_relative_eq!(pos.x, NMI_TO_METRES);
        assert_relative_eq!(pos.y, NMI_TO_METRES);
        let gv = t.ground_vector.unwrap();
        assert_relative_eq!(gv.heading, TAU / 8.0);

        let mof = t.mode_of_flight.unwrap();
        assert_eq!(mof.transversal, 2);
        assert_eq!(mof.longitudinal, 1);
        assert_eq!(mof.vertical, 1);
    }

    #[test]
    fn track_status_extents() {
        // FSPEC 0x81 0x01 0x80: server id + FRN 15 (track status) with
        // two extents: SIM + TNT + PR-only type, then TRM.
        let payload = hex!("810180c801c380");
        let reports = decode(&payload);
        let status = track(&reports[0]).track_status.unwrap();
        assert!(status.simulated);
        assert!(status.tentative);
        assert!(status.terminated);
        assert_eq!(status.multi_sensor, Some(true));
        assert_eq!(status.observed_by_psr, Some(true));
        assert_eq!(status.observed_by_ssr, Some(false));
    }

    #[test]
    fn artas_track_number_chain() {
        // FRN 50 sits in the eighth FSPEC octet: seven extension octets
        // then 0x80. Two chained unit/number groups.
        let payload = hex!("0101010101010180112233112230");
        let reports = decode(&payload);
        let numbers = &track(&reports[0]).artas_track_numbers;
        assert_eq!(numbers.len(), 2);
        assert!(numbers[0].master);
        assert_eq!(numbers[0].unit, (0x11 << 3) | 0x01);
        assert!(!numbers[1].master);
        assert_eq!(numbers[1].number, ((0x22 & 0x1f) as u16) << 7 | ((0x30 >> 1) & 0x7f) as u16);
    }

    #[test]
    fn flight_plan_fields() {
        // FSPEC chain down to FRN 27 (callsign), 29 (departure) and 30
        // (destination): octets 4 and 5 of the FSPEC.
        let payload = hex!("01010105c04d4143333431204c4f57574c4f5744");
        let reports = decode(&payload);
        let t = track(&reports[0]);
        assert_eq!(t.callsign.as_deref(), Some("MAC341"));
        assert_eq!(t.departure_airport.as_deref(), Some("LOWW"));
        assert_eq!(t.destination_airport.as_deref(), Some("LOWD"));
    }

#[test]
    fn altitude_and_flight_level() {
        // FRN 13 (calculated altitude, assumed height source) and FRN 14
        // (calculated flight level).
        let payload = hex!("0106cce00190");
        let reports = decode(&payload);
        let t = track(&reports[0]);
        let alt = t.calculated_altitude.unwrap();
        assert_eq!(alt.source, 3);
        // Low 14 bits 0x0ce0 with the sign clear: 3296 * 25 ft.
        assert_relative_eq!(alt.value, 25.0 * FT_TO_METRES * 3296.0);
        let fl = t.calculated_flight_level.unwrap();
        assert_eq!(fl.value_in_feet, 25 * 0x0190);
    }

    #[test]
    fn ages_and_measured_information() {
        // FRN 7 (track ages), FRN 22 (measured position), FRN 23 (last
        // measured mode C).
        let payload = hex!("030101c004081020800040000e64");
        let reports = decode(&payload);
        let t = track(&reports[0]);
        assert_relative_eq!(t.psr_age.unwrap(), 1.0);
        assert_relative_eq!(t.ssr_age.unwrap(), 2.0);
        assert_relative_eq!(t.mode_3a_age.unwrap(), 4.0);
        assert_relative_eq!(t.mode_c_age.unwrap(), 8.0);

        let pos = t.measured.position.unwrap();
        assert_relative_eq!(pos.range, NMI_TO_METRES / 128.0 * 0x8000 as f64);
        assert_relative_eq!(pos.azimuth, TAU / 4.0);
        assert_eq!(t.measured.last_mode_c_feet, Some(25 * 0x0e64));
    }

    #[test]
    fn rates() {
        // FRN 18 (rate of climb/descent) and FRN 19 (rate of turn).
        let payload = hex!("010118fc18e0");
        let reports = decode(&payload);
        let t = track(&reports[0]);
        assert_relative_eq!(
            t.rate_of_climb_descent.unwrap(),
            100.0 * FT_TO_METRES / 1024.0 * -1000.0
        );
        assert_relative_eq!(t.rate_of_turn.unwrap(), 0.25 * -32.0);
    }
}
