//! ASTERIX category 048: monoradar target reports.
//!
//! Reference: EUROCONTROL SUR.ET1.ST05.2000-STD-04-01. Implemented
//! editions: 1.14, 1.15 (default) and 1.16; the edition is selected through
//! [`Cat048Edition`](super::context::Cat048Edition) and only changes the
//! decoding of the SI/II capability bit in I048/230.
//!
//! Two items need custom readers: I048/120 (radial Doppler speed, two
//! mutually exclusive subfields) and I048/130 (radar plot characteristics,
//! a compound of seven one-octet subfields).

use std::f64::consts::TAU;

use once_cell::sync::Lazy;
use tracing::debug;

use super::bits::{icao6_string, sign_extend, u16_be, u32_be};
use super::context::{Cat048Edition, DecoderContext};
use super::error::{DecodeError, ItemFlow, Result};
use super::item::{
    read_opaque, Descriptor, EmptyRep, ItemKind, Uap, REF_INDICATOR, SPF_INDICATOR,
};
use super::report::{
    BdsRegister, CalculatedDopplerSpeed, CartesianPosition, DataSourceIdentifier, DetectionType,
    GrayModeCCode, GroundVector, Height3D, MeasuredPosition, ModeCHeight, ModeSFlags, Plot,
    RawDopplerSpeed, Report, SelectedAltitude, SsrCode,
};
use super::time::tod_to_seconds;
use super::{run_records, EmptyRecord, FT_TO_METRES, NMI_TO_METRES};
use crate::sink::Sink;

const CAT: u8 = 48;
const MAX_FRN: usize = 28;
const MAX_FSPEC_LENGTH: usize = 4;

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

fn variable(item: u16, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Variable { decode } }
}

static UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i048_010))
        .set(2, fixed(140, 3, i048_140))
        .set(3, variable(20, i048_020))
        .set(4, fixed(40, 4, i048_040))
        .set(5, fixed(70, 2, i048_070))
        .set(6, fixed(90, 2, i048_090))
        .set(7, Descriptor {
            category: CAT,
            item: 130,
            kind: ItemKind::Compound { read: i048_130 },
        })
        .set(8, fixed(220, 3, i048_220))
        .set(9, fixed(240, 6, i048_240))
        .set(10, Descriptor {
            category: CAT,
            item: 250,
            kind: ItemKind::Repetitive { elem: 8, empty: EmptyRep::Skip, decode: i048_250 },
        })
        .set(11, fixed(161, 2, i048_161))
        .set(12, fixed(42, 4, i048_042))
        .set(13, fixed(200, 4, i048_200))
        .set(14, variable(170, i048_170))
        .set(15, fixed(210, 4, i048_210))
        .set(16, variable(30, i048_030))
        .set(17, fixed(80, 2, i048_080))
        .set(18, fixed(100, 4, i048_100))
        .set(19, fixed(110, 2, i048_110))
        .set(20, Descriptor {
            category: CAT,
            item: 120,
            kind: ItemKind::Compound { read: i048_120 },
        })
        .set(21, fixed(230, 2, i048_230))
        .set(22, fixed(260, 7, i048_260))
        .set(23, fixed(55, 1, i048_055))
        .set(24, fixed(50, 2, i048_050))
        .set(25, fixed(65, 1, i048_065))
        .set(26, fixed(60, 2, i048_060))
        .set(27, Descriptor {
            category: CAT,
            item: SPF_INDICATOR,
            kind: ItemKind::Opaque { read: i048_spf },
        })
        .set(28, Descriptor {
            category: CAT,
            item: REF_INDICATOR,
            kind: ItemKind::Opaque { read: i048_ref },
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
        EmptyRecord::Error,
        |_| &*UAP,
        |ctx| {
            ctx.plot = Plot::default();
            ctx.plot.header = ctx.header(CAT);
        },
        |ctx| Report::Plot(std::mem::take(&mut ctx.plot)),
        sink,
    )
}

/// I048/010, data source identifier.
fn i048_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.data_source = Some(DataSourceIdentifier::new(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/**
 * ## I048/020, target report descriptor
 *
 * First octet:
 *
 * | TYP    | SIM | RDP | SPI | RAB | FX |
 * |--------|-----|-----|-----|-----|----|
 * | 3 bits | 1   | 1   | 1   | 1   | 1  |
 *
 * TYP encodes the detection chain:
 *   - 0 = no detection
 *   - 1 = single PSR detection
 *   - 2 = single SSR detection
 *   - 3 = SSR + PSR detection
 *   - 4 = single Mode S all-call
 *   - 5 = single Mode S roll-call
 *   - 6 = Mode S all-call + PSR
 *   - 7 = Mode S roll-call + PSR
 *
 * The first extent carries the test target bit, military emergency and
 * identification, and the two IFF/mode 4 interrogation bits.
 */
fn i048_020(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mut dt = DetectionType::default();
    for (ix, &dfo) in data.iter().enumerate() {
        match ix {
            0 => {
                match (dfo >> 5) & 0x07 {
                    1 => dt.reported_from_psr = true,
                    2 => dt.reported_from_ssr = true,
                    3 => {
                        dt.reported_from_psr = true;
                        dt.reported_from_ssr = true;
                    }
                    4 => {
                        dt.reported_from_ssr = true;
                        dt.reported_from_mds = true;
                        dt.mode_s_all_call = true;
                    }
                    5 => {
                        dt.reported_from_ssr = true;
                        dt.reported_from_mds = true;
                        dt.mode_s_roll_call = true;
                    }
                    6 => {
                        dt.reported_from_psr = true;
                        dt.reported_from_ssr = true;
                        dt.reported_from_mds = true;
                        dt.mode_s_all_call = true;
                    }
                    7 => {
                        dt.reported_from_psr = true;
                        dt.reported_from_ssr = true;
                        dt.reported_from_mds = true;
                        dt.mode_s_roll_call = true;
                    }
                    _ => {}
                }
                dt.simulated = dfo & 0x10 != 0;
                if dfo & 0x08 != 0 {
                    ctx.plot.from_rdp_chain_2 = true;
                } else {
                    ctx.plot.from_rdp_chain_1 = true;
                }
                ctx.plot.special_position_indication = dfo & 0x04 != 0;
                dt.from_fixed_field_transponder = dfo & 0x02 != 0;
            }
            1 => {
                dt.test_target = dfo & 0x80 != 0;
                ctx.plot.military_emergency = dfo & 0x10 != 0;
                ctx.plot.military_ident = dfo & 0x08 != 0;
                let iff = (dfo >> 1) & 0x03;
                if iff != 0 {
                    ctx.plot.mode_4 = Some(iff);
                }
            }
            _ => {}
        }
    }
    ctx.plot.detection_type = Some(dt);
    Ok(ItemFlow::Done)
}

/// I048/030, warning/error conditions. Code 100 is the EADS MSSR 2000 I
/// raw-plot extension and does not join the list.
fn i048_030(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mut wecs = Vec::new();
    for &dfo in data {
        let wec = (dfo >> 1) & 0x7f;
        if wec == 100 {
            let dt = ctx.plot.detection_type.get_or_insert_with(DetectionType::default);
            dt.is_raw_plot = true;
        } else {
            wecs.push(wec);
        }
    }
    ctx.plot.wec_list = Some(wecs);
    Ok(ItemFlow::Done)
}

/// I048/040, measured position: slant range in 1/256 NM, azimuth in
/// 360/2^16 degrees.
fn i048_040(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rho = u16_be(data[0], data[1]);
    let theta = u16_be(data[2], data[3]);
    ctx.plot.measured_position = Some(MeasuredPosition {
        range: NMI_TO_METRES / 256.0 * rho as f64,
        azimuth: TAU / 65536.0 * theta as f64,
    });
    Ok(ItemFlow::Done)
}

/// I048/042, calculated position in Cartesian coordinates, 1/128 NM.
fn i048_042(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let x = u16_be(data[0], data[1]) as i16;
    let y = u16_be(data[2], data[3]) as i16;
    ctx.plot.computed_position = Some(CartesianPosition {
        x: NMI_TO_METRES / 128.0 * x as f64,
        y: NMI_TO_METRES / 128.0 * y as f64,
    });
    Ok(ItemFlow::Done)
}

/// I048/050, mode 2 code. A zero code flagged invalid is not stored.
fn i048_050(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
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

/// I048/055, mode 1 code, expanded to the usual data pulse order.
fn i048_055(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let m1c = data[0] & 0x1f;
    let expanded = expand_mode1(m1c);
    ctx.plot.mode_1 = Some(SsrCode {
        code: expanded,
        garbled: data[0] & 0x40 != 0,
        invalid: data[0] & 0x80 != 0,
        smoothed: data[0] & 0x20 != 0,
        ..Default::default()
    });
    Ok(ItemFlow::Done)
}

/// Spread the 5 transmitted mode 1 bits over the A/B pulse positions.
fn expand_mode1(m1c: u8) -> u16 {
    let high = ((m1c >> 2) & 0x07) as u16;
    let low = (m1c & 0x03) as u16;
    (high << 9) | (low << 6)
}

/// I048/060, mode 2 code confidence.
fn i048_060(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let confidence = u16_be(data[0] & 0x0f, data[1]);
    if let Some(mode_2) = &mut ctx.plot.mode_2 {
        mode_2.confidence = Some(confidence);
    }
    Ok(ItemFlow::Done)
}

/// I048/065, mode 1 code confidence.
fn i048_065(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let confidence = expand_mode1(data[0] & 0x1f);
    if let Some(mode_1) = &mut ctx.plot.mode_1 {
        mode_1.confidence = Some(confidence);
    }
    Ok(ItemFlow::Done)
}

/// I048/070, mode 3/A code.
fn i048_070(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.mode_3a = Some(SsrCode {
        code: u16_be(data[0] & 0x0f, data[1]),
        garbled: data[0] & 0x40 != 0,
        invalid: data[0] & 0x80 != 0,
        smoothed: data[0] & 0x20 != 0,
        ..Default::default()
    });
    Ok(ItemFlow::Done)
}

/// I048/080, mode 3/A code confidence.
fn i048_080(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let confidence = u16_be(data[0] & 0x0f, data[1]);
    if let Some(mode_3a) = &mut ctx.plot.mode_3a {
        mode_3a.confidence = Some(confidence);
    }
    Ok(ItemFlow::Done)
}

/**
 * ## I048/090, flight level in binary representation
 *
 * | V | G | Flight level          |
 * |---|---|-----------------------|
 * | 1 | 1 | 14 bits, LSB = 25 ft  |
 *
 * The height is a 14-bit two's complement count of 25 ft increments; a
 * value not divisible by four marks genuine 25 ft quantisation (later
 * refined by the ARC bit of I048/230 when that item is present).
 */
fn i048_090(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let raw = (((data[0] & 0x3f) as u32) << 8) | data[1] as u32;
    let mch = sign_extend(raw, 14);
    ctx.plot.mode_c_height = Some(ModeCHeight {
        value: 25.0 * FT_TO_METRES * mch as f64,
        value_in_feet: 25 * mch,
        garbled: data[0] & 0x40 != 0,
        invalid: data[0] & 0x80 != 0,
        in_25_feet: mch % 4 != 0,
    });
    Ok(ItemFlow::Done)
}

/// I048/100, mode C code and confidence in Gray notation.
fn i048_100(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.mode_c_code = Some(GrayModeCCode {
        code: u16_be(data[0] & 0x0f, data[1]),
        garbled: data[0] & 0x40 != 0,
        invalid: data[0] & 0x80 != 0,
        confidence: Some(u16_be(data[2] & 0x0f, data[3])),
    });
    Ok(ItemFlow::Done)
}

/// I048/110, height measured by a 3D radar: 14-bit two's complement in
/// 25 ft.
fn i048_110(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let raw = (((data[0] & 0x3f) as u32) << 8) | data[1] as u32;
    let hgt = sign_extend(raw, 14);
    ctx.plot.height_3d = Some(Height3D {
        value: 25.0 * FT_TO_METRES * hgt as f64,
        value_in_feet: 25 * hgt,
        valid: true,
    });
    Ok(ItemFlow::Done)
}

/**
 * ## I048/120, radial Doppler speed
 *
 * A primary octet announces one of two mutually exclusive subfields (both
 * set is a decode error):
 *
 * | Subfield | Contents                 | Length              |
 * |----------|--------------------------|---------------------|
 * | SF1      | Calculated Doppler speed | 2 octets            |
 * | SF2      | Raw Doppler speed        | REP (= 1) * 6 octets|
 *
 * SF1 carries a doubt bit and a 10-bit two's complement speed in m/s.
 * SF2 carries the raw speed (m/s), the ambiguity range (m/s) and the
 * transmitter frequency (MHz).
 */
fn i048_120(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let start = *pos;
    let df1 = *payload.get(*pos).ok_or(DecodeError::Truncated {
        category: CAT,
        item: 120,
        needed: 1,
        offset: *pos,
    })?;
    *pos += 1;

    let sf1 = df1 & 0x80 != 0;
    let sf2 = df1 & 0x40 != 0;
    if sf1 && sf2 {
        return Err(DecodeError::ExclusiveSubfields { offset: start });
    }

    if sf1 {
        let rest = payload.get(*pos..*pos + 2).ok_or(DecodeError::Truncated {
            category: CAT,
            item: 120,
            needed: 2,
            offset: *pos,
        })?;
        let cal = sign_extend((((rest[0] & 0x03) as u32) << 8) | rest[1] as u32, 10);
        ctx.plot.calculated_doppler_speed = Some(CalculatedDopplerSpeed {
            value: cal as i16,
            doubtful: rest[0] & 0x80 != 0,
        });
        *pos += 2;
    } else if sf2 {
        let rep = *payload.get(*pos).ok_or(DecodeError::Truncated {
            category: CAT,
            item: 120,
            needed: 1,
            offset: *pos,
        })?;
        *pos += 1;
        if rep != 1 {
            return Err(DecodeError::UnexpectedRepetition {
                category: CAT,
                item: 120,
                rep,
                offset: *pos - 1,
            });
        }
        let rest = payload.get(*pos..*pos + 6).ok_or(DecodeError::Truncated {
            category: CAT,
            item: 120,
            needed: 6,
            offset: *pos,
        })?;
        ctx.plot.raw_doppler_speed = Some(RawDopplerSpeed {
            value: u16_be(rest[0], rest[1]) as i16,
            ambiguity_range: u16_be(rest[2], rest[3]),
            transmitter_frequency: u16_be(rest[4], rest[5]),
        });
        *pos += 6;
    }

    Ok(ItemFlow::Done)
}

/**
 * ## I048/130, radar plot characteristics
 *
 * A primary octet announcing up to seven one-octet subfields, in this
 * order:
 *
 * | #  | Contents                         | Unit            |
 * |----|----------------------------------|-----------------|
 * | 1  | SSR plot runlength               | 360/2^13 deg    |
 * | 2  | Number of received (M)SSR replies| count           |
 * | 3  | Amplitude of (M)SSR reply        | dBm, signed     |
 * | 4  | PSR plot runlength               | 360/2^13 deg    |
 * | 5  | Amplitude of PSR plot            | dBm, signed     |
 * | 6  | PSR-SSR range difference         | 1/256 NM, signed|
 * | 7  | PSR-SSR azimuth difference       | 360/2^14 deg    |
 */
fn i048_130(ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let df1 = *payload.get(*pos).ok_or(DecodeError::Truncated {
        category: CAT,
        item: 130,
        needed: 1,
        offset: *pos,
    })?;
    *pos += 1;

    let count = (df1 & 0xfe).count_ones() as usize;
    if *pos + count > payload.len() {
        return Err(DecodeError::Truncated {
            category: CAT,
            item: 130,
            needed: *pos + count - payload.len(),
            offset: *pos,
        });
    }

    let signed = |b: u8| sign_extend(b as u32, 8) as i16;
    let mut next = || {
        let b = payload[*pos];
        *pos += 1;
        b
    };

    if df1 & 0x80 != 0 {
        ctx.plot.ssr_runlength = Some(360.0 / 8192.0 * next() as f64);
    }
    if df1 & 0x40 != 0 {
        ctx.plot.ssr_replies = Some(next());
    }
    if df1 & 0x20 != 0 {
        ctx.plot.ssr_amplitude = Some(signed(next()));
    }
    if df1 & 0x10 != 0 {
        ctx.plot.psr_runlength = Some(360.0 / 8192.0 * next() as f64);
    }
    if df1 & 0x08 != 0 {
        ctx.plot.psr_amplitude = Some(signed(next()));
    }
    if df1 & 0x04 != 0 {
        ctx.plot.range_difference = Some(NMI_TO_METRES / 256.0 * signed(next()) as f64);
    }
    if df1 & 0x02 != 0 {
        ctx.plot.azimuth_difference = Some(TAU / 16384.0 * signed(next()) as f64);
    }

    Ok(ItemFlow::Done)
}

/// I048/140, time of day in 1/128 s.
fn i048_140(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.plot.detection_time = Some(tod_to_seconds(tod));
    Ok(ItemFlow::Done)
}

/// I048/161, track number (12 bits).
fn i048_161(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let dt = ctx.plot.detection_type.get_or_insert_with(DetectionType::default);
    dt.is_radar_track = true;
    ctx.plot.track_number = Some(u16_be(data[0] & 0x0f, data[1]));
    Ok(ItemFlow::Done)
}

/// I048/170, track status. Only the track-end bit feeds the report; the
/// remaining bits are radar internal.
fn i048_170(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let dt = ctx.plot.detection_type.get_or_insert_with(DetectionType::default);
    dt.is_radar_track = true;
    if data.len() > 1 && data[1] & 0x80 != 0 {
        ctx.plot.to_be_cancelled = true;
    }
    Ok(ItemFlow::Done)
}

/// I048/200, calculated ground speed (2^-14 NM/s) and heading (360/2^16
/// degrees).
fn i048_200(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let dt = ctx.plot.detection_type.get_or_insert_with(DetectionType::default);
    dt.is_radar_track = true;
    let spd = u16_be(data[0], data[1]);
    let hdg = u16_be(data[2], data[3]);
    ctx.plot.ground_vector = Some(GroundVector {
        speed: NMI_TO_METRES / 16384.0 * spd as f64,
        heading: TAU / 65536.0 * hdg as f64,
    });
    Ok(ItemFlow::Done)
}

/// I048/210, track quality. Consumed for length accounting; the accuracy
/// estimates are radar internal.
fn i048_210(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let dt = ctx.plot.detection_type.get_or_insert_with(DetectionType::default);
    dt.is_radar_track = true;
    debug!("I048/210: 0x{}", hex::encode(data));
    Ok(ItemFlow::Done)
}

/// I048/220, 24-bit Mode S aircraft address.
fn i048_220(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.target_address = Some(u32_be(0, data[0], data[1], data[2]));
    Ok(ItemFlow::Done)
}

/// I048/230, communications/ACAS capability and flight status.
fn i048_230(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let cc = (data[0] >> 5) & 0x07;
    let fs = (data[0] >> 2) & 0x07;
    let mssc = data[1] & 0x80 != 0;
    let arc = data[1] & 0x40 != 0;
    let aic = data[1] & 0x20 != 0;
    let b1a = (data[1] >> 4) & 0x01;
    let b1b = data[1] & 0x0f;

    let (airborne, alert, on_ground, spi) = match fs {
        0 => (Some(true), Some(false), None, Some(false)),
        1 => (None, Some(false), Some(true), Some(false)),
        2 => (Some(true), Some(true), None, Some(false)),
        3 => (None, Some(true), Some(true), Some(false)),
        4 => (None, Some(true), None, Some(true)),
        5 => (None, Some(false), None, Some(true)),
        _ => (None, None, None, None),
    };
    ctx.plot.fs_airborne = airborne;
    ctx.plot.fs_alert = alert;
    ctx.plot.fs_on_ground = on_ground;
    ctx.plot.fs_spi = spi;

    // A Mode S capability report overrides the 25 ft quantisation deduced
    // from the height value itself.
    if let Some(mch) = &mut ctx.plot.mode_c_height {
        mch.in_25_feet = arc;
    }

    let si_capable = match ctx.config.cat048_edition {
        Cat048Edition::Ed1_16 => Some(data[0] & 0x01 == 0),
        _ => None,
    };
    ctx.plot.mode_s_flags = Some(ModeSFlags {
        communications_capability: cc,
        flight_status: fs,
        specific_service_capability: mssc,
        altitude_reporting_25ft: arc,
        aircraft_identification_capability: aic,
        bds10_bit16: b1a,
        bds10_bits37_40: b1b,
        si_capable,
    });
    Ok(ItemFlow::Done)
}

/// I048/240, aircraft identification in 6-bit characters.
fn i048_240(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let packed: [u8; 6] = data.try_into().expect("fixed length");
    ctx.plot.aircraft_identification = Some(icao6_string(&packed));
    Ok(ItemFlow::Done)
}

/**
 * ## I048/250, BDS register data
 *
 * Repetitive: REP blocks of eight octets each, seven octets of register
 * contents followed by the register address as two BDS nibbles (e.g. 0x40
 * for BDS 4,0). A repetition factor of zero discards the item but keeps
 * the record.
 *
 * BDS 4,0 (selected vertical intention) additionally yields the selected
 * altitude: MCP/FCU and FMS each carry a status bit and a 12-bit altitude
 * in 16 ft; when the target altitude source bits are valid and non-zero
 * they pick the authoritative source, otherwise MCP/FCU wins over FMS.
 */
fn i048_250(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rep = data[0] as usize;
    for block in data[1..1 + 8 * rep].chunks_exact(8) {
        let payload: [u8; 7] = block[..7].try_into().expect("chunk size");
        let bds = block[7];
        ctx.plot.bds_registers.push(BdsRegister { bds, data: payload });

        if bds == 0x40 {
            decode_bds40(ctx, payload);
        }
    }
    Ok(ItemFlow::Done)
}

/// Selected altitude from a BDS 4,0 (selected vertical intention) register.
///
/// The MCP/FCU and FMS selected altitudes each carry a status bit; the
/// target altitude source bits, when valid, arbitrate which one is
/// authoritative.
fn decode_bds40(ctx: &mut DecoderContext, b: [u8; 7]) {
    let mcp_status = b[0] & 0x80 != 0;
    let mcp = (((b[0] & 0x7f) as u16) << 5) | ((b[1] & 0xf8) >> 3) as u16;

    let fms_status = b[1] & 0x04 != 0;
    let fms = (((b[1] & 0x03) as u16) << 10) | ((b[2] as u16) << 2) | ((b[3] & 0xc0) >> 6) as u16;

    let tas_status = b[6] & 0x04 != 0;
    let tas = b[6] & 0x03;

    let selected = if tas_status && tas != 0 {
        match tas {
            1 => {
                if mcp_status {
                    Some((1, mcp))
                } else if fms_status {
                    Some((1, fms))
                } else {
                    None
                }
            }
            2 if mcp_status => Some((2, mcp)),
            3 if fms_status => Some((3, fms)),
            _ => None,
        }
    } else if mcp_status {
        Some((2, mcp))
    } else if fms_status {
        Some((3, fms))
    } else {
        None
    };

    if let Some((source, value)) = selected {
        let mut sa = SelectedAltitude {
            value_in_feet: 16 * value as i32,
            source,
            ..Default::default()
        };
        // MCP/FCU mode bits are only valid when their status bit is set.
        if b[5] & 0x01 == 0x01 {
            sa.vnav = b[6] & 0x80 != 0;
            sa.alt_hold = b[6] & 0x40 != 0;
            sa.approach = b[6] & 0x20 != 0;
        }
        ctx.plot.selected_altitude = Some(sa);
    }
}

/// I048/260, ACAS resolution advisory report (the 56-bit MB field).
fn i048_260(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.plot.acas_ra_report = Some(data.try_into().expect("fixed length"));
    Ok(ItemFlow::Done)
}

fn i048_ref(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I048/REF: 0x{}", hex::encode(raw));
    Ok(ItemFlow::Done)
}

fn i048_spf(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I048/SPF: 0x{}", hex::encode(raw));
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
    fn flight_level_positive() {
        // FSPEC 0x84: I048/010 + I048/090, value 0x0050 -> 80 * 25 ft.
        let reports = decode(&hex!("8401020050"));
        let mch = plot(&reports[0]).mode_c_height.unwrap();
        assert_eq!(mch.value_in_feet, 2000);
        assert!(!mch.garbled);
        assert!(!mch.invalid);
        assert_relative_eq!(mch.value, 2000.0 * FT_TO_METRES);
    }

    #[test]
    fn flight_level_negative_sign_extension() {
        // I048/090 = 0x2000: 14-bit sign bit set -> -8192 * 25 ft.
        let reports = decode(&hex!("8401022000"));
        let mch = plot(&reports[0]).mode_c_height.unwrap();
        assert_eq!(mch.value_in_feet, -204_800);
    }

    #[test]
    fn doppler_subfields_are_exclusive() {
        // FSPEC 0x01 0x01 0x10: FRN 20 (I048/120), primary 0xc0.
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        let err = decode_block(&mut ctx, &hex!("010104c0"), &mut sink).unwrap_err();
        assert!(matches!(err, DecodeError::ExclusiveSubfields { .. }));
        assert!(sink.reports.is_empty());
    }

    #[test]
    fn doppler_calculated_subfield() {
        // I048/120 SF1: primary 0x80, doubtful set, value -1 (0x03ff).
        let reports = decode(&hex!("0101048083ff"));
        let cal = plot(&reports[0]).calculated_doppler_speed.unwrap();
        assert_eq!(cal.value, -1);
        assert!(cal.doubtful);
    }

    #[test]
    fn doppler_raw_subfield() {
        // I048/120 SF2: rep 1, dop = -2 m/s, amb = 1000 m/s, frq = 1030 MHz.
        let reports = decode(&hex!("0101044001fffe03e80406"));
        let raw = plot(&reports[0]).raw_doppler_speed.unwrap();
        assert_eq!(raw.value, -2);
        assert_eq!(raw.ambiguity_range, 1000);
        assert_eq!(raw.transmitter_frequency, 1030);
    }

    #[test]
    fn plot_characteristics_cursor_accounting() {
        // FSPEC 0x86: I048/010, I048/090, I048/130 with SRL + PAM + APD
        // (primary 0x9a: SF1, SF4, SF5, SF7), then a second record.
        let payload = hex!("86010200509a201040808401020050");
        let reports = decode(&payload);
        assert_eq!(reports.len(), 2);
        let first = plot(&reports[0]);
        assert_relative_eq!(first.ssr_runlength.unwrap(), 360.0 / 8192.0 * 0x20 as f64);
        assert_relative_eq!(first.psr_runlength.unwrap(), 360.0 / 8192.0 * 0x10 as f64);
        assert_eq!(first.psr_amplitude, Some(0x40));
        assert_relative_eq!(
            first.azimuth_difference.unwrap(),
            TAU / 16384.0 * -128.0
        );
    }

    #[test]
    fn bds_registers_and_selected_altitude() {
        // FSPEC 0x81 0x20: I048/010 + I048/250. One register: BDS 4,0 with
        // MCP selected altitude 10000 ft (625 * 16 ft), no FMS, no TAS.
        // 625 = 0b001001110001 -> b0 = 0x93, b1 = 0x88.
        let reports = decode(&hex!("81200102019388000000000040"));
        let report = plot(&reports[0]);
        assert_eq!(report.bds_registers.len(), 1);
        assert_eq!(report.bds_registers[0].bds1(), 4);
        assert_eq!(report.bds_registers[0].bds2(), 0);
        let sa = report.selected_altitude.unwrap();
        assert_eq!(sa.value_in_feet, 10_000);
        assert_eq!(sa.source, 2);
    }

    #[test]
    fn bds_empty_repetition_is_skipped() {
        // I048/250 with REP 0: item discarded, record survives.
        let reports = decode(&hex!("8120010200"));
        let report = plot(&reports[0]);
        assert!(report.bds_registers.is_empty());
        assert_eq!(report.data_source.unwrap().value(), 0x0102);
    }

    #[test]
    fn aircraft_identification_characters() {
        // FSPEC 0x81 0x40: I048/010 + I048/240 "AFR1234 ".
        let reports = decode(&hex!("814001020464b1cb3d20"));
        assert_eq!(
            plot(&reports[0]).aircraft_identification.as_deref(),
            Some("AFR1234")
        );
    }

    #[test]
    fn capability_edition_switch() {
        // I048/230 with the SI bit set; edition 1.15 ignores it.
        let payload = hex!("010102e570");
        let reports = decode(&payload);
        let flags = plot(&reports[0]).mode_s_flags.unwrap();
        assert_eq!(flags.si_capable, None);
        assert_eq!(flags.communications_capability, 7);
        assert_eq!(flags.flight_status, 1);

        let mut ctx = DecoderContext::new(DecoderConfig {
            cat048_edition: Cat048Edition::Ed1_16,
            ..DecoderConfig::default()
        });
        let mut sink = VecSink::default();
        decode_block(&mut ctx, &payload, &mut sink).unwrap();
        let flags = plot(&sink.reports[0]).mode_s_flags.unwrap();
        assert_eq!(flags.si_capable, Some(false));
    }

    #[test]
    fn flight_status_tristate() {
        // fs = 1: on ground, no alert, no SPI, airborne undefined.
        let reports = decode(&hex!("010102e470"));
        let report = plot(&reports[0]);
        assert_eq!(report.fs_on_ground, Some(true));
        assert_eq!(report.fs_alert, Some(false));
        assert_eq!(report.fs_airborne, None);
        assert_eq!(report.fs_spi, Some(false));
    }

    #[test]
    fn wec_100_sets_raw_plot() {
        // FSPEC 0x81 0x01 0x80: I048/010 + I048/030, codes 100 and 3.
        let reports = decode(&hex!("8101400102c906"));
        let report = plot(&reports[0]);
        assert!(report.detection_type.unwrap().is_raw_plot);
        assert_eq!(report.wec_list.as_deref(), Some(&[3u8][..]));
    }
}
