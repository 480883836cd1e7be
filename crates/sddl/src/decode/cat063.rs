//! ASTERIX category 063: sensor status messages.
//!
//! Reference: EUROCONTROL SUR.ET1.ST05.2000-STD-10-01, version 1.0.

use std::f64::consts::TAU;

use once_cell::sync::Lazy;
use tracing::debug;

use super::bits::{i16_be, u32_be};
use super::context::DecoderContext;
use super::error::{ItemFlow, Result};
use super::item::{read_opaque, Descriptor, ItemKind, Uap, REF_INDICATOR, SPF_INDICATOR};
use super::report::{DataSourceIdentifier, Report, SensorStatus};
use super::time::tod_to_seconds;
use super::{run_records, EmptyRecord, NMI_TO_METRES};
use crate::sink::Sink;

const CAT: u8 = 63;
const MAX_FRN: usize = 14;
const MAX_FSPEC_LENGTH: usize = 2;

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

static UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i063_010))
        .set(2, fixed(15, 1, i063_015))
        .set(3, fixed(30, 3, i063_030))
        .set(4, fixed(50, 2, i063_050))
        .set(5, Descriptor {
            category: CAT,
            item: 60,
            kind: ItemKind::Variable { decode: i063_060 },
        })
        .set(6, fixed(70, 2, i063_070))
        .set(7, fixed(80, 4, i063_080))
        .set(8, fixed(81, 2, i063_081))
        .set(9, fixed(90, 4, i063_090))
        .set(10, fixed(91, 2, i063_091))
        .set(11, fixed(92, 2, i063_092))
        .set(13, Descriptor {
            category: CAT,
            item: REF_INDICATOR,
            kind: ItemKind::Opaque { read: i063_ref },
        })
        .set(14, Descriptor {
            category: CAT,
            item: SPF_INDICATOR,
            kind: ItemKind::Opaque { read: i063_spf },
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
            ctx.sensor = SensorStatus::default();
            ctx.sensor.header = ctx.header(CAT);
        },
        |ctx| Report::SensorStatus(std::mem::take(&mut ctx.sensor)),
        sink,
    )
}

/// I063/010, data source identifier of the reporting SDPS.
fn i063_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.data_source = Some(DataSourceIdentifier::new(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I063/015, service identification.
fn i063_015(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.service_identification = Some(data[0]);
    Ok(ItemFlow::Done)
}

/// I063/030, time of message in 1/128 s.
fn i063_030(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.sensor.reporting_time = Some(tod_to_seconds(tod));
    Ok(ItemFlow::Done)
}

/// I063/050, identifier of the sensor this status concerns.
fn i063_050(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.sensor_id = Some(((data[0] as u16) << 8) | data[1] as u16);
    Ok(ItemFlow::Done)
}

/// I063/060, sensor configuration and status; only the connection status of
/// the first octet is reported.
fn i063_060(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.connection_status = Some((data[0] >> 6) & 0x03);
    Ok(ItemFlow::Done)
}

/// I063/070, plot time stamping bias in milliseconds.
fn i063_070(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.time_stamping_bias = Some(0.001 * i16_be(data[0], data[1]) as f64);
    Ok(ItemFlow::Done)
}

/// I063/080, SSR/Mode S range gain (1e-5) and range bias (1/128 NM).
fn i063_080(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.ssr_range_gain = Some(1e-5 * i16_be(data[0], data[1]) as f64);
    ctx.sensor.ssr_range_bias = Some(NMI_TO_METRES / 128.0 * i16_be(data[2], data[3]) as f64);
    Ok(ItemFlow::Done)
}

/// I063/081, SSR/Mode S azimuth bias in 360/2^16 degrees.
fn i063_081(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.ssr_azimuth_bias = Some(TAU / 65536.0 * i16_be(data[0], data[1]) as f64);
    Ok(ItemFlow::Done)
}

/// I063/090, PSR range gain (1e-5) and range bias (1/128 NM).
fn i063_090(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.psr_range_gain = Some(1e-5 * i16_be(data[0], data[1]) as f64);
    ctx.sensor.psr_range_bias = Some(NMI_TO_METRES / 128.0 * i16_be(data[2], data[3]) as f64);
    Ok(ItemFlow::Done)
}

/// I063/091, PSR azimuth bias in 360/2^16 degrees.
fn i063_091(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.sensor.psr_azimuth_bias = Some(TAU / 65536.0 * i16_be(data[0], data[1]) as f64);
    Ok(ItemFlow::Done)
}

/// I063/092, PSR elevation bias. Consumed for length accounting only.
fn i063_092(_ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    debug!(
        "I063/092: elevation bias {:.3} deg",
        360.0 / 65536.0 * i16_be(data[0], data[1]) as f64
    );
    Ok(ItemFlow::Done)
}

fn i063_ref(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I063/REF: 0x{}", hex::encode(raw));
    Ok(ItemFlow::Done)
}

fn i063_spf(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I063/SPF: 0x{}", hex::encode(raw));
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

    fn status(report: &Report) -> &SensorStatus {
        match report {
            Report::SensorStatus(s) => s,
            _ => panic!("expected a sensor status"),
        }
    }

    #[test]
    fn connection_and_biases() {
        // FSPEC 0xbf 0x80: DSI, ToM, sensor id, status, stamping bias,
        // SSR gain/bias, SSR azimuth bias.
        let payload = hex!("bf8000a00003801442c0ff38000affce0100");
        let reports = decode(&payload);
        let s = status(&reports[0]);
        assert_eq!(s.sensor_id, Some(0x1442));
        assert_eq!(s.connection_status, Some(3));
        // -200 ms on the wire.
        assert_relative_eq!(s.time_stamping_bias.unwrap(), -0.2);
        assert_relative_eq!(s.ssr_range_gain.unwrap(), 1e-5 * 10.0);
        assert_relative_eq!(s.ssr_range_bias.unwrap(), NMI_TO_METRES / 128.0 * -50.0);
        assert_relative_eq!(s.ssr_azimuth_bias.unwrap(), TAU / 65536.0 * 256.0);
    }

    #[test]
    fn psr_gain_and_bias() {
        // FSPEC 0x81 0x40: DSI + I063/090.
        let reports = decode(&hex!("814000a0fff60032"));
        let s = status(&reports[0]);
        assert_relative_eq!(s.psr_range_gain.unwrap(), 1e-5 * -10.0);
        assert_relative_eq!(s.psr_range_bias.unwrap(), NMI_TO_METRES / 128.0 * 50.0);
    }
}
