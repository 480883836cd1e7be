//! ASTERIX category 000: MADAP track server supervisory messages.
//!
//! Reference: MAS-S/GD_0026_03 (User Interface Definition of the MADAP
//! Track Server), April 1998.

use once_cell::sync::Lazy;
use tracing::debug;

use super::bits::u32_be;
use super::context::DecoderContext;
use super::error::{ItemFlow, Result};
use super::item::{read_opaque, Descriptor, EmptyRep, ItemKind, Uap, SPF_INDICATOR};
use super::report::{
    DataSourceIdentifier, RadarConfiguration, Report, ServiceKind, ServiceMessage,
};
use super::time::tod_to_seconds;
use super::{run_records, EmptyRecord};
use crate::sink::Sink;

const CAT: u8 = 0;
const MAX_FRN: usize = 14;
const MAX_FSPEC_LENGTH: usize = 2;

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

static UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i000_010))
        .set(2, fixed(20, 3, i000_020))
        .set(3, fixed(30, 1, i000_030))
        .set(4, Descriptor {
            category: CAT,
            item: 40,
            kind: ItemKind::Repetitive { elem: 3, empty: EmptyRep::Skip, decode: i000_040 },
        })
        .set(5, fixed(50, 1, i000_050))
        .set(14, Descriptor {
            category: CAT,
            item: SPF_INDICATOR,
            kind: ItemKind::Opaque { read: i000_spf },
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
            ctx.service = ServiceMessage::default();
            ctx.service.header = ctx.header(CAT);
            ctx.service.kind = ServiceKind::Supervisory;
        },
        |ctx| Report::Service(std::mem::take(&mut ctx.service)),
        sink,
    )
}

/// I000/010, data source identifier.
fn i000_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.data_source = Some(DataSourceIdentifier::new(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I000/020, time of day in 1/128 s. Refreshes the truncated-ToD reference.
fn i000_020(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.remember_tod(tod);
    ctx.service.message_time = Some(tod_to_seconds(tod));
    ctx.service.time_of_day = Some(tod);
    Ok(ItemFlow::Done)
}

/// I000/030, step reference number.
fn i000_030(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.step_number = Some(data[0]);
    Ok(ItemFlow::Done)
}

/// I000/040, radar configuration and status triplets.
fn i000_040(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rep = data[0] as usize;
    let mut radars = Vec::with_capacity(rep);
    for triplet in data[1..1 + 3 * rep].chunks_exact(3) {
        radars.push(RadarConfiguration {
            sac: triplet[0],
            sic: triplet[1],
            status: triplet[2],
        });
    }
    ctx.service.radar_configuration = Some(radars);
    Ok(ItemFlow::Done)
}

/// I000/050, processing status.
fn i000_050(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.processing_status = Some(data[0]);
    Ok(ItemFlow::Done)
}

fn i000_spf(_ctx: &mut DecoderContext, payload: &[u8], pos: &mut usize) -> Result<ItemFlow> {
    let raw = read_opaque(CAT, payload, pos)?;
    debug!("I000/SPF: 0x{}", hex::encode(raw));
    Ok(ItemFlow::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::context::DecoderConfig;
    use crate::sink::VecSink;
    use hexlit::hex;

    fn decode(payload: &[u8]) -> Vec<Report> {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut sink = VecSink::default();
        decode_block(&mut ctx, payload, &mut sink).unwrap();
        sink.reports
    }

    #[test]
    fn supervisory_message() {
        // FSPEC 0xf8: DSI, ToD, step, radar configuration (2), status.
        let reports = decode(&hex!("f800a000030007020102aa0304bb01"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_eq!(msg.kind, ServiceKind::Supervisory);
        assert_eq!(msg.data_source.unwrap().value(), 0x00a0);
        assert_eq!(msg.step_number, Some(7));
        assert_eq!(msg.processing_status, Some(1));
        let radars = msg.radar_configuration.as_ref().unwrap();
        assert_eq!(radars.len(), 2);
        assert_eq!(radars[1], RadarConfiguration { sac: 3, sic: 4, status: 0xbb });
    }

    #[test]
    fn no_radars_skips_the_item() {
        // FSPEC 0x90: DSI + I000/040 with REP 0.
        let reports = decode(&hex!("9000a000"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_eq!(msg.radar_configuration, None);
        assert!(msg.data_source.is_some());
    }
}
