//! ASTERIX category 252: ARTAS server and service control messages.
//!
//! Reference: DED.3/SUR/ARTAS.ASTX.015, version 2.8.1.

use once_cell::sync::Lazy;

use super::bits::{u16_be, u32_be};
use super::context::DecoderContext;
use super::error::{ItemFlow, Result};
use super::item::{Descriptor, EmptyRep, ItemKind, Uap};
use super::report::{
    DataSourceIdentifier, Report, ServiceKind, ServiceMessage, ServiceReport,
};
use super::time::tod_to_seconds;
use super::{run_records, EmptyRecord};
use crate::sink::Sink;

const CAT: u8 = 252;
const MAX_FRN: usize = 7;
const MAX_FSPEC_LENGTH: usize = 1;

fn fixed(item: u16, len: usize, decode: super::item::ItemDecoder) -> Descriptor {
    Descriptor { category: CAT, item, kind: ItemKind::Fixed { len, decode } }
}

static UAP: Lazy<Uap> = Lazy::new(|| {
    Uap::new(CAT, MAX_FRN, MAX_FSPEC_LENGTH)
        .set(1, fixed(10, 2, i252_010))
        .set(2, fixed(15, 2, i252_015))
        .set(3, fixed(20, 3, i252_020))
        .set(4, fixed(35, 1, i252_035))
        .set(5, Descriptor {
            category: CAT,
            item: 110,
            kind: ItemKind::Variable { decode: i252_110 },
        })
        .set(6, Descriptor {
            category: CAT,
            item: 330,
            kind: ItemKind::Repetitive { elem: 2, empty: EmptyRep::Allow, decode: i252_330 },
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
            ctx.service = ServiceMessage::default();
            ctx.service.header = ctx.header(CAT);
            ctx.service.kind = ServiceKind::Server;
        },
        |ctx| Report::Service(std::mem::take(&mut ctx.service)),
        sink,
    )
}

/// I252/010, server identification tag.
fn i252_010(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.data_source = Some(DataSourceIdentifier::new(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I252/015, user number.
fn i252_015(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.user_number = Some(u16_be(data[0], data[1]));
    Ok(ItemFlow::Done)
}

/// I252/020, time of message in 1/128 s.
fn i252_020(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let tod = u32_be(0, data[0], data[1], data[2]);
    ctx.service.message_time = Some(tod_to_seconds(tod));
    ctx.service.time_of_day = Some(tod);
    Ok(ItemFlow::Done)
}

/// I252/035, type of message: family and nature nibbles.
fn i252_035(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    ctx.service.message_type = Some(((data[0] >> 4) & 0x0f, data[0] & 0x0f));
    Ok(ItemFlow::Done)
}

/// I252/110, service identification bits, packed into one octet the way
/// the track service announces them.
fn i252_110(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let mut si = 0u8;
    for (ix, &dfo) in data.iter().enumerate() {
        match ix {
            0 => si |= (dfo & 0x06) << 3,
            1 => si |= (dfo >> 4) & 0x0f,
            _ => {}
        }
    }
    ctx.service.service_identification = Some(si);
    Ok(ItemFlow::Done)
}

/// I252/330, service related reports: nature and report code pairs.
fn i252_330(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
    let rep = data[0] as usize;
    for pair in data[1..1 + 2 * rep].chunks_exact(2) {
        ctx.service.service_reports.push(ServiceReport {
            nature: (pair[0] >> 3) & 0x1f,
            code: u16_be(pair[0] & 0x07, pair[1]),
        });
    }
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
    fn server_status_message() {
        // FSPEC 0xf0: server id, user number, ToM, type (family 3 nature 1).
        let reports = decode(&hex!("f0c80100210092a031"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_eq!(msg.kind, ServiceKind::Server);
        assert_eq!(msg.data_source.unwrap().value(), 0xc801);
        assert_eq!(msg.user_number, Some(0x21));
        assert_eq!(msg.message_type, Some((3, 1)));
    }

    #[test]
    fn service_related_reports() {
        // FSPEC 0x84: server id + I252/330, two reports.
        let reports = decode(&hex!("84c80102400a4812"));
        let Report::Service(msg) = &reports[0] else { panic!() };
        assert_eq!(msg.service_reports.len(), 2);
        assert_eq!(msg.service_reports[0], ServiceReport { nature: 8, code: 0x0a });
        assert_eq!(msg.service_reports[1], ServiceReport { nature: 9, code: 0x12 });
    }
}
