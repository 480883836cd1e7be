//! Data item descriptors and the decoding kernel.
//!
//! Every category owns a User Application Profile: a table mapping field
//! reference numbers to item descriptors. A descriptor says how the item's
//! bytes are delimited on the wire (fixed, variable, repetitive, compound or
//! opaque) and which function turns them into report fields. The kernel here
//! is the only place that moves the cursor for the first three shapes;
//! compound and opaque items compute their own length and advance the cursor
//! themselves.

use super::context::DecoderContext;
use super::error::{DecodeError, ItemFlow, Result};

/// Reserved item identifiers for the non-numbered UAP slots.
pub const SPF_INDICATOR: u16 = 0xfff1;
pub const REF_INDICATOR: u16 = 0xfff2;
pub const RFS_INDICATOR: u16 = 0xfff3;

/// Decoder for an item whose bytes were delimited by the kernel.
pub type ItemDecoder = fn(&mut DecoderContext, &[u8]) -> Result<ItemFlow>;

/// Reader for an item that is authoritative for its own length. Receives the
/// whole record payload and the cursor, and must advance the cursor past
/// exactly the bytes it consumed.
pub type ItemReader = fn(&mut DecoderContext, &[u8], &mut usize) -> Result<ItemFlow>;

/// What to do with a repetitive item whose repetition factor is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyRep {
    /// Hard decode error (the default reading of the standard).
    Error,
    /// Consume the REP octet and discard the item.
    Skip,
    /// Legal: the item simply carries no elements.
    Allow,
}

/// Wire shape of a data item.
#[derive(Clone, Copy)]
pub enum ItemKind {
    Fixed { len: usize, decode: ItemDecoder },
    Variable { decode: ItemDecoder },
    Repetitive { elem: usize, empty: EmptyRep, decode: ItemDecoder },
    Compound { read: ItemReader },
    Opaque { read: ItemReader },
}

#[derive(Clone, Copy)]
pub struct Descriptor {
    pub category: u8,
    pub item: u16,
    pub kind: ItemKind,
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ItemKind::Fixed { len, .. } => format!("fixed({len})"),
            ItemKind::Variable { .. } => "variable".into(),
            ItemKind::Repetitive { elem, .. } => format!("repetitive({elem})"),
            ItemKind::Compound { .. } => "compound".into(),
            ItemKind::Opaque { .. } => "opaque".into(),
        };
        write!(f, "I{:03}/{} [{kind}]", self.category, self.item)
    }
}

/// A User Application Profile: FRN to descriptor, plus the category limits.
#[derive(Debug)]
pub struct Uap {
    category: u8,
    max_fspec: usize,
    slots: Vec<Option<Descriptor>>,
}

impl Uap {
    pub fn new(category: u8, max_frn: usize, max_fspec: usize) -> Self {
        Uap {
            category,
            max_fspec,
            slots: vec![None; max_frn + 1],
        }
    }

    pub fn set(mut self, frn: usize, desc: Descriptor) -> Self {
        self.slots[frn] = Some(desc);
        self
    }

    pub fn category(&self) -> u8 {
        self.category
    }

    /// Maximum number of FSPEC octets; also caps variable-length chains.
    pub fn max_fspec(&self) -> usize {
        self.max_fspec
    }

    pub fn max_frn(&self) -> usize {
        self.slots.len() - 1
    }

    /// Resolve an FRN, failing on out-of-range or unassigned slots.
    pub fn descriptor(&self, frn: usize) -> Result<&Descriptor> {
        if frn == 0 || frn >= self.slots.len() {
            return Err(DecodeError::FrnTooLarge {
                category: self.category,
                frn,
                max: self.max_frn(),
            });
        }
        self.slots[frn]
            .as_ref()
            .ok_or(DecodeError::UndefinedFrn { category: self.category, frn })
    }
}

/// Length of a variable item: the extension chain starting at `pos`,
/// terminator octet included.
fn variable_length(
    desc: &Descriptor,
    payload: &[u8],
    pos: usize,
    cap: usize,
) -> Result<usize> {
    let mut len = 0;
    loop {
        let b = *payload.get(pos + len).ok_or(DecodeError::Truncated {
            category: desc.category,
            item: desc.item,
            needed: 1,
            offset: pos + len,
        })?;
        len += 1;
        if len > cap {
            return Err(DecodeError::FspecTooLong { max: cap, offset: pos });
        }
        if b & 0x01 == 0 {
            return Ok(len);
        }
    }
}

/// Decode one data item at `payload[*pos]` according to its descriptor.
///
/// `cap` is the category's extension cap, applied to variable-length
/// chains. On success the cursor has advanced by exactly the number of
/// bytes the item occupied on the wire, whether the item was stored or
/// skipped.
pub fn decode_item(
    ctx: &mut DecoderContext,
    desc: &Descriptor,
    payload: &[u8],
    pos: &mut usize,
    cap: usize,
) -> Result<ItemFlow> {
    match desc.kind {
        ItemKind::Fixed { len, decode } => {
            ensure(desc, payload, *pos, len)?;
            let flow = decode(ctx, &payload[*pos..*pos + len])?;
            *pos += len;
            Ok(flow)
        }
        ItemKind::Variable { decode } => {
            let len = variable_length(desc, payload, *pos, cap)?;
            let flow = decode(ctx, &payload[*pos..*pos + len])?;
            *pos += len;
            Ok(flow)
        }
        ItemKind::Repetitive { elem, empty, decode } => {
            ensure(desc, payload, *pos, 1)?;
            let rep = payload[*pos] as usize;
            if rep == 0 {
                match empty {
                    EmptyRep::Error => {
                        return Err(DecodeError::ZeroRepetition {
                            category: desc.category,
                            item: desc.item,
                            offset: *pos,
                        })
                    }
                    EmptyRep::Skip => {
                        *pos += 1;
                        return Ok(ItemFlow::Skip);
                    }
                    EmptyRep::Allow => {}
                }
            }
            let len = 1 + rep * elem;
            ensure(desc, payload, *pos, len)?;
            let flow = decode(ctx, &payload[*pos..*pos + len])?;
            *pos += len;
            Ok(flow)
        }
        ItemKind::Compound { read } | ItemKind::Opaque { read } => read(ctx, payload, pos),
    }
}

fn ensure(desc: &Descriptor, payload: &[u8], pos: usize, needed: usize) -> Result<()> {
    if pos + needed > payload.len() {
        return Err(DecodeError::Truncated {
            category: desc.category,
            item: desc.item,
            needed: pos + needed - payload.len(),
            offset: pos,
        });
    }
    Ok(())
}

/// Bounds-checked read of an opaque length-prefixed field (SPF/REF). The
/// length octet counts itself; the raw contents are returned without being
/// interpreted.
pub fn read_opaque<'a>(
    category: u8,
    payload: &'a [u8],
    pos: &mut usize,
) -> Result<&'a [u8]> {
    let len = *payload.get(*pos).ok_or(DecodeError::BadOpaqueLength {
        category,
        offset: *pos,
    })? as usize;
    if len < 1 {
        return Err(DecodeError::BadOpaqueLength { category, offset: *pos });
    }
    if *pos + len > payload.len() {
        return Err(DecodeError::Truncated {
            category,
            item: SPF_INDICATOR,
            needed: *pos + len - payload.len(),
            offset: *pos,
        });
    }
    let raw = &payload[*pos + 1..*pos + len];
    *pos += len;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::context::DecoderConfig;

    fn store_len(ctx: &mut DecoderContext, data: &[u8]) -> Result<ItemFlow> {
        ctx.plot.track_number = Some(data.len() as u16);
        Ok(ItemFlow::Done)
    }

    fn fixed2() -> Descriptor {
        Descriptor {
            category: 1,
            item: 10,
            kind: ItemKind::Fixed { len: 2, decode: store_len },
        }
    }

    #[test]
    fn fixed_advances_exactly() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut pos = 0;
        let flow = decode_item(&mut ctx, &fixed2(), &[0xab, 0xcd, 0xef], &mut pos, 4).unwrap();
        assert_eq!(flow, ItemFlow::Done);
        assert_eq!(pos, 2);
        assert_eq!(ctx.plot.track_number, Some(2));
    }

    #[test]
    fn fixed_overrun_is_an_error() {
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut pos = 1;
        let err = decode_item(&mut ctx, &fixed2(), &[0xab, 0xcd], &mut pos, 4).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated { category: 1, item: 10, needed: 1, offset: 1 }
        );
    }

    #[test]
    fn variable_consumes_whole_chain() {
        let desc = Descriptor {
            category: 1,
            item: 20,
            kind: ItemKind::Variable { decode: store_len },
        };
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut pos = 0;
        decode_item(&mut ctx, &desc, &[0x81, 0x41, 0x40, 0xff], &mut pos, 4).unwrap();
        assert_eq!(pos, 3);
        assert_eq!(ctx.plot.track_number, Some(3));
    }

    #[test]
    fn variable_chain_over_cap() {
        let desc = Descriptor {
            category: 1,
            item: 20,
            kind: ItemKind::Variable { decode: store_len },
        };
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut pos = 0;
        let err =
            decode_item(&mut ctx, &desc, &[0x01, 0x01, 0x01, 0x00], &mut pos, 2)
                .unwrap_err();
        assert!(matches!(err, DecodeError::FspecTooLong { max: 2, .. }));
    }

    #[test]
    fn repetitive_zero_skip_consumes_rep_octet() {
        let desc = Descriptor {
            category: 48,
            item: 250,
            kind: ItemKind::Repetitive { elem: 8, empty: EmptyRep::Skip, decode: store_len },
        };
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut pos = 0;
        let flow = decode_item(&mut ctx, &desc, &[0x00, 0xff], &mut pos, 4).unwrap();
        assert_eq!(flow, ItemFlow::Skip);
        assert_eq!(pos, 1);
        assert_eq!(ctx.plot.track_number, None);
    }

    #[test]
    fn repetitive_zero_error() {
        let desc = Descriptor {
            category: 32,
            item: 500,
            kind: ItemKind::Repetitive { elem: 4, empty: EmptyRep::Error, decode: store_len },
        };
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut pos = 0;
        let err = decode_item(&mut ctx, &desc, &[0x00], &mut pos, 3).unwrap_err();
        assert!(matches!(err, DecodeError::ZeroRepetition { .. }));
    }

    #[test]
    fn repetitive_length_accounting() {
        let desc = Descriptor {
            category: 2,
            item: 70,
            kind: ItemKind::Repetitive { elem: 2, empty: EmptyRep::Allow, decode: store_len },
        };
        let mut ctx = DecoderContext::new(DecoderConfig::default());
        let mut pos = 0;
        decode_item(&mut ctx, &desc, &[0x02, 1, 2, 3, 4, 9], &mut pos, 2).unwrap();
        assert_eq!(pos, 5);
        assert_eq!(ctx.plot.track_number, Some(5));
    }

    #[test]
    fn opaque_length_includes_itself() {
        let mut pos = 0;
        let raw = read_opaque(48, &[0x03, 0xaa, 0xbb, 0xcc], &mut pos).unwrap();
        assert_eq!(raw, &[0xaa, 0xbb]);
        assert_eq!(pos, 3);
    }

    #[test]
    fn opaque_zero_length() {
        let mut pos = 0;
        let err = read_opaque(48, &[0x00, 0xaa], &mut pos).unwrap_err();
        assert!(matches!(err, DecodeError::BadOpaqueLength { .. }));
    }

    #[test]
    fn uap_lookup_errors() {
        let uap = Uap::new(2, 14, 2).set(1, fixed2());
        assert!(uap.descriptor(1).is_ok());
        assert!(matches!(
            uap.descriptor(2).unwrap_err(),
            DecodeError::UndefinedFrn { category: 2, frn: 2 }
        ));
        assert!(matches!(
            uap.descriptor(15).unwrap_err(),
            DecodeError::FrnTooLarge { category: 2, frn: 15, max: 14 }
        ));
    }
}
