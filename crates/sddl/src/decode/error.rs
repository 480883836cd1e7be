use thiserror::Error;

/// Errors raised while decoding a data block.
///
/// Every variant carries `offset`, the byte position inside the record
/// payload at which decoding could not continue. The record that raised the
/// error is discarded; the caller decides whether to resynchronise on the
/// next data block.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    #[error("fields specification longer than {max} bytes at offset {offset}")]
    FspecTooLong { max: usize, offset: usize },

    #[error("field reference number {frn} exceeds maximum {max} for category {category}")]
    FrnTooLarge { category: u8, frn: usize, max: usize },

    #[error("no data item defined for FRN {frn} of category {category}")]
    UndefinedFrn { category: u8, frn: usize },

    #[error("record with empty fields specification at offset {offset}")]
    EmptyRecord { offset: usize },

    #[error("payload ends inside the fields specification at offset {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("data item I{category:03}/{item} needs {needed} more bytes at offset {offset}")]
    Truncated {
        category: u8,
        item: u16,
        needed: usize,
        offset: usize,
    },

    #[error("zero repetition factor in I{category:03}/{item} at offset {offset}")]
    ZeroRepetition { category: u8, item: u16, offset: usize },

    #[error("unexpected repetition factor {rep} in I{category:03}/{item} at offset {offset}")]
    UnexpectedRepetition {
        category: u8,
        item: u16,
        rep: u8,
        offset: usize,
    },

    #[error("invalid length octet in opaque field of category {category} at offset {offset}")]
    BadOpaqueLength { category: u8, offset: usize },

    #[error("both Doppler subfields present in I048/120 at offset {offset}")]
    ExclusiveSubfields { offset: usize },

    #[error("reserved extension bit set in I{category:03}/{item} at offset {offset}")]
    BadCompoundEncoding { category: u8, item: u16, offset: usize },

    #[error("invalid field reference number {frn} in random field sequencing at offset {offset}")]
    BadRfsFrn { frn: u8, offset: usize },

    #[error("no decoder for ASTERIX category {category}")]
    UnknownCategory { category: u8 },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Outcome of a single item decoder.
///
/// `Skip` discards the item but keeps the record going; it is only legal for
/// the conditions the standards define as recoverable (zero repetition
/// factor where permitted, unknown opaque content). Hard failures use
/// `DecodeError` and abort the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFlow {
    Done,
    Skip,
}
