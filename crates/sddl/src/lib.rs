#![doc = include_str!("../readme.md")]
pub mod decode;
pub mod sink;

pub mod prelude {
    pub use crate::decode::context::{
        Cat048Edition, DecoderConfig, DecoderContext, TrackNumberBits,
    };
    pub use crate::decode::error::{DecodeError, ItemFlow};
    pub use crate::decode::report::{
        Plot, Report, SafetyNetAlert, SensorStatus, ServiceMessage, Track,
    };
    /// The entry point for one data block handed over by the framer.
    pub use crate::decode::decode_data_block;
    pub use crate::sink::{JsonLinesSink, Sink, VecSink};
}
