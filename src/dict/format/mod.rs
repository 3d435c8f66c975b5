//! Wire-format layer: primitives and per-record codecs.
//!
//! - [`primitives`]: big-endian fixed-width fields and length-prefixed
//!   UTF-8 strings
//! - [`codecs`]: [`ElementCodec`](crate::dict::raf::ElementCodec) impls for
//!   each list section of the container

pub mod codecs;
pub mod primitives;
