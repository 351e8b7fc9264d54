//! Engine binary asset formats
//!
//! Three little-endian formats, each opened by a 32-bit magic number and
//! framed by counts rather than delimiters. There is no versioning beyond
//! the magic.
//!
//! All format headers implement the [`BinarySerializable`] trait for
//! consistent serialization/deserialization.

pub mod animation;
pub mod model;
pub mod scene;
mod serialization;

pub use animation::*;
pub use model::*;
pub use scene::*;
pub use serialization::BinarySerializable;
