//! # Statesync Serde
//! Byte cursor and wire value codec shared by the statesync engine and its
//! fixture encoder.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod error;
mod integer;
mod number;
mod serde;
mod string;

pub use byte_reader::ByteReader;
pub use byte_writer::{ByteWrite, ByteWriter};
pub use error::SerdeErr;
pub use number::{WireNumber, WireUint};
pub use serde::Serde;
