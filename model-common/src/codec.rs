//! Primitive binary codec
//!
//! Every exported file is a flat little-endian stream built from a handful of
//! primitives:
//! - unsigned/signed integers of 1, 2 and 4 bytes
//! - IEEE-754 `f32`
//! - 4x4 matrices as 16 floats in column-major order
//! - length-prefixed strings padded to a 4-byte boundary
//!
//! # String layout
//! ```text
//! [len u8][len bytes of UTF-8][0..3 zero bytes so that 1 + len + pad ≡ 0 (mod 4)]
//! ```
//!
//! [`WriteBinary`] is implemented for every [`std::io::Write`], and
//! [`ByteReader`] decodes the same primitives from a byte slice.

use glam::{Mat4, Vec3};
use std::io::{self, Write};
use thiserror::Error;

/// Longest string the one-byte length prefix can describe
pub const MAX_STRING_LEN: usize = u8::MAX as usize;

/// Width of the fixed name field used for scene objects
pub const FIXED_NAME_LEN: usize = 16;

/// Errors produced while encoding or decoding primitives
#[derive(Debug, Error)]
pub enum CodecError {
    /// String does not fit the one-byte length prefix.
    #[error("string of {len} bytes exceeds the {MAX_STRING_LEN}-byte limit: {preview:?}")]
    StringTooLong {
        /// Encoded length in bytes.
        len: usize,
        /// Leading characters of the offending string.
        preview: String,
    },

    /// Input ended before a primitive could be read.
    #[error("unexpected end of data at offset {offset}: wanted {wanted} bytes")]
    UnexpectedEof {
        /// Read position when the data ran out.
        offset: usize,
        /// Number of bytes requested.
        wanted: usize,
    },

    /// String bytes were not valid UTF-8.
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the string payload.
        offset: usize,
    },

    /// I/O error from the underlying writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Number of zero bytes that follow a string payload of `len` bytes
#[inline]
pub const fn string_padding(len: usize) -> usize {
    (4 - (len + 1) % 4) % 4
}

/// Total encoded size of a string payload of `len` bytes (prefix + data + padding)
#[inline]
pub const fn encoded_string_len(len: usize) -> usize {
    1 + len + string_padding(len)
}

/// Little-endian primitive writers for any [`Write`] sink
pub trait WriteBinary: Write {
    fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_all(&[value])
    }

    fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    fn write_f32(&mut self, value: f32) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    fn write_vec3(&mut self, v: Vec3) -> io::Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)?;
        self.write_f32(v.z)
    }

    /// Write a 4x4 matrix as 16 floats, column by column
    fn write_matrix(&mut self, m: &Mat4) -> io::Result<()> {
        for f in m.to_cols_array() {
            self.write_f32(f)?;
        }
        Ok(())
    }

    /// Write a length-prefixed UTF-8 string and align to 4 bytes
    ///
    /// Fails with [`CodecError::StringTooLong`] when the encoded string is
    /// longer than [`MAX_STRING_LEN`]; nothing is written in that case.
    fn write_string(&mut self, s: &str) -> CodecResult<()> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_STRING_LEN {
            return Err(CodecError::StringTooLong {
                len: bytes.len(),
                preview: s.chars().take(32).collect(),
            });
        }

        self.write_u8(bytes.len() as u8)?;
        self.write_all(bytes)?;
        self.write_all(&[0u8; 3][..string_padding(bytes.len())])?;
        Ok(())
    }

    /// Write `s` into a fixed-width field, truncating or zero-padding to `len` bytes
    fn write_fixed_name(&mut self, s: &str, len: usize) -> io::Result<()> {
        let bytes = s.as_bytes();
        let used = bytes.len().min(len);
        self.write_all(&bytes[..used])?;
        for _ in used..len {
            self.write_u8(0)?;
        }
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteBinary for W {}

/// Cursor over an exported byte stream
///
/// Mirrors [`WriteBinary`] so files can be checked after export.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                wanted: len,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> CodecResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> CodecResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_vec3(&mut self) -> CodecResult<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    pub fn read_matrix(&mut self) -> CodecResult<Mat4> {
        let mut cols = [0.0f32; 16];
        for f in cols.iter_mut() {
            *f = self.read_f32()?;
        }
        Ok(Mat4::from_cols_array(&cols))
    }

    /// Read a length-prefixed string and skip its alignment padding
    pub fn read_string(&mut self) -> CodecResult<String> {
        let len = self.read_u8()? as usize;
        let offset = self.pos;
        let bytes = self.read_bytes(len)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|_| CodecError::InvalidUtf8 { offset })?
            .to_owned();
        self.read_bytes(string_padding(len))?;
        Ok(s)
    }

    /// Read a fixed-width name field, dropping trailing zero bytes
    ///
    /// Truncation on write may split a multi-byte character, so the decode is lossy.
    pub fn read_fixed_name(&mut self, len: usize) -> CodecResult<String> {
        let bytes = self.read_bytes(len)?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}
