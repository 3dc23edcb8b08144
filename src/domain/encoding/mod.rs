//! Borsh-compatible instruction data writer.
//!
//! The token metadata program decodes its instruction payloads with a fixed
//! borsh schema, so every byte emitted here must match that schema exactly:
//!
//! - integers are little-endian and fixed width
//! - a string is a `u32` byte length followed by its UTF-8 bytes
//! - `Option<T>` is a `0`/`1` tag followed by `T` only when present
//! - `Vec<T>` is a `u32` element count followed by each element
//!
//! [`InstructionDataWriter`] owns its buffer and tracks its own position, so
//! callers compose fields left to right without threading offsets around.
//! Length limits are a caller concern: values must be validated (or truncated
//! with [`truncate_to_byte_limit`]) before they reach the writer.

use solana_sdk::pubkey::Pubkey;

/// A value with a fixed borsh encoding.
pub trait BorshEncode {
    /// Appends the encoding of `self` to the writer.
    fn encode(&self, writer: &mut InstructionDataWriter);
}

/// Append-only byte writer for instruction payloads.
#[derive(Debug, Default, Clone)]
pub struct InstructionDataWriter {
    buffer: Vec<u8>,
}

impl InstructionDataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer pre-sized for a payload of roughly `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_u8(u8::from(value))
    }

    /// Copies the raw 32 address bytes.
    pub fn write_pubkey(&mut self, value: &Pubkey) -> &mut Self {
        self.buffer.extend_from_slice(value.as_ref());
        self
    }

    /// Writes a `u32` byte length followed by the UTF-8 bytes of `value`.
    ///
    /// Strings longer than `u32::MAX` bytes cannot be represented; the
    /// metadata limits keep every field far below that.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        let bytes = value.as_bytes();
        self.write_u32(bytes.len() as u32);
        self.buffer.extend_from_slice(bytes);
        self
    }

    pub fn write_option<T: BorshEncode + ?Sized>(&mut self, value: Option<&T>) -> &mut Self {
        match value {
            Some(inner) => {
                self.write_u8(1);
                inner.encode(self);
            }
            None => {
                self.write_u8(0);
            }
        }
        self
    }

    pub fn write_vec<T: BorshEncode>(&mut self, values: &[T]) -> &mut Self {
        self.write_u32(values.len() as u32);
        for value in values {
            value.encode(self);
        }
        self
    }

    /// Appends any encodable value.
    pub fn write<T: BorshEncode + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.encode(self);
        self
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl BorshEncode for u8 {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_u8(*self);
    }
}

impl BorshEncode for u16 {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_u16(*self);
    }
}

impl BorshEncode for u32 {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_u32(*self);
    }
}

impl BorshEncode for u64 {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_u64(*self);
    }
}

impl BorshEncode for bool {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_bool(*self);
    }
}

impl BorshEncode for Pubkey {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_pubkey(self);
    }
}

impl BorshEncode for str {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_string(self);
    }
}

impl BorshEncode for String {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_string(self);
    }
}

impl<T: BorshEncode> BorshEncode for Option<T> {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_option(self.as_ref());
    }
}

impl<T: BorshEncode> BorshEncode for Vec<T> {
    fn encode(&self, writer: &mut InstructionDataWriter) {
        writer.write_vec(self);
    }
}

/// Cuts `value` to at most `max_bytes` bytes without splitting a UTF-8
/// character.
pub fn truncate_to_byte_limit(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
