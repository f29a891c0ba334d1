//! codec/decoder.rs
//!
//! Streaming LZW decoder. Mirrors the encoder's dictionary one code behind.
//!
//! Design notes:
//! - Input arrives a byte at a time; at most one code completes per byte.
//! - The dictionary is a prefix/suffix pair of arrays; strings are rebuilt on a
//!   small stack and emitted in order.
//! - A framing error poisons the decoder. Callers start a fresh one for the
//!   next stream.
use tracing::{debug, trace, warn};

use crate::codec::constants::{CLEAR_CODE, CODE_BITS, FIRST_CODE, MASKS, TERMINATOR_CODE};
use crate::codec::types::{CodecError, Decompressor};

#[derive(Debug, Clone)]
pub struct Decoder {
    bits: u8,
    max_code: u16,
    prefix: Vec<u16>,
    suffix: Vec<u8>,
    stack: Vec<u8>,
    free_entry: u16,
    prev_code: u16,
    /// First byte of the most recently decoded string.
    last_byte: u8,
    first_code: bool,
    acc: u32,
    acc_bits: u8,
    finished: bool,
    poisoned: bool,
    clears: u64,
    codes: u64,
}

impl Decoder {
    pub fn new() -> Self {
        Self::build(CODE_BITS)
    }

    pub fn with_code_bits(bits: u8) -> Result<Self, CodecError> {
        if bits != CODE_BITS {
            return Err(CodecError::InvalidCodeWidth { bits });
        }
        Ok(Self::build(bits))
    }

    fn build(bits: u8) -> Self {
        let max_code = MASKS[bits as usize];
        let mut suffix = vec![0u8; max_code as usize];
        for (i, s) in suffix.iter_mut().take(256).enumerate() {
            *s = i as u8;
        }

        Self {
            bits,
            max_code,
            prefix: vec![0; max_code as usize],
            suffix,
            stack: Vec::with_capacity(max_code as usize),
            free_entry: FIRST_CODE,
            prev_code: 0,
            last_byte: 0,
            first_code: true,
            acc: 0,
            acc_bits: 0,
            finished: false,
            poisoned: false,
            clears: 0,
            codes: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::build(self.bits);
    }

    /// True once the terminator code has been read.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Clear codes seen so far.
    pub fn clears_seen(&self) -> u64 {
        self.clears
    }

    pub fn codes_decoded(&self) -> u64 {
        self.codes
    }

    /// Feed one wire byte. Appends any decoded bytes to `out`.
    ///
    /// Bytes after the terminator are ignored.
    pub fn decode(&mut self, byte: u8, out: &mut Vec<u8>) -> Result<(), CodecError> {
        if self.poisoned {
            return Err(CodecError::Poisoned);
        }
        if self.finished {
            return Ok(());
        }

        self.acc = (self.acc << 8) | byte as u32;
        self.acc_bits += 8;
        if self.acc_bits < self.bits {
            return Ok(());
        }

        self.acc_bits -= self.bits;
        let code = ((self.acc >> self.acc_bits) as u16) & MASKS[self.bits as usize];
        self.acc &= (1u32 << self.acc_bits) - 1;

        self.process(code, out).map_err(|e| {
            warn!(error = %e, "lzw framing error, decoder poisoned");
            self.poisoned = true;
            self.stack.clear();
            e
        })
    }

    pub fn decode_all(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        for &b in input {
            self.decode(b, out)?;
        }
        Ok(())
    }

    fn process(&mut self, code: u16, out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.codes += 1;

        if code == TERMINATOR_CODE {
            debug!(codes = self.codes, "lzw terminator reached");
            self.finished = true;
            return Ok(());
        }

        if self.first_code {
            if code > 255 {
                return Err(CodecError::InvalidCode { code, free_entry: self.free_entry });
            }
            self.first_code = false;
            self.prev_code = code;
            self.last_byte = code as u8;
            out.push(self.last_byte);
            return Ok(());
        }

        if code == CLEAR_CODE {
            // Next code re-registers slot 256, which nothing ever references.
            self.free_entry = FIRST_CODE - 1;
            self.stack.clear();
            self.clears += 1;
            trace!(clears = self.clears, "lzw clear code");
            return Ok(());
        }

        let mut cur = code;
        if code >= self.free_entry {
            // Code not defined yet: it must be prev + first(prev).
            self.stack.push(self.last_byte);
            cur = self.prev_code;
        }

        let mut steps = 0u16;
        while cur > 255 {
            if cur >= self.max_code {
                return Err(CodecError::InvalidCode { code, free_entry: self.free_entry });
            }
            if steps >= self.max_code {
                return Err(CodecError::ChainTooLong { code });
            }
            self.stack.push(self.suffix[cur as usize]);
            cur = self.prefix[cur as usize];
            steps += 1;
        }

        self.last_byte = cur as u8;
        self.stack.push(self.last_byte);
        while let Some(b) = self.stack.pop() {
            out.push(b);
        }

        if self.free_entry < self.max_code {
            self.prefix[self.free_entry as usize] = self.prev_code;
            self.suffix[self.free_entry as usize] = self.last_byte;
            self.free_entry += 1;
        }
        self.prev_code = code;
        Ok(())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Decoder {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.decode_all(input, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack 13-bit codes MSB-first, zero padded.
    fn pack(codes: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut acc = 0u64;
        let mut n = 0u32;
        for &c in codes {
            acc = (acc << 13) | c as u64;
            n += 13;
            while n >= 8 {
                n -= 8;
                out.push((acc >> n) as u8);
            }
        }
        if n > 0 {
            out.push((acc << (8 - n)) as u8);
        }
        out
    }

    #[test]
    fn decodes_hand_packed_codes() {
        let wire = pack(&[0x41, 0x42, 257, 257, TERMINATOR_CODE]);
        let mut dec = Decoder::new();
        let mut out = Vec::new();
        dec.decode_all(&wire, &mut out).unwrap();
        assert_eq!(out, b"ABABAB");
        assert!(dec.is_finished());
    }

    #[test]
    fn handles_code_not_yet_in_dictionary() {
        // "AAAA" encodes as A, 257(AA), A.
        let wire = pack(&[0x41, 257, 0x41, TERMINATOR_CODE]);
        let mut dec = Decoder::new();
        let mut out = Vec::new();
        dec.decode_all(&wire, &mut out).unwrap();
        assert_eq!(out, b"AAAA");
    }

    #[test]
    fn first_code_must_be_literal() {
        let wire = pack(&[300, 0x41]);
        let mut dec = Decoder::new();
        let mut out = Vec::new();
        let err = dec.decode_all(&wire, &mut out).unwrap_err();
        assert!(err.is_framing());
        assert!(dec.is_poisoned());
        assert_eq!(dec.decode(0, &mut out), Err(CodecError::Poisoned));
    }

    #[test]
    fn clear_code_restarts_dictionary() {
        let wire = pack(&[0x41, 0x42, CLEAR_CODE, 0x43, 0x44, 257, TERMINATOR_CODE]);
        let mut dec = Decoder::new();
        let mut out = Vec::new();
        dec.decode_all(&wire, &mut out).unwrap();
        // After the clear, 256 is a dummy entry and 257 is "CD".
        assert_eq!(out, b"ABCDCD");
        assert_eq!(dec.clears_seen(), 1);
    }

    #[test]
    fn ignores_bytes_after_terminator() {
        let mut wire = pack(&[0x41, TERMINATOR_CODE]);
        wire.extend_from_slice(&[0xff, 0x00, 0x12]);
        let mut dec = Decoder::new();
        let mut out = Vec::new();
        dec.decode_all(&wire, &mut out).unwrap();
        assert_eq!(out, b"A");
    }
}
