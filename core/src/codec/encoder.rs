//! codec/encoder.rs
//!
//! Streaming LZW encoder with a bounded, open-addressed dictionary.
//!
//! Design notes:
//! - Bytes are pushed one at a time; completed wire bytes are appended to a
//!   caller-supplied `Vec<u8>` as soon as they exist.
//! - Codes are `CODE_BITS` wide and packed MSB-first. Leftover bits stay in the
//!   accumulator between calls.
//! - When the dictionary is full the encoder emits `CLEAR_CODE` and starts over,
//!   so the decoder can rebuild exactly the same table.
use tracing::{debug, trace};

use crate::codec::constants::{
    hash_size_for, CLEAR_CODE, CODE_BITS, CODE_HASH_SIZE, FIRST_CODE, MASKS, TERMINATOR_CODE,
};
use crate::codec::types::{CodecError, Compressor};

/// Marks a free slot in the key table. Real keys are always non-negative.
const EMPTY: i32 = -1;

#[derive(Debug, Clone)]
pub struct Encoder {
    bits: u8,
    max_code: u16,
    hash_size: usize,
    shift: u32,
    /// Combined `(entity << 16) | byte` keys.
    hash_table: Vec<i32>,
    /// Code assigned to the key in the same slot.
    code_table: Vec<u16>,
    free_entry: u16,
    /// Code of the longest prefix matched so far.
    ent: u16,
    first_byte: bool,
    out_byte: u8,
    out_bits: u8,
    finished: bool,
    resets: u64,
    bytes_in: u64,
}

impl Encoder {
    /// Encoder with the fixed 13-bit code width.
    pub fn new() -> Self {
        Self::build(CODE_BITS, CODE_HASH_SIZE)
    }

    /// Fails fast when `bits` is not the supported code width.
    pub fn with_code_bits(bits: u8) -> Result<Self, CodecError> {
        match hash_size_for(bits) {
            Some(hash_size) if bits == CODE_BITS => Ok(Self::build(bits, hash_size)),
            _ => Err(CodecError::InvalidCodeWidth { bits }),
        }
    }

    fn build(bits: u8, hash_size: usize) -> Self {

        let mut doublings = 0u32;
        let mut fc = hash_size;
        while fc < 65536 {
            fc *= 2;
            doublings += 1;
        }

        Self {
            bits,
            max_code: MASKS[bits as usize],
            hash_size,
            shift: 8u32.saturating_sub(doublings),
            hash_table: vec![EMPTY; hash_size],
            code_table: vec![0; hash_size],
            free_entry: FIRST_CODE,
            ent: 0,
            first_byte: true,
            out_byte: 0,
            out_bits: 0,
            finished: false,
            resets: 0,
            bytes_in: 0,
        }
    }

    /// Drop all state and start a brand-new stream.
    pub fn reset(&mut self) {
        *self = Self::build(self.bits, self.hash_size);
    }

    fn clear_hash(&mut self) {
        self.hash_table.fill(EMPTY);
        self.code_table.fill(0);
        self.free_entry = FIRST_CODE;
    }

    /// Number of times the dictionary filled up and was cleared.
    pub fn dictionary_resets(&self) -> u64 {
        self.resets
    }

    /// Next code the dictionary will hand out.
    pub fn free_entry(&self) -> u16 {
        self.free_entry
    }

    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Encode a single byte. May append zero or more wire bytes to `out`.
    ///
    /// Encoding after [`Encoder::finish`] starts a new stream with an empty
    /// dictionary.
    pub fn encode(&mut self, byte: u8, out: &mut Vec<u8>) {
        if self.finished {
            debug!("encoder reused after finish, starting a new stream");
            self.reset();
        }
        self.bytes_in += 1;

        if self.first_byte {
            self.first_byte = false;
            self.ent = byte as u16;
            return;
        }

        let key = ((self.ent as i32) << 16) | byte as i32;
        let mut idx = ((byte as usize) << self.shift) ^ self.ent as usize;

        if self.hash_table[idx] == key {
            self.ent = self.code_table[idx];
            return;
        }

        if self.hash_table[idx] != EMPTY {
            // Secondary probe. hash_size is prime, so every slot is reachable.
            let disp = if idx == 0 { 1 } else { self.hash_size - idx };
            loop {
                idx = if idx >= disp { idx - disp } else { idx + self.hash_size - disp };

                if self.hash_table[idx] == key {
                    self.ent = self.code_table[idx];
                    return;
                }
                if self.hash_table[idx] == EMPTY {
                    break;
                }
            }
        }

        self.send_code(self.ent, out);
        self.ent = byte as u16;

        if self.free_entry < self.max_code {
            self.code_table[idx] = self.free_entry;
            self.hash_table[idx] = key;
            self.free_entry += 1;
        } else {
            self.send_code(CLEAR_CODE, out);
            self.clear_hash();
            self.resets += 1;
            trace!(resets = self.resets, "dictionary full, emitted clear code");
        }
    }

    /// Encode every byte of `input`.
    pub fn encode_all(&mut self, input: &[u8], out: &mut Vec<u8>) {
        for &b in input {
            self.encode(b, out);
        }
    }

    /// Emit the pending entity and the terminator, then pad the last byte.
    ///
    /// An encoder that never saw a byte emits nothing. Calling `finish` twice
    /// is a no-op.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        if self.finished {
            return;
        }
        self.finished = true;

        if self.first_byte {
            return;
        }

        self.send_code(self.ent, out);
        self.send_code(TERMINATOR_CODE, out);

        if self.out_bits > 0 {
            out.push(self.out_byte << (8 - self.out_bits));
            self.out_byte = 0;
            self.out_bits = 0;
        }
    }

    fn push_if_full(&mut self, out: &mut Vec<u8>) {
        if self.out_bits == 8 {
            out.push(self.out_byte);
            self.out_byte = 0;
            self.out_bits = 0;
        }
    }

    /// Pack one code MSB-first into the output accumulator.
    fn send_code(&mut self, code: u16, out: &mut Vec<u8>) {
        let mut code = code & MASKS[self.bits as usize];
        let mut remaining = self.bits;

        loop {
            let room = 8 - self.out_bits;
            if remaining <= room {
                self.out_byte = (((self.out_byte as u16) << remaining) | code) as u8;
                self.out_bits += remaining;
                self.push_if_full(out);
                break;
            }

            remaining -= room;
            self.out_byte = (((self.out_byte as u16) << room) | (code >> remaining)) as u8;
            code &= MASKS[remaining as usize];
            self.out_bits = 8;
            self.push_if_full(out);
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for Encoder {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CodecError> {
        self.encode_all(input, out);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        Encoder::finish(self, out);
        Ok(())
    }
}
