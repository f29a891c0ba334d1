//! codec/constants.rs
//! Fixed code-width parameters shared by the encoder and the decoder.

/// Smallest code width the hash-table prime list covers.
pub const MIN_BITS: u8 = 9;
/// Largest code width the hash-table prime list covers.
pub const MAX_BITS: u8 = 15;

/// Code width used on the wire. Fixed for this protocol.
pub const CODE_BITS: u8 = 13;

/// Reserved code telling the decoder to drop its dictionary.
pub const CLEAR_CODE: u16 = 256;
/// First code assigned to a dictionary entry.
pub const FIRST_CODE: u16 = 257;
/// Largest code representable in `CODE_BITS` bits. Also the terminator.
pub const MAX_CODE: u16 = (1 << CODE_BITS) - 1;
/// End-of-stream marker: all ones, `CODE_BITS` wide.
pub const TERMINATOR_CODE: u16 = MAX_CODE;

/// Hash table sizes indexed by `bits - MIN_BITS`.
pub const PRIMES: [usize; 7] = [601, 1501, 2801, 5003, 9001, 18013, 35023];

/// Hash table size for `CODE_BITS`.
pub const CODE_HASH_SIZE: usize = match hash_size_for(CODE_BITS) {
    Some(size) => size,
    None => panic!("CODE_BITS outside the prime table"),
};

/// Low-bit masks, `MASKS[n]` keeps the low `n` bits.
pub const MASKS: [u16; 17] = [
    0x0000, 0x0001, 0x0003, 0x0007, 0x000f, 0x001f, 0x003f, 0x007f, 0x00ff,
    0x01ff, 0x03ff, 0x07ff, 0x0fff, 0x1fff, 0x3fff, 0x7fff, 0xffff,
];

/// Hash table size for a code width, `None` outside `MIN_BITS..=MAX_BITS`.
pub const fn hash_size_for(bits: u8) -> Option<usize> {
    if bits < MIN_BITS || bits > MAX_BITS {
        return None;
    }
    Some(PRIMES[(bits - MIN_BITS) as usize])
}
