//! codec/stream.rs
//! One-shot and reader-driven helpers on top of the encoder and decoder.
use std::io::Read;

use crate::codec::decoder::Decoder;
use crate::codec::encoder::Encoder;
use crate::codec::types::{CodecError, Compressor, Decompressor};

/// Upper bound for a single read in the streaming helpers.
pub const MAX_CHUNK_SIZE: usize = 1 << 20;

/// Compress a whole buffer into one terminated stream.
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut enc = Encoder::new();
    let mut out = Vec::with_capacity(input.len());
    enc.encode_all(input, &mut out);
    enc.finish(&mut out);
    out
}

/// Decompress a whole terminated stream.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut dec = Decoder::new();
    let mut out = Vec::with_capacity(input.len() * 2);
    dec.decode_all(input, &mut out)?;
    Ok(out)
}

/// Summary: Compress data read from R in chunk_size blocks, yielding compressed chunks.
/// - Calls compressor.finish() once after EOF to flush the tail and terminator.
/// - Empty chunks are skipped.
pub fn compress_stream<R: Read>(
    mut r: R,
    chunk_size: usize,
    mut compressor: Box<dyn Compressor>,
) -> Result<impl Iterator<Item = Result<Vec<u8>, CodecError>>, CodecError> {
    check_chunk_size(chunk_size)?;
    let mut buf = vec![0u8; chunk_size];
    let mut done = false;

    Ok(std::iter::from_fn(move || loop {
        if done {
            return None;
        }
        match r.read(&mut buf) {
            Ok(0) => {
                done = true;
                let mut out = Vec::new();
                return match compressor.finish(&mut out) {
                    Err(e) => Some(Err(e)),
                    Ok(()) if out.is_empty() => None,
                    Ok(()) => Some(Ok(out)),
                };
            }
            Ok(n) => {
                let mut out = Vec::new();
                if let Err(e) = compressor.compress_chunk(&buf[..n], &mut out) {
                    done = true;
                    return Some(Err(e));
                }
                if !out.is_empty() {
                    return Some(Ok(out));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                done = true;
                return Some(Err(e.into()));
            }
        }
    }))
}

/// Summary: Decompress data read from R in chunk_size blocks, yielding decompressed chunks.
/// - Stops at the first error; the decoder is poisoned after a framing error anyway.
pub fn decompress_stream<R: Read>(
    mut r: R,
    chunk_size: usize,
    mut decompressor: Box<dyn Decompressor>,
) -> Result<impl Iterator<Item = Result<Vec<u8>, CodecError>>, CodecError> {
    check_chunk_size(chunk_size)?;
    let mut buf = vec![0u8; chunk_size];
    let mut done = false;

    Ok(std::iter::from_fn(move || loop {
        if done {
            return None;
        }
        match r.read(&mut buf) {
            Ok(0) => {
                done = true;
                return None;
            }
            Ok(n) => {
                let mut out = Vec::new();
                if let Err(e) = decompressor.decompress_chunk(&buf[..n], &mut out) {
                    done = true;
                    return Some(Err(e));
                }
                if !out.is_empty() {
                    return Some(Ok(out));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                done = true;
                return Some(Err(e.into()));
            }
        }
    }))
}

fn check_chunk_size(chunk_size: usize) -> Result<(), CodecError> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(CodecError::Io(format!(
            "chunk size {chunk_size} outside 1..={MAX_CHUNK_SIZE}"
        )));
    }
    Ok(())
}
