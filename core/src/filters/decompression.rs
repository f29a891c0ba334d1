//! filters/decompression.rs
//!
//! Expands `<cmp>` ... `</cmp>` regions through a fresh LZW decoder each.
//! Bytes outside a region pass through untouched. Tag bytes are consumed.
use std::convert::Infallible;

use tracing::{debug, warn};

use crate::codec::Decoder;
use crate::constants::tags::{COMPRESS_START, COMPRESS_STOP};
use crate::filters::tag::TagDetector;
use crate::filters::types::{Filter, FilterError};

#[derive(Debug, Default)]
pub struct DecompressionFilter {
    detector: TagDetector,
    in_region: bool,
    /// `None` inside a region whose stream failed; bytes are dropped until the stop tag.
    decoder: Option<Decoder>,
    regions: u64,
}

impl DecompressionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_region(&self) -> bool {
        self.in_region
    }

    /// Compressed regions opened so far.
    pub fn regions(&self) -> u64 {
        self.regions
    }

    fn open_region(&mut self) {
        self.in_region = true;
        self.decoder = Some(Decoder::new());
        self.regions += 1;
        debug!(region = self.regions, "compressed region opened");
    }

    fn close_region(&mut self) {
        if let Some(dec) = self.decoder.take() {
            if !dec.is_finished() {
                warn!(region = self.regions, "compressed region closed before terminator");
            }
        }
        self.in_region = false;
        debug!(region = self.regions, "compressed region closed");
    }
}

/// Route a data byte: straight out, or through the region's decoder.
fn pass(in_region: bool, decoder: &mut Option<Decoder>, byte: u8, out: &mut Vec<u8>) -> Result<(), FilterError> {
    if !in_region {
        out.push(byte);
        return Ok(());
    }
    let Some(dec) = decoder.as_mut() else {
        return Ok(());
    };
    if let Err(e) = dec.decode(byte, out) {
        *decoder = None;
        return Err(e.into());
    }
    Ok(())
}

impl Filter for DecompressionFilter {
    fn name(&self) -> &'static str {
        "decompression"
    }

    fn write(&mut self, byte: u8, out: &mut Vec<u8>) -> Result<(), FilterError> {
        let tag = if self.in_region { COMPRESS_STOP } else { COMPRESS_START };
        let in_region = self.in_region;
        let decoder = &mut self.decoder;

        // A failed spill must not swallow the breaking byte, it may open the stop tag.
        let mut spill_err = None;
        let matched = self
            .detector
            .matches(tag, byte, |b| {
                if let Err(e) = pass(in_region, decoder, b, out) {
                    spill_err.get_or_insert(e);
                }
                Ok::<(), Infallible>(())
            })
            .unwrap_or_else(|e| match e {});

        if !matched {
            let result = pass(in_region, &mut self.decoder, byte, out);
            return spill_err.map_or(result, Err);
        }

        if self.detector.is_complete(tag) {
            self.detector.clear();
            if in_region {
                self.close_region();
            } else {
                self.open_region();
            }
        }
        spill_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::compress;

    fn run(filter: &mut DecompressionFilter, input: &[u8]) -> Result<Vec<u8>, FilterError> {
        let mut out = Vec::new();
        for &b in input {
            filter.write(b, &mut out)?;
        }
        Ok(out)
    }

    #[test]
    fn plain_bytes_pass_through() {
        let mut f = DecompressionFilter::new();
        assert_eq!(run(&mut f, b"hello <c world").unwrap(), b"hello <c world");
        assert!(!f.in_region());
    }

    #[test]
    fn region_is_expanded() {
        let mut wire = b"pre".to_vec();
        wire.extend_from_slice(COMPRESS_START);
        wire.extend_from_slice(&compress(b"abcabcabcabc"));
        wire.extend_from_slice(COMPRESS_STOP);
        wire.extend_from_slice(b"post");

        let mut f = DecompressionFilter::new();
        assert_eq!(run(&mut f, &wire).unwrap(), b"preabcabcabcabcpost");
        assert_eq!(f.regions(), 1);
    }

    #[test]
    fn corrupt_region_is_dropped_until_stop_tag() {
        let mut f = DecompressionFilter::new();
        let mut out = Vec::new();
        for &b in COMPRESS_START {
            f.write(b, &mut out).unwrap();
        }
        // 0xFF 0xF0 packs code 8190 first, which is not a literal.
        let err = [0xFFu8, 0xF0]
            .iter()
            .try_for_each(|&b| f.write(b, &mut out))
            .unwrap_err();
        assert!(!err.is_recoverable());

        for &b in b"junk" {
            f.write(b, &mut out).unwrap();
        }
        for &b in COMPRESS_STOP {
            f.write(b, &mut out).unwrap();
        }
        f.write(b'!', &mut out).unwrap();
        assert_eq!(out, b"!");
    }

    #[test]
    fn failed_spill_still_sees_stop_tag() {
        let mut f = DecompressionFilter::new();
        let mut out = Vec::new();
        for &b in COMPRESS_START {
            f.write(b, &mut out).unwrap();
        }
        // "</" is a stop tag false start; once spilled it decodes to code 1925,
        // which is not a literal. The breaking '<' opens the real stop tag.
        f.write(b'<', &mut out).unwrap();
        f.write(b'/', &mut out).unwrap();
        let err = f.write(b'<', &mut out).unwrap_err();
        assert!(!err.is_recoverable());

        for &b in &COMPRESS_STOP[1..] {
            f.write(b, &mut out).unwrap();
        }
        assert!(!f.in_region());
        for &b in b"ok" {
            f.write(b, &mut out).unwrap();
        }
        assert_eq!(out, b"ok");
    }
}
