//! filters/tag.rs
//!
//! Backtracking delimiter detector.
//!
//! Bytes that could still be the start of a tag are held back. When the match
//! breaks they are handed back to the caller through `spill`, and the breaking
//! byte is tested once more against the start of the tag.

#[derive(Debug, Clone, Default)]
pub struct TagDetector {
    pending: Vec<u8>,
}

impl TagDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while `byte` extends a candidate match of `tag`.
    ///
    /// The caller owns the byte when this returns `false`. Held-back bytes are
    /// passed to `spill` in arrival order before that happens.
    pub fn matches<E, F>(&mut self, tag: &[u8], byte: u8, mut spill: F) -> Result<bool, E>
    where
        F: FnMut(u8) -> Result<(), E>,
    {
        if self.extend(tag, byte) {
            return Ok(true);
        }
        if self.pending.is_empty() {
            return Ok(false);
        }

        for b in std::mem::take(&mut self.pending) {
            spill(b)?;
        }
        // Single retry: the breaking byte may open a new occurrence.
        Ok(self.extend(tag, byte))
    }

    fn extend(&mut self, tag: &[u8], byte: u8) -> bool {
        match tag.get(self.pending.len()) {
            Some(&expected) if expected == byte => {
                self.pending.push(byte);
                true
            }
            _ => false,
        }
    }

    /// Bytes tentatively matched so far.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_complete(&self, tag: &[u8]) -> bool {
        !tag.is_empty() && self.pending.len() == tag.len()
    }

    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Drop the held bytes. Called once a tag is confirmed and consumed.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
