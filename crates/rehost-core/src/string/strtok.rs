//! String tokenization: the shared-cursor `strtok` and reentrant `strtok_r`.
//!
//! Both overwrite the delimiter that ends each token with a zero unit and
//! report token boundaries as indices into the caller's buffer. The cursor
//! logic is generic over the code unit so wide strings reuse it.

/// Cursor state for one tokenized string.
///
/// The string length is fixed when tokenization starts; zeros written by
/// earlier calls do not shorten it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    len: usize,
    pos: usize,
}

impl Tokenizer {
    /// Start tokenizing a string of `len` units.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len, pos: 0 }
    }

    /// Length of the tokenized string.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of the next unit to scan.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// True once the whole string has been consumed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.pos >= self.len
    }

    /// Finds the next token in `buf` and returns its start offset.
    ///
    /// `delims` is the logical delimiter set (no terminator). The unit that
    /// ends the token is overwritten with `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than the length given to [`Tokenizer::new`].
    pub fn next_token<T: Copy + PartialEq + Default>(
        &mut self,
        buf: &mut [T],
        delims: &[T],
    ) -> Option<usize> {
        let data = &mut buf[..self.len];
        let mut pos = self.pos;
        while pos < self.len && delims.contains(&data[pos]) {
            pos += 1;
        }
        if pos >= self.len {
            self.pos = self.len;
            return None;
        }
        let start = pos;
        while pos < self.len && !delims.contains(&data[pos]) {
            pos += 1;
        }
        if pos < self.len {
            data[pos] = T::default();
            pos += 1;
        }
        self.pos = pos;
        Some(start)
    }
}

/// Reentrant tokenizer over a NUL-terminated buffer.
///
/// `save_ptr` is the offset returned by the previous call (0 on the first).
/// Returns `(token_start, token_len, new_save_ptr)`, or `None` when no
/// tokens remain.
pub fn strtok_r(s: &mut [u8], delimiters: &[u8], save_ptr: usize) -> Option<(usize, usize, usize)> {
    if save_ptr > s.len() {
        return None;
    }
    let len = save_ptr + super::strlen(&s[save_ptr..]);
    let delims = super::as_cstr(delimiters);
    let mut tok = Tokenizer { len, pos: save_ptr };
    let start = tok.next_token(s, delims)?;
    let token_len = super::strlen(&s[start..]);
    Some((start, token_len, tok.position()))
}
