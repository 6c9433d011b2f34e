//! Format string tokenizer shared by the printf and scanf engines.
//!
//! A format string splits into literal runs and verbs. A verb opens at `%`
//! and extends over digits and `# + - * . space l`; any other byte closes it
//! and belongs to it, so `%d` and `%%` are both single verbs.

/// One token of a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatWord {
    pub text: Vec<u8>,
    pub verb: bool,
}

impl FormatWord {
    #[must_use]
    pub fn verb(text: &[u8]) -> Self {
        Self {
            text: text.to_vec(),
            verb: true,
        }
    }

    #[must_use]
    pub fn literal(text: &[u8]) -> Self {
        Self {
            text: text.to_vec(),
            verb: false,
        }
    }

    /// The conversion byte closing a verb, if any.
    #[must_use]
    pub fn conversion(&self) -> Option<u8> {
        if !self.verb || self.text.len() < 2 {
            return None;
        }
        self.text.last().copied()
    }
}

/// Bytes that extend an open verb.
pub const VERB_BODY: &[u8] = b"1234567890#+-*. l";

/// Splits `format` into literal and verb words, left to right.
///
/// A `%` directly after an opening `%` yields the `%%` verb. A `%` inside
/// a verb that already holds more than the `%` closes it and opens a new
/// verb. A format ending inside a verb yields that verb as is.
#[must_use]
pub fn parse_format(format: &[u8]) -> Vec<FormatWord> {
    let mut words = Vec::new();
    let mut cur: Vec<u8> = Vec::new();
    let mut in_verb = false;

    for &b in format {
        if b == b'%' {
            if in_verb && cur.len() == 1 {
                cur.push(b'%');
                push(&mut cur, true, &mut words);
                in_verb = false;
                continue;
            }
            push(&mut cur, in_verb, &mut words);
            cur.push(b'%');
            in_verb = true;
            continue;
        }
        if !in_verb || VERB_BODY.contains(&b) {
            cur.push(b);
            continue;
        }
        cur.push(b);
        push(&mut cur, true, &mut words);
        in_verb = false;
    }
    push(&mut cur, in_verb, &mut words);
    words
}

fn push(cur: &mut Vec<u8>, verb: bool, words: &mut Vec<FormatWord>) {
    if !cur.is_empty() {
        words.push(FormatWord {
            text: std::mem::take(cur),
            verb,
        });
    }
}
