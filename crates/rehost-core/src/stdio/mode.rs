//! fopen mode strings.

/// Access requested by an fopen mode string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub readable: bool,
    pub writable: bool,
    pub append: bool,
    pub truncate: bool,
    pub create: bool,
}

impl OpenFlags {
    /// Read-only access to an existing file.
    pub const READ_ONLY: Self = Self {
        readable: true,
        writable: false,
        append: false,
        truncate: false,
        create: false,
    };
}

/// Parses an fopen mode: `r`, `w`, `a`, each optionally followed by `+`.
///
/// `b` is accepted anywhere after the first byte and ignored. Returns
/// `None` for anything else.
#[must_use]
pub fn parse_mode(mode: &[u8]) -> Option<OpenFlags> {
    let (&base, rest) = mode.split_first()?;
    let mut flags = match base {
        b'r' => OpenFlags::READ_ONLY,
        b'w' => OpenFlags {
            writable: true,
            create: true,
            truncate: true,
            ..OpenFlags::default()
        },
        b'a' => OpenFlags {
            writable: true,
            create: true,
            append: true,
            ..OpenFlags::default()
        },
        _ => return None,
    };
    let mut plus = false;
    for &m in rest {
        match m {
            b'b' => {}
            b'+' if !plus => plus = true,
            _ => return None,
        }
    }
    if plus {
        flags.readable = true;
        flags.writable = true;
    }
    Some(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_modes() {
        assert_eq!(parse_mode(b"r"), Some(OpenFlags::READ_ONLY));
        let w = parse_mode(b"w").unwrap();
        assert!(w.writable && w.create && w.truncate && !w.readable);
        let a = parse_mode(b"a").unwrap();
        assert!(a.writable && a.create && a.append && !a.truncate);
    }

    #[test]
    fn plus_and_binary() {
        let r = parse_mode(b"r+b").unwrap();
        assert!(r.readable && r.writable && !r.create);
        assert_eq!(parse_mode(b"rb+"), parse_mode(b"r+"));
        let w = parse_mode(b"wb+").unwrap();
        assert!(w.readable && w.truncate);
        assert_eq!(parse_mode(b"ab"), parse_mode(b"a"));
    }

    #[test]
    fn rejects_unknown_modes() {
        assert_eq!(parse_mode(b""), None);
        assert_eq!(parse_mode(b"x"), None);
        assert_eq!(parse_mode(b"wx"), None);
        assert_eq!(parse_mode(b"r++"), None);
    }
}
