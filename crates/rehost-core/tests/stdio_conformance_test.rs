//! printf and scanf driven through a padded address space, the way the
//! ABI layer drives them.

use rehost_core::stdarg::{ArgList, Value};
use rehost_core::stdio::{ScanError, SpaceReader, format, scan};
use rehost_core::string::to_wide;
use rehost_membrane::{AddressSpace, Ptr, WORD_SIZE};

fn cstring(space: &AddressSpace, s: &str) -> Ptr {
    let p = space.allocate(s.len() + 1, WORD_SIZE);
    space.write(p, s.as_bytes());
    p
}

fn wstring(space: &AddressSpace, s: &str) -> Ptr {
    let units = to_wide(s);
    let p = space.allocate(units.len() * 2, WORD_SIZE);
    let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();
    space.write(p, &bytes);
    p
}

#[test]
fn printf_reads_strings_through_addresses() {
    let space = AddressSpace::new();
    let name = cstring(&space, "world");
    let wide = wstring(&space, "wide");
    let mut args = ArgList::new(
        3,
        vec![Value::Ptr(name), Value::WidePtr(wide), Value::from(3u32)],
    );
    let out = format(&space, b"hello %s, %S x%u", &mut args).unwrap();
    assert_eq!(out, b"hello world, wide x3");
    assert_eq!(args.remaining(), 0);
}

#[test]
fn printf_embedded_nul_truncates_string_argument() {
    let space = AddressSpace::new();
    let p = space.allocate(8, WORD_SIZE);
    space.write(p, b"ab\0cd\0");
    let mut args = ArgList::new(1, vec![Value::Ptr(p)]);
    assert_eq!(format(&space, b"<%s>", &mut args).unwrap(), b"<ab>");
    let mut args = ArgList::new(1, vec![Value::Bytes(b"xy\0z".to_vec())]);
    assert_eq!(format(&space, b"<%s>", &mut args).unwrap(), b"<xy>");
}

#[test]
fn printf_wide_fields_keep_full_width() {
    let space = AddressSpace::new();
    let mut args = ArgList::new(1, vec![Value::Int(1)]);
    let out = format(&space, b"%5000d", &mut args).unwrap();
    assert_eq!(out.len(), 5000);
    assert!(out[..4999].iter().all(|&b| b == b' '));
    assert_eq!(out[4999], b'1');

    let mut args = ArgList::new(1, vec![Value::Int(-7)]);
    let out = format(&space, b"%.5000d", &mut args).unwrap();
    assert_eq!(out.len(), 5001);
    assert_eq!(out[0], b'-');
    assert!(out[1..5000].iter().all(|&b| b == b'0'));
    assert_eq!(out[5000], b'7');

    let mut args = ArgList::new(1, vec![Value::Int(9)]);
    let out = format(&space, b"%-6000x|", &mut args).unwrap();
    assert_eq!(out.len(), 6001);
    assert_eq!(out[0], b'9');
    assert_eq!(out[6000], b'|');
}

#[test]
fn printf_wide_string_and_float_fields() {
    let space = AddressSpace::new();
    let s = cstring(&space, "abc");
    let mut args = ArgList::new(2, vec![Value::Ptr(s), Value::Float(0.5)]);
    let out = format(&space, b"%4500s|%.4200f", &mut args).unwrap();
    let (field, rest) = out.split_at(4500);
    assert!(field.ends_with(b"abc"));
    assert_eq!(rest[0], b'|');
    assert_eq!(&rest[1..3], b"0.");
    assert_eq!(rest.len(), 1 + 2 + 4200);
}

#[test]
fn printf_star_width_is_rejected() {
    let space = AddressSpace::new();
    let mut args = ArgList::new(2, vec![Value::from(5), Value::from(1)]);
    assert!(format(&space, b"%*d", &mut args).is_err());
}

#[test]
fn printf_missing_argument_is_an_error() {
    let space = AddressSpace::new();
    let mut args = ArgList::new(1, vec![Value::from(1)]);
    assert!(format(&space, b"%d %d", &mut args).is_err());
}

#[test]
fn scanf_commits_into_destinations() {
    let space = AddressSpace::new();
    let n = space.allocate(4, WORD_SIZE);
    let word = space.allocate(16, WORD_SIZE);
    let x = space.allocate(8, WORD_SIZE);

    let mut reader = SpaceReader::new(&b"  -42\r\nhello 2.5\n"[..]);
    let mut args = ArgList::new(
        3,
        vec![Value::Ptr(n), Value::Ptr(word), Value::Ptr(x)],
    );
    let commits = scan(&mut reader, b"%d %s %lf", &mut args).unwrap();
    assert_eq!(commits.len(), 3);
    for c in &commits {
        space.write(c.dst, &c.bytes);
    }

    let n_bytes: [u8; 4] = space.read(n, 4).try_into().unwrap();
    assert_eq!(i32::from_le_bytes(n_bytes), -42);
    assert_eq!(space.read(word, 6), b"hello\0");
    let x_bytes: [u8; 8] = space.read(x, 8).try_into().unwrap();
    assert_eq!(f64::from_le_bytes(x_bytes), 2.5);
}

#[test]
fn scanf_failure_returns_no_commits() {
    let mut reader = SpaceReader::new(&b"12 abc"[..]);
    let mut args = ArgList::new(
        2,
        vec![Value::Ptr(Ptr::from_addr(0x1000)), Value::Ptr(Ptr::from_addr(0x2000))],
    );
    let err = scan(&mut reader, b"%d %d", &mut args).unwrap_err();
    assert!(!err.is_usage());
    assert!(matches!(err, ScanError::Mismatch { .. }));
}

#[test]
fn scanf_newlines_match_spaces_in_literals() {
    let mut reader = SpaceReader::new(&b"a\nb"[..]);
    let mut args = ArgList::new(0, vec![]);
    let commits = scan(&mut reader, b"a b", &mut args).unwrap();
    assert!(commits.is_empty());
}
