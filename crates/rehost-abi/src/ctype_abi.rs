//! `<ctype.h>` and `<wctype.h>` entry points.
//!
//! Pure compute: no addresses, no error register. Each class returns the
//! C truth value, 1 or 0.

use rehost_core::ctype;
use rehost_core::stdlib::bool_to_int;

/// `WEOF` as seen by the wide classifiers.
pub const WEOF: u32 = 0xFFFF_FFFF;

fn wide(wc: u32) -> i32 {
    i32::try_from(wc).unwrap_or(-1)
}

macro_rules! classes {
    ($($narrow:ident, $wide:ident => $class:path);* $(;)?) => {
        $(
            #[must_use]
            pub fn $narrow(c: i32) -> i32 {
                bool_to_int($class(c))
            }

            #[must_use]
            pub fn $wide(wc: u32) -> i32 {
                bool_to_int($class(wide(wc)))
            }
        )*
    };
}

classes! {
    isalpha, iswalpha => ctype::is_alpha;
    isalnum, iswalnum => ctype::is_alnum;
    isdigit, iswdigit => ctype::is_digit;
    isxdigit, iswxdigit => ctype::is_xdigit;
    isspace, iswspace => ctype::is_space;
    isupper, iswupper => ctype::is_upper;
    islower, iswlower => ctype::is_lower;
    isprint, iswprint => ctype::is_print;
    ispunct, iswpunct => ctype::is_punct;
}

#[must_use]
pub fn toupper(c: i32) -> i32 {
    ctype::to_upper(c)
}

#[must_use]
pub fn tolower(c: i32) -> i32 {
    ctype::to_lower(c)
}

/// `towupper`. `WEOF` and non-characters map to themselves.
#[must_use]
pub fn towupper(wc: u32) -> u32 {
    u32::try_from(ctype::to_upper(wide(wc))).unwrap_or(wc)
}

#[must_use]
pub fn towlower(wc: u32) -> u32 {
    u32::try_from(ctype::to_lower(wide(wc))).unwrap_or(wc)
}
