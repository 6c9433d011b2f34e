//! Variadic argument lists.
//!
//! A variadic call site hands its trailing arguments over as an ordered
//! sequence of dynamically typed [`Value`]s. [`ArgList`] walks that sequence
//! with a cursor the way `va_start`/`va_arg`/`va_end` walk a C stack frame.
//! Running past the end yields [`Value::Nil`], never an error.

use std::fmt;

use rehost_membrane::{AddressSpace, Ptr};

use crate::string::wide;

/// One dynamically typed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value: an exhausted list or an explicit null.
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Address of a byte buffer.
    Ptr(Ptr),
    /// Address of a 16-bit wide-character buffer.
    WidePtr(Ptr),
    /// Host string.
    Str(String),
    /// Host byte buffer; text ends at the first NUL if any.
    Bytes(Vec<u8>),
}

impl Value {
    /// Short name of the variant for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Ptr(_) => "pointer",
            Self::WidePtr(_) => "wide pointer",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Integer view. Signed values are reinterpreted two's complement;
    /// pointers yield their address; `true` is 1.
    pub fn as_uint(&self) -> Result<u64, CoerceError> {
        match *self {
            Self::Nil => Ok(0),
            Self::Bool(b) => Ok(u64::from(b)),
            Self::Int(v) => Ok(v as u64),
            Self::Uint(v) => Ok(v),
            Self::Ptr(p) | Self::WidePtr(p) => Ok(p.addr() as u64),
            _ => Err(self.coerce_error("unsigned")),
        }
    }

    /// Floating-point view. Only float values convert.
    pub fn as_float(&self) -> Result<f64, CoerceError> {
        match *self {
            Self::Float(v) => Ok(v),
            _ => Err(self.coerce_error("float")),
        }
    }

    /// Address view. Integers are taken as raw addresses; nil is null.
    pub fn as_addr(&self) -> Result<Ptr, CoerceError> {
        match *self {
            Self::Nil => Ok(Ptr::NULL),
            Self::Ptr(p) | Self::WidePtr(p) => Ok(p),
            Self::Int(v) => Ok(Ptr::from_addr(v as usize)),
            Self::Uint(v) => Ok(Ptr::from_addr(v as usize)),
            _ => Err(self.coerce_error("pointer")),
        }
    }

    /// Text view as bytes without a terminator.
    ///
    /// Addresses are read as NUL-terminated strings through `space`;
    /// wide pointers are decoded and re-encoded as UTF-8. A null address
    /// is the empty string.
    pub fn as_text(&self, space: &AddressSpace) -> Result<Vec<u8>, CoerceError> {
        match self {
            Self::Str(s) => Ok(s.as_bytes().to_vec()),
            Self::Bytes(b) => Ok(crate::string::as_cstr(b).to_vec()),
            Self::Nil => Ok(Vec::new()),
            Self::Ptr(p) => Ok(read_cstr(space, *p)),
            Self::Uint(v) => Ok(read_cstr(space, Ptr::from_addr(*v as usize))),
            Self::WidePtr(p) => {
                if p.is_null() {
                    return Ok(Vec::new());
                }
                let units = space.scan_nul_wide(*p);
                let raw = space.read(*p, units * 2);
                let wide: Vec<u16> = raw
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect();
                Ok(wide::from_wide(&wide).into_bytes())
            }
            _ => Err(self.coerce_error("string")),
        }
    }

    fn coerce_error(&self, target: &'static str) -> CoerceError {
        CoerceError {
            target,
            found: self.kind(),
        }
    }
}

fn read_cstr(space: &AddressSpace, p: Ptr) -> Vec<u8> {
    if p.is_null() {
        return Vec::new();
    }
    let len = space.scan_nul(p);
    space.read(p, len)
}

/// A value could not be viewed as the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert {found} to {target}")]
pub struct CoerceError {
    pub target: &'static str,
    pub found: &'static str,
}

macro_rules! value_from {
    ($($t:ty => $variant:ident as $inner:ty),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::$variant(<$inner>::from(v))
            }
        })*
    };
}

value_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Uint as u64,
    u16 => Uint as u64,
    u32 => Uint as u64,
    u64 => Uint as u64,
    f32 => Float as f64,
    f64 => Float as f64,
    Ptr => Ptr as Ptr,
    String => Str as String,
    Vec<u8> => Bytes as Vec<u8>,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::Uint(v as u64)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::Int(v as i64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Ptr(p) | Self::WidePtr(p) => write!(f, "{p}"),
            Self::Str(s) => f.write_str(s),
            Self::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

/// Cursor over the trailing arguments of one variadic call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgList {
    cursor: usize,
    tag: u32,
    args: Vec<Value>,
}

impl ArgList {
    /// A list already started over `rest`.
    #[must_use]
    pub fn new(tag: u32, rest: Vec<Value>) -> Self {
        Self {
            cursor: 0,
            tag,
            args: rest,
        }
    }

    /// `va_start`: reset the cursor and capture the call-site values.
    pub fn start(&mut self, tag: u32, rest: Vec<Value>) {
        self.cursor = 0;
        self.tag = tag;
        self.args = rest;
    }

    /// The whole backing sequence, regardless of the cursor.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// `va_arg`: the next value, or [`Value::Nil`] once exhausted.
    pub fn arg(&mut self) -> Value {
        self.try_arg().unwrap_or(Value::Nil)
    }

    /// Like [`ArgList::arg`] but distinguishes exhaustion from a nil value.
    pub fn try_arg(&mut self) -> Option<Value> {
        let v = self.args.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(v)
    }

    /// The next value as an address. Nil is 0.
    ///
    /// # Panics
    ///
    /// Panics if the value is not an integer, pointer or nil.
    pub fn arg_uintptr(&mut self) -> usize {
        let v = self.arg();
        match v.as_addr() {
            Ok(p) => p.addr(),
            Err(_) => panic!("va_arg: unsupported type: {}", v.kind()),
        }
    }

    /// `va_end`: clear the cursor and the backing sequence.
    pub fn end(&mut self) {
        self.cursor = 0;
        self.tag = 0;
        self.args.clear();
    }

    /// `va_copy`: take `src`'s position over a private copy of its values.
    pub fn copy_from(&mut self, src: &ArgList) {
        self.cursor = src.cursor;
        self.tag = src.tag;
        self.args = src.args.clone();
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.args.len().saturating_sub(self.cursor)
    }
}

/// `va_copy(dst, src)`.
pub fn arg_copy(dst: &mut ArgList, src: &ArgList) {
    dst.copy_from(src);
}
