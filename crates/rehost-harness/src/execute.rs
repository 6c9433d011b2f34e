//! Fixture execution: decode inputs, call the runtime, render the result.
//!
//! Each supported function reads named fields from the case inputs and
//! renders its result as a string. Fields holding C strings are JSON
//! strings; printf and scanf arguments are JSON arrays.

use rehost_abi::errno_abi::{reset, set_err, str_error};
use rehost_abi::malloc_abi::{free, malloc, realloc};
use rehost_abi::stdio_abi::{snprintf, sprintf, sscanf};
use rehost_abi::stdlib_abi::{atof, atoi};
use rehost_abi::string_abi::{
    c_string, cstr_bytes, go_string, load_f32, load_f64, load_i32, load_i64, load_u32, load_u8,
    pointer_diff, strcmp, strlen, strncpy, strstr, strtok,
};
use rehost_abi::wchar_abi::{c_wstring, wstrlen};
use rehost_core::stdarg::Value;
use rehost_membrane::{Ptr, global_space};
use serde_json::Value as Json;

use crate::HarnessError;

/// Function names [`execute`] understands.
pub const SUPPORTED: &[&str] = &[
    "strlen", "strcmp", "strncpy", "strstr", "strtok", "wcslen", "sprintf", "snprintf", "sscanf",
    "atoi", "atof", "malloc", "realloc", "strerror",
];

/// Run `function` with `inputs`, returning the rendered result.
///
/// The error register is cleared first, so the caller can read the
/// `errno` this call left behind.
///
/// # Errors
///
/// [`HarnessError::UnknownFunction`] or [`HarnessError::BadInput`] for a
/// malformed case.
///
/// # Panics
///
/// Whatever the runtime raises for a usage error; callers that expect
/// those should catch the unwind.
pub fn execute(function: &str, inputs: &Json) -> Result<String, HarnessError> {
    reset();
    let field = Fields { function, inputs };
    let out = match function {
        "strlen" => strlen(field.c_str("s")?).to_string(),
        "strcmp" => strcmp(field.c_str("a")?, field.c_str("b")?).signum().to_string(),
        "strncpy" => {
            let n = field.usize("n")?;
            let len = field.usize("dst_len")?;
            let dst = malloc(as_size(len));
            global_space().fill(dst, b'#', len);
            strncpy(dst, field.c_str("src")?, n);
            let bytes = global_space().read(dst, len);
            free(dst);
            format!("{bytes:?}")
        }
        "strstr" => {
            let hay = field.c_str("haystack")?;
            let hit = strstr(hay, field.c_str("needle")?);
            if hit.is_null() {
                "null".to_string()
            } else {
                pointer_diff(hit, hay).to_string()
            }
        }
        "strtok" => {
            let delim = field.c_str("delim")?;
            let mut tokens = Vec::new();
            let mut tok = strtok(field.c_str("s")?, delim);
            while !tok.is_null() {
                tokens.push(go_string(tok));
                tok = strtok(Ptr::NULL, delim);
            }
            tokens.join("|")
        }
        "wcslen" => wstrlen(c_wstring(&field.string("s")?)).to_string(),
        "sprintf" => {
            let text = field.string("format")?;
            let buf = malloc(256);
            let n = sprintf(buf, text.as_bytes(), field.args()?);
            let out = format!("{n}:{}", go_string(buf));
            free(buf);
            out
        }
        "snprintf" => {
            let text = field.string("format")?;
            let size = field.usize("size")?;
            let buf = malloc(256);
            let n = snprintf(buf, size, text.as_bytes(), field.args()?);
            let written = String::from_utf8_lossy(&cstr_bytes(buf)).into_owned();
            free(buf);
            format!("{n}:{written}")
        }
        "sscanf" => scan_case(&field)?,
        "atoi" => atoi(field.c_str("s")?).to_string(),
        "atof" => atof(field.c_str("s")?).to_string(),
        "malloc" => {
            let size = field.isize("size")?;
            let p = malloc(size);
            let zeroed = global_space().read(p, size.unsigned_abs()).iter().all(|&b| b == 0);
            free(p);
            format!("zeroed={zeroed}")
        }
        "realloc" => {
            let p = field.c_str("data")?;
            let q = realloc(p, field.isize("size")?);
            let kept = go_string(q);
            let retired = global_space().allocation(p).is_none();
            free(q);
            format!("{kept}|retired={retired}")
        }
        "strerror" => {
            let code = field.isize("code")?;
            let code = i32::try_from(code).map_err(|e| field.bad("code", e))?;
            if field.inputs.get("host").and_then(Json::as_bool) == Some(true) {
                set_err(std::io::Error::from_raw_os_error(code));
            }
            go_string(str_error(code))
        }
        other => return Err(HarnessError::UnknownFunction(other.to_string())),
    };
    Ok(out)
}

fn as_size(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

/// Destination kinds accepted by the `sscanf` fixture.
fn scan_case(field: &Fields<'_>) -> Result<String, HarnessError> {
    let input = field.c_str("input")?;
    let text = field.string("format")?;
    let kinds = field.list("dests")?;
    let mut dests = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let kind = kind
            .as_str()
            .ok_or_else(|| field.bad("dests", "expected strings"))?;
        let size = match kind {
            "int" | "uint" | "float" => 4,
            "long" | "double" => 8,
            "char" => 1,
            "str" => 64,
            other => return Err(field.bad("dests", format!("unknown kind {other:?}"))),
        };
        dests.push((kind, malloc(size)));
    }
    let args = dests.iter().map(|&(_, p)| Value::Ptr(p)).collect();
    let rc = sscanf(input, text.as_bytes(), args);
    let mut parts = vec![rc.to_string()];
    if rc >= 0 {
        for &(kind, p) in &dests {
            parts.push(match kind {
                "int" => load_i32(p).to_string(),
                "uint" => load_u32(p).to_string(),
                "long" => load_i64(p).to_string(),
                "float" => load_f32(p).to_string(),
                "double" => load_f64(p).to_string(),
                "char" => char::from(load_u8(p)).to_string(),
                _ => go_string(p),
            });
        }
    }
    for (_, p) in dests {
        free(p);
    }
    Ok(parts.join(";"))
}

struct Fields<'a> {
    function: &'a str,
    inputs: &'a Json,
}

impl Fields<'_> {
    fn bad(&self, field: &str, reason: impl ToString) -> HarnessError {
        HarnessError::BadInput {
            function: self.function.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    fn get(&self, name: &str) -> Result<&Json, HarnessError> {
        self.inputs.get(name).ok_or_else(|| self.bad(name, "missing"))
    }

    fn string(&self, name: &str) -> Result<String, HarnessError> {
        self.get(name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.bad(name, "expected a string"))
    }

    /// A new C string holding the field's text.
    fn c_str(&self, name: &str) -> Result<Ptr, HarnessError> {
        Ok(c_string(&self.string(name)?))
    }

    fn usize(&self, name: &str) -> Result<usize, HarnessError> {
        self.get(name)?
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| self.bad(name, "expected an unsigned integer"))
    }

    fn isize(&self, name: &str) -> Result<isize, HarnessError> {
        self.get(name)?
            .as_i64()
            .and_then(|n| isize::try_from(n).ok())
            .ok_or_else(|| self.bad(name, "expected an integer"))
    }

    fn list(&self, name: &str) -> Result<&Vec<Json>, HarnessError> {
        self.get(name)?
            .as_array()
            .ok_or_else(|| self.bad(name, "expected an array"))
    }

    /// Variadic arguments; missing means none.
    fn args(&self) -> Result<Vec<Value>, HarnessError> {
        match self.inputs.get("args") {
            None => Ok(Vec::new()),
            Some(Json::Array(items)) => items.iter().map(|v| self.arg(v)).collect(),
            Some(_) => Err(self.bad("args", "expected an array")),
        }
    }

    /// JSON to argument value. `{"ptr": s}` and `{"wide": s}` become
    /// addresses of new narrow and wide C strings.
    fn arg(&self, v: &Json) -> Result<Value, HarnessError> {
        Ok(match v {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => Value::Int(i),
                (None, Some(u), _) => Value::Uint(u),
                (None, None, Some(f)) => Value::Float(f),
                _ => return Err(self.bad("args", format!("unrepresentable number {n}"))),
            },
            Json::String(s) => Value::Str(s.clone()),
            Json::Object(map) => match (map.get("ptr"), map.get("wide")) {
                (Some(Json::String(s)), _) => Value::Ptr(c_string(s)),
                (_, Some(Json::String(s))) => Value::WidePtr(c_wstring(s)),
                _ => return Err(self.bad("args", "expected {\"ptr\": ..} or {\"wide\": ..}")),
            },
            Json::Array(_) => return Err(self.bad("args", "nested arrays are not arguments")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_functions() {
        assert_eq!(execute("strlen", &json!({"s": "hello"})).unwrap(), "5");
        assert_eq!(execute("strcmp", &json!({"a": "a", "b": "b"})).unwrap(), "-1");
        assert_eq!(
            execute("strncpy", &json!({"src": "ab", "n": 5, "dst_len": 6})).unwrap(),
            "[97, 98, 0, 0, 0, 35]"
        );
        assert_eq!(
            execute("strstr", &json!({"haystack": "abcabc", "needle": "ca"})).unwrap(),
            "2"
        );
    }

    #[test]
    fn printf_arguments_from_json() {
        let out = execute(
            "sprintf",
            &json!({"format": "%s/%S/%d/%.1f", "args": [{"ptr": "n"}, {"wide": "w"}, -4, 1.5]}),
        )
        .unwrap();
        assert_eq!(out, "10:n/w/-4/1.5");
    }

    #[test]
    fn unknown_function_and_bad_input() {
        assert!(matches!(
            execute("gets", &json!({})),
            Err(HarnessError::UnknownFunction(_))
        ));
        let err = execute("strlen", &json!({"s": 3})).unwrap_err();
        assert!(err.to_string().contains("expected a string"));
    }
}
