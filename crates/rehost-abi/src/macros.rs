//! Helper macros shared by the entry-point modules.

/// Panic for an entry point that is declared but not emulated.
///
/// ```ignore
/// pub fn listen(_fd: i32, _backlog: i32) -> i32 {
///     not_emulated!("listen")
/// }
/// ```
macro_rules! not_emulated {
    ($name:literal) => {
        panic!(concat!($name, ": not emulated"))
    };
}

/// Log one environment-facing call at debug level.
macro_rules! trace_call {
    ($family:literal, $symbol:expr, $($details:tt)+) => {
        if ::rehost_membrane::log::enabled(::rehost_membrane::LogLevel::Debug) {
            ::rehost_membrane::log::event(
                ::rehost_membrane::LogLevel::Debug,
                $family,
                $symbol,
                ::serde_json::json!($($details)+),
            );
        }
    };
}
