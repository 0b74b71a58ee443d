///Creates a new located error from anything convertible into ErrorBag
#[macro_export]
macro_rules! err_create {
    ($t:expr) => {
        $crate::error::VaultError {
            inner: $crate::error::ErrorBag::from($t),
            msg: None,
            file: file!(),
            line: line!(),
            column: column!(),
        }
    };
}

///Creates a new located CustomError, arguments are passed to format!
#[macro_export]
macro_rules! err_custom_create {
    ($($t:tt)*) => {
        $crate::error::VaultError {
            inner: $crate::error::ErrorBag::from($crate::error::CustomError::from_owned_string(format!($($t)*))),
            msg: None,
            file: file!(),
            line: line!(),
            column: column!(),
        }
    };
}

///Closure for map_err, wraps the error with file and line info
#[macro_export]
macro_rules! err_from {
    () => {
        |e| $crate::error::VaultError {
            inner: $crate::error::ErrorBag::from(e),
            msg: None,
            file: file!(),
            line: line!(),
            column: column!(),
        }
    };
}

///Closure for map_err, wraps the error with file and line info and a formatted message
#[macro_export]
macro_rules! err_from_msg {
    ($($t:tt)*) => {{
        |e| $crate::error::VaultError {
            inner: $crate::error::ErrorBag::from(e),
            msg: Some(format!($($t)*)),
            file: file!(),
            line: line!(),
            column: column!(),
        }
    }};
}
