use super::{ErrorBag, FlowError};
use std::error::Error;

/// Error type build over ErrorBag, carrying the source location where it was created
/// and an optional message. Create it with the `err_*` macros so the location is captured.
#[derive(Debug)]
pub struct VaultError {
    pub inner: ErrorBag,
    pub msg: Option<String>,
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl VaultError {
    /// Flow failure wrapped by this error, if any
    pub fn flow_error(&self) -> Option<&FlowError> {
        match &self.inner {
            ErrorBag::FlowError(flow_error) => Some(flow_error),
            _ => None,
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner)
    }
}

impl std::fmt::Display for VaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file_loc = self.file.replace('\\', "/");
        match &self.msg {
            Some(msg) => write!(
                f,
                "{}, {}, {}:{}:{}",
                msg, self.inner, file_loc, self.line, self.column
            ),
            None => write!(
                f,
                "{}, {}:{}:{}",
                self.inner, file_loc, self.line, self.column
            ),
        }
    }
}
