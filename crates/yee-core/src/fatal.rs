//! Escalation of unrecoverable errors at the driver boundary.
//!
//! A distributed field that failed half-way through an update has no
//! resumption state, so the driver loop terminates the process. Library
//! code returns `Result` and never aborts on its own.

use std::error::Error;
use std::panic::Location;

/// Turn an `Err` into a logged process abort.
pub trait OrAbort<T> {
    /// Return the value, or log the error chain at the caller's location
    /// and abort the process.
    fn or_abort(self) -> T;
}

impl<T, E: Error> OrAbort<T> for Result<T, E> {
    #[track_caller]
    fn or_abort(self) -> T {
        match self {
            Ok(v) => v,
            Err(err) => {
                let location = Location::caller();
                let mut chain = err.to_string();
                let mut source = err.source();
                while let Some(cause) = source {
                    chain.push_str(": ");
                    chain.push_str(&cause.to_string());
                    source = cause.source();
                }
                tracing::error!(
                    file = location.file(),
                    line = location.line(),
                    "fatal: {chain}"
                );
                std::process::abort()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn ok_passes_through() {
        let r: Result<u32, ConfigError> = Ok(4);
        assert_eq!(r.or_abort(), 4);
    }
}
