//! Process-level ports owned by the runtime.

/// Exit code for every fatal error after startup.
pub const FATAL_EXIT_CODE: i32 = 99;

/// Terminates the process.
///
/// Production calls [`std::process::exit`]; tests record the code instead,
/// in which case the caller carries on after `exit` returns.
pub trait ProcessExit: Send + Sync {
    fn exit(&self, code: i32);
}

/// Exits the real process.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdProcessExit;

impl ProcessExit for StdProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code)
    }
}
