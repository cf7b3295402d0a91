//! Process-level error type.
//!
//! Exit codes used by the `txm` binary:
//!
//! - `2` — bad input: missing/unparseable reference files, facts JSON, or config
//! - `3` — no usable rows after expansion
//! - `4` — external rate source misconfiguration (lookup *failures* never abort;
//!   they degrade to rows without expected values)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Bad input data or configuration (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// External rate source misconfiguration (exit code 4).
    pub fn external(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
