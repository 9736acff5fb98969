//! Cancellation token and Ctrl+C handling.
//!
//! Long-running phases (listing, precompute, comparison scheduling, the
//! confirmation loop) take an explicit [`CancelToken`] and poll it at their
//! checkpoints. The token is never consulted through hidden global state;
//! [`install_handler`] wires Ctrl+C to one token and hands it back to the
//! caller to thread through the pipeline.
//!
//! When a signal is received the token is cancelled and the application is
//! expected to exit with code 130 (128 + SIGINT) after cleaning up.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::OnceLock;

/// Exit code for SIGINT (Ctrl+C) interruption: 128 + signal number.
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Cooperative cancellation token shared between the coordinating thread,
/// the walker, and the comparison workers.
///
/// Cloning is cheap; all clones observe the same flag. Cancellation is
/// one-way for a session: once set, the pipeline winds down keeping the
/// results it already aggregated.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Reset the token to the not-cancelled state.
    ///
    /// Primarily useful in tests that reuse the process-wide handler.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_TOKEN: OnceLock<CancelToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// If a handler is already installed (e.g. in tests), the existing token is
/// reset and returned, or a fresh unhooked token is created. This lets tests
/// running in parallel call `run_app()` without failing on handler
/// registration conflicts.
pub fn install_handler() -> Result<CancelToken, SignalError> {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancelToken::new();
    let hooked = token.clone();

    match ctrlc::set_handler(move || {
        hooked.cancel();

        // stderr is line-buffered, flush explicitly
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Cleaning up...");
        let _ = std::io::stderr().flush();

        log::info!("Shutdown signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(token)
        }
        Err(_) => {
            if let Some(token) = GLOBAL_TOKEN.get() {
                token.reset();
                Ok(token.clone())
            } else {
                // Another handler owns the signal (e.g. a parallel test).
                // Hand out an unhooked token; cancel() still works manually.
                log::debug!("Ctrl+C handler already registered, using unhooked token");
                let fallback = CancelToken::new();
                let _ = GLOBAL_TOKEN.set(fallback.clone());
                Ok(fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_and_reset() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_clone_shares_flag() {
        let token = CancelToken::new();
        let cloned = token.clone();
        token.cancel();
        assert!(cloned.is_cancelled());
    }

    #[test]
    fn test_token_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CancelToken>();
    }

    #[test]
    fn test_exit_code_interrupted() {
        assert_eq!(EXIT_CODE_INTERRUPTED, 130);
    }
}
