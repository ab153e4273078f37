//! Launcher that records URLs instead of opening them.
//!
//! Used headless and in tests; a desktop or mobile host supplies its own
//! `SystemLauncher`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::SystemLauncher;

#[derive(Debug, Default)]
pub struct RecordingLauncher {
    inner: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    opened: Vec<String>,
    fail: bool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launcher whose every `open` fails, as when no handler is registered.
    pub fn failing() -> Self {
        let launcher = Self::default();
        launcher.lock().fail = true;
        launcher
    }

    pub fn opened(&self) -> Vec<String> {
        self.lock().opened.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SystemLauncher for RecordingLauncher {
    fn open(&self, url: &str) -> Result<(), DomainError> {
        let mut state = self.lock();
        if state.fail {
            return Err(DomainError::new(
                ErrorCode::LaunchFailed,
                format!("No handler for {}", url),
            ));
        }
        info!(url, "Opening external URL");
        state.opened.push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_opened_urls() {
        let launcher = RecordingLauncher::new();
        launcher.open("https://apps.apple.com/account/subscriptions").unwrap();
        assert_eq!(
            launcher.opened(),
            vec!["https://apps.apple.com/account/subscriptions".to_string()]
        );
    }

    #[test]
    fn failing_launcher_reports_launch_failed() {
        let launcher = RecordingLauncher::failing();
        let err = launcher.open("https://example.com").unwrap_err();
        assert_eq!(err.code, ErrorCode::LaunchFailed);
        assert!(launcher.opened().is_empty());
    }
}
