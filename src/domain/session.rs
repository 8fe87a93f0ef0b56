use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::errors::DomainError;

/// Register-wide unlock state behind the shared passphrase.
///
/// Only the signed-in flag is persisted, as a marker file, so a restart
/// keeps the register open. Analytics must be unlocked again.
#[derive(Debug)]
pub struct Session {
    passphrase: String,
    marker: PathBuf,
    authenticated: bool,
    analytics_unlocked: bool,
}

const MARKER_CONTENT: &str = "true";

impl Session {
    /// Restores the signed-in flag from `marker`, if present.
    pub fn load(passphrase: impl Into<String>, marker: impl Into<PathBuf>) -> Self {
        let marker = marker.into();
        let authenticated = fs::read_to_string(&marker)
            .map(|content| content.trim() == MARKER_CONTENT)
            .unwrap_or(false);
        Self {
            passphrase: passphrase.into(),
            marker,
            authenticated,
            analytics_unlocked: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_analytics_unlocked(&self) -> bool {
        self.authenticated && self.analytics_unlocked
    }

    /// Checks a passphrase without changing any state.
    pub fn verify(&self, passphrase: &str) -> Result<(), DomainError> {
        if passphrase == self.passphrase {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    pub fn login(&mut self, passphrase: &str) -> Result<(), DomainError> {
        self.verify(passphrase)?;
        fs::write(&self.marker, MARKER_CONTENT).map_err(|e| marker_error(&self.marker, e))?;
        self.authenticated = true;
        Ok(())
    }

    /// Clears every flag and removes the marker.
    pub fn logout(&mut self) -> Result<(), DomainError> {
        self.authenticated = false;
        self.analytics_unlocked = false;
        match fs::remove_file(&self.marker) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(marker_error(&self.marker, e)),
        }
    }

    pub fn unlock_analytics(&mut self, passphrase: &str) -> Result<(), DomainError> {
        self.require_authenticated()?;
        self.verify(passphrase)?;
        self.analytics_unlocked = true;
        Ok(())
    }

    pub fn lock_analytics(&mut self) {
        self.analytics_unlocked = false;
    }

    pub fn require_authenticated(&self) -> Result<(), DomainError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    pub fn require_analytics(&self) -> Result<(), DomainError> {
        if self.is_analytics_unlocked() {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }
}

fn marker_error(path: &Path, e: io::Error) -> DomainError {
    DomainError::Internal(format!("session marker {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(dir: &tempfile::TempDir) -> Session {
        Session::load("123456", dir.path().join("session"))
    }

    #[test]
    fn wrong_passphrase_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        assert!(matches!(s.login("000000"), Err(DomainError::Unauthorized)));
        assert!(!s.is_authenticated());
    }

    #[test]
    fn login_survives_reload_and_logout_clears_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.login("123456").unwrap();
        assert!(session(&dir).is_authenticated());

        s.logout().unwrap();
        assert!(!s.is_authenticated());
        assert!(!session(&dir).is_authenticated());
    }

    #[test]
    fn analytics_needs_its_own_unlock() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.login("123456").unwrap();
        assert!(s.require_analytics().is_err());

        s.unlock_analytics("123456").unwrap();
        assert!(s.require_analytics().is_ok());

        s.lock_analytics();
        assert!(!s.is_analytics_unlocked());
    }

    #[test]
    fn analytics_unlock_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        assert!(s.unlock_analytics("123456").is_err());
    }

    #[test]
    fn logout_also_locks_analytics() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.login("123456").unwrap();
        s.unlock_analytics("123456").unwrap();
        s.logout().unwrap();
        assert!(!s.is_analytics_unlocked());
    }
}
