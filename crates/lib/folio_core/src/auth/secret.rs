//! Signing-secret resolution.
//!
//! Lookup order: `JWT_SECRET`, then `AUTH_SECRET`, then a secret persisted
//! under the user data directory. When none exists a fresh one is generated
//! and written there so tokens survive a restart.

use std::io;
use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};

const SECRET_ENV_VARS: [&str; 2] = ["JWT_SECRET", "AUTH_SECRET"];

/// Resolve the JWT signing secret.
pub fn resolve_jwt_secret() -> String {
    SECRET_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|secret| !secret.is_empty())
        .unwrap_or_else(|| load_or_create(&jwt_secret_path()))
}

/// Read the secret stored at `path`, generating and persisting one if absent.
///
/// A failed write is logged and the generated secret is still returned, so
/// the server starts but sessions will not outlive the process.
fn load_or_create(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret = generate_secret();
    match persist(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "failed to persist generated JWT secret; tokens will not survive a restart"
        ),
    }
    secret
}

fn persist(path: &Path, secret: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, secret)
}

/// 64 random alphanumeric characters.
fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("folio-secret-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn generated_secrets_are_long_and_distinct() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn secret_path_is_namespaced() {
        assert!(jwt_secret_path().ends_with("folio/jwt-secret"));
    }

    #[test]
    fn generated_secret_is_persisted_and_reused() {
        let dir = scratch_dir();
        let path = dir.join("nested").join("jwt-secret");

        let first = load_or_create(&path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
        assert_eq!(load_or_create(&path), first);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn unwritable_path_still_yields_a_secret() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        // A regular file where a parent directory is expected.
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("jwt-secret");

        assert!(persist(&path, "x").is_err());
        let secret = load_or_create(&path);
        assert_eq!(secret.len(), 64);
        assert!(!path.exists());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
