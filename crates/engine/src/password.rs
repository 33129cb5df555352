//! Salted password hashing (Argon2, PHC encoded).
//!
//! Hashing and verification run on the blocking thread pool.

use rand::{Rng, thread_rng};

use crate::ResultEngine;

pub async fn hash_password(password: &str) -> ResultEngine<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || -> ResultEngine<String> {
        let mut salt = [0u8; 32];
        thread_rng().fill(&mut salt);

        Ok(argon2::hash_encoded(
            password.as_bytes(),
            &salt,
            &argon2::Config::default(),
        )?)
    })
    .await?
}

/// Checks `password` against an encoded hash.
///
/// Hashes that are not Argon2 encoded never match.
pub async fn verify_password(encoded: &str, password: &str) -> ResultEngine<bool> {
    let encoded = encoded.to_owned();
    let password = password.to_owned();
    let verified = tokio::task::spawn_blocking(move || {
        argon2::verify_encoded(&encoded, password.as_bytes())
    })
    .await?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(err) => {
            tracing::warn!("stored password hash is not usable: {err}");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_only_the_same_password() {
        let hash = hash_password("password123").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "password123").await.unwrap());
        assert!(!verify_password(&hash, "password124").await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_different_salts() {
        let a = hash_password("secret").await.unwrap();
        let b = hash_password("secret").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn foreign_hash_never_matches() {
        let verified = verify_password("pbkdf2:sha256:260000$abc$def", "secret").await;
        assert_eq!(verified, Ok(false));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_runs_beside_other_tasks() {
        let ticker = tokio::spawn(async {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
        });
        let hash = hash_password("secret").await.unwrap();
        ticker.await.unwrap();
        assert!(verify_password(&hash, "secret").await.unwrap());
    }
}
