use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::warn;

/// Hashes a plaintext password with Argon2id at the default work factor,
/// salting with fresh OS randomness per call. The output is a PHC string
/// that embeds algorithm, parameters and salt. Argon2 carries no bcrypt-like
/// 72-byte input cap; the length ceiling on passwords is enforced upstream
/// at validation time.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash_password error: {e}"))?
        .to_string();
    Ok(hash)
}

/// Checks a plaintext password against a stored PHC hash. Never fails: a
/// malformed stored hash logs a warning and verifies as false, so callers
/// get a uniform yes/no and corrupt rows cannot take down a login path.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking pool. Argon2 at the default cost takes
/// tens of milliseconds; running it inline would stall the async worker.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hash_a = hash_password("password123").unwrap();
        let hash_b = hash_password("password123").unwrap();
        // Fresh salt per call; equal hashes would mean the salt is reused.
        assert_ne!(hash_a, hash_b);
        assert!(verify_password("password123", &hash_a));
        assert!(verify_password("password123", &hash_b));
    }

    #[tokio::test]
    async fn blocking_wrappers_agree_with_sync_api() {
        let hash = hash_password_blocking("password123".into())
            .await
            .expect("hashing should succeed");
        assert!(verify_password_blocking("password123".into(), hash.clone())
            .await
            .expect("verification should succeed"));
        assert!(!verify_password_blocking("different".into(), hash)
            .await
            .expect("verification should succeed"));
    }
}
