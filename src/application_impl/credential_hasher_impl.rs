use crate::application_port::{AuthError, CredentialHasher, PasswordCredential};
use argon2::Argon2;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const SALT_LEN: usize = 16;
const ARGON2_OUTPUT_LEN: usize = 32;

/// Argon2id (default parameters) over the password with a 16-byte salt.
#[derive(Debug, Default)]
pub struct Argon2CredentialHasher;

/// Single SHA-256 pass over salt‖password. Kept for credentials written by
/// the earlier storefront deployment; prefer [`Argon2CredentialHasher`].
#[derive(Debug, Default)]
pub struct Sha256CredentialHasher;

fn fresh_salt() -> Result<[u8; SALT_LEN], AuthError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| AuthError::RandomnessUnavailable(e.to_string()))?;
    Ok(salt)
}

fn decode_stored(digest_hex: &str, salt_hex: &str) -> Result<(Vec<u8>, Vec<u8>), AuthError> {
    let digest =
        hex::decode(digest_hex).map_err(|e| AuthError::MalformedCredential(format!("digest: {e}")))?;
    let salt =
        hex::decode(salt_hex).map_err(|e| AuthError::MalformedCredential(format!("salt: {e}")))?;
    Ok((digest, salt))
}

fn argon2_digest(password: &[u8], salt: &[u8]) -> Result<Vec<u8>, AuthError> {
    let mut out = vec![0u8; ARGON2_OUTPUT_LEN];
    Argon2::default()
        .hash_password_into(password, salt, &mut out)
        .map_err(|e| AuthError::InternalError(format!("argon2: {e}")))?;
    Ok(out)
}

fn sha256_digest(password: &[u8], salt: &[u8]) -> Result<Vec<u8>, AuthError> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password);
    Ok(hasher.finalize().to_vec())
}

type DigestFn = fn(&[u8], &[u8]) -> Result<Vec<u8>, AuthError>;

async fn hash_with(digest: DigestFn, password: &str) -> Result<PasswordCredential, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = fresh_salt()?;
        let out = digest(password.as_bytes(), &salt)?;
        Ok(PasswordCredential {
            digest_hex: hex::encode(out),
            salt_hex: hex::encode(salt),
        })
    })
    .await
    .map_err(|e| AuthError::InternalError(format!("hashing task: {e}")))?
}

async fn verify_with(
    digest: DigestFn,
    password: &str,
    digest_hex: &str,
    salt_hex: &str,
) -> Result<bool, AuthError> {
    let (stored, salt) = decode_stored(digest_hex, salt_hex)?;
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let computed = digest(password.as_bytes(), &salt)?;
        Ok(bool::from(computed.as_slice().ct_eq(stored.as_slice())))
    })
    .await
    .map_err(|e| AuthError::InternalError(format!("verify task: {e}")))?
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash_password(&self, password: &str) -> Result<PasswordCredential, AuthError> {
        hash_with(argon2_digest, password).await
    }

    async fn verify_password(
        &self,
        password: &str,
        digest_hex: &str,
        salt_hex: &str,
    ) -> Result<bool, AuthError> {
        verify_with(argon2_digest, password, digest_hex, salt_hex).await
    }
}

#[async_trait::async_trait]
impl CredentialHasher for Sha256CredentialHasher {
    async fn hash_password(&self, password: &str) -> Result<PasswordCredential, AuthError> {
        hash_with(sha256_digest, password).await
    }

    async fn verify_password(
        &self,
        password: &str,
        digest_hex: &str,
        salt_hex: &str,
    ) -> Result<bool, AuthError> {
        verify_with(sha256_digest, password, digest_hex, salt_hex).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    fn hashers() -> Vec<(&'static str, Box<dyn CredentialHasher>)> {
        vec![
            ("argon2", Box::new(Argon2CredentialHasher)),
            ("sha256", Box::new(Sha256CredentialHasher)),
        ]
    }

    #[tokio::test]
    async fn verify_accepts_the_hashed_password() -> TestResult {
        for (name, hasher) in hashers() {
            let cred = hasher.hash_password("correct horse").await?;
            assert_eq!(hex::decode(&cred.salt_hex)?.len(), SALT_LEN, "{name}");
            let ok = hasher
                .verify_password("correct horse", &cred.digest_hex, &cred.salt_hex)
                .await?;
            assert!(ok, "{name}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn verify_rejects_another_password() -> TestResult {
        for (name, hasher) in hashers() {
            let cred = hasher.hash_password("correct horse").await?;
            let ok = hasher
                .verify_password("battery staple", &cred.digest_hex, &cred.salt_hex)
                .await?;
            assert!(!ok, "{name}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn hashing_is_salted_per_call() -> TestResult {
        for (name, hasher) in hashers() {
            let a = hasher.hash_password("same").await?;
            let b = hasher.hash_password("same").await?;
            assert_ne!(a.salt_hex, b.salt_hex, "{name}");
            assert_ne!(a.digest_hex, b.digest_hex, "{name}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn malformed_hex_is_reported() -> TestResult {
        let hasher = Argon2CredentialHasher;
        let cred = hasher.hash_password("pw").await?;

        let bad_digest = hasher.verify_password("pw", "zz", &cred.salt_hex).await;
        assert!(matches!(bad_digest, Err(AuthError::MalformedCredential(_))));

        let bad_salt = hasher.verify_password("pw", &cred.digest_hex, "abc").await;
        assert!(matches!(bad_salt, Err(AuthError::MalformedCredential(_))));
        Ok(())
    }

    #[tokio::test]
    async fn sha256_matches_the_legacy_layout() -> TestResult {
        // digest = sha256(salt || password), both hex
        let salt = [7u8; SALT_LEN];
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(b"legacy");
        let digest_hex = hex::encode(hasher.finalize());

        let ok = Sha256CredentialHasher
            .verify_password("legacy", &digest_hex, &hex::encode(salt))
            .await?;
        assert!(ok);
        Ok(())
    }
}
