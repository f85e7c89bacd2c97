//! Argon2id hashing for stored secrets.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`)
//! so the cost parameters travel with each row and can be raised
//! later without invalidating existing accounts.
use anyhow::{Error, Result, anyhow};
use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::RngCore as _;

const SALT_LEN: usize = 16;

fn hasher(params: Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash `secret` with a fresh random salt.
pub fn hash_secret_with(secret: &str, params: Params) -> Result<String, Error> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| anyhow!("Invalid salt: {}", e))?;

    let hash = hasher(params)
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| anyhow!("Hashing secret failed: {}", e))?;
    Ok(hash.to_string())
}

/// Check `secret` against a PHC encoded hash. Malformed hashes are an
/// error rather than a mismatch.
pub fn verify_secret(secret: &str, encoded: &str) -> Result<bool, Error> {
    let parsed =
        PasswordHash::new(encoded).map_err(|e| anyhow!("Malformed secret hash: {}", e))?;

    // Cost parameters are read from the hash itself
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Verifying secret failed: {}", e)),
    }
}

/// The cheapest parameters argon2 accepts. Only for tests.
pub fn low_cost_params() -> Params {
    Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None)
        .expect("Minimum argon2 params are valid")
}
