use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub fn hash_password(password: &str) -> Result<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow!("failed to hash password: {e}"))
}

pub fn verify_password(password: &str, hashed: &str) -> Result<()> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed).map_err(|e| anyhow!("malformed password hash: {e}"))?;

    argon2
        .verify_password(password.as_bytes(), &parsed)
        .context("password mismatch")
}
