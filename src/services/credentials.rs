use bcrypt::{hash, verify};
use crate::errors::AppResult;

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    Ok(hash(password.as_bytes(), cost)?)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    Ok(verify(password, password_hash)?)
}
