//! MySQL authentication plugin responses.
//!
//! - `mysql_native_password`: `SHA1(password) XOR SHA1(seed + SHA1(SHA1(password)))`
//! - `caching_sha2_password` fast path: `XOR(SHA256(password), SHA256(SHA256(SHA256(password)) + seed))`
//!
//! `caching_sha2_password` full authentication (its fallback when the
//! server hasn't cached the fast-auth hash) needs either TLS or RSA
//! public-key encryption of the password; both are out of scope, so a
//! server that demands full auth is reported as [`shark_core::Error::Unsupported`].

use sha1::Sha1;
use sha2::{Digest, Sha256};

pub mod plugins {
    pub const MYSQL_NATIVE_PASSWORD: &str = "mysql_native_password";
    pub const CACHING_SHA2_PASSWORD: &str = "caching_sha2_password";
    pub const MYSQL_CLEAR_PASSWORD: &str = "mysql_clear_password";
}

/// Response codes the server sends after `caching_sha2_password`'s initial exchange.
pub mod caching_sha2 {
    pub const FAST_AUTH_SUCCESS: u8 = 0x03;
    pub const PERFORM_FULL_AUTH: u8 = 0x04;
}

/// `auth_data` is the server's scramble; only its first 20 bytes are used.
#[must_use]
pub fn mysql_native_password(password: &str, auth_data: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return vec![];
    }

    let seed = if auth_data.len() > 20 { &auth_data[..20] } else { auth_data };

    let mut hasher = Sha1::new();
    hasher.update(password.as_bytes());
    let stage1: [u8; 20] = hasher.finalize().into();

    let mut hasher = Sha1::new();
    hasher.update(stage1);
    let stage2: [u8; 20] = hasher.finalize().into();

    let mut hasher = Sha1::new();
    hasher.update(seed);
    hasher.update(stage2);
    let stage3: [u8; 20] = hasher.finalize().into();

    stage1.iter().zip(stage3.iter()).map(|(a, b)| a ^ b).collect()
}

/// `auth_data` is usually a 20-byte scramble with a trailing NUL (21 bytes);
/// the NUL is stripped before hashing.
#[must_use]
pub fn caching_sha2_password(password: &str, auth_data: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return vec![];
    }

    let seed = if auth_data.len() == 21 && auth_data.last() == Some(&0) { &auth_data[..20] } else { auth_data };

    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    let password_hash: [u8; 32] = hasher.finalize().into();

    let mut hasher = Sha256::new();
    hasher.update(password_hash);
    let password_hash_hash: [u8; 32] = hasher.finalize().into();

    let mut hasher = Sha256::new();
    hasher.update(password_hash_hash);
    hasher.update(seed);
    let scramble: [u8; 32] = hasher.finalize().into();

    password_hash.iter().zip(scramble.iter()).map(|(a, b)| a ^ b).collect()
}
