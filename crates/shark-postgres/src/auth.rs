//! PostgreSQL MD5 password authentication.
//!
//! `"md5" + hex(md5(hex(md5(password + user)) + salt))` — the inner hash
//! binds the password to the connecting user, the outer hash binds that
//! to the server's per-connection salt so the wire value is never reusable.

#[must_use]
pub fn md5_password(user: &str, password: &str, salt: &[u8; 4]) -> String {
    let inner = format!("{:x}", md5::compute(format!("{password}{user}").as_bytes()));
    let mut salted = inner.into_bytes();
    salted.extend_from_slice(salt);
    format!("md5{:x}", md5::compute(&salted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_password_has_prefix_and_is_deterministic() {
        let a = md5_password("alice", "hunter2", &[1, 2, 3, 4]);
        let b = md5_password("alice", "hunter2", &[1, 2, 3, 4]);
        assert!(a.starts_with("md5"));
        assert_eq!(a.len(), 3 + 32);
        assert_eq!(a, b);
    }

    #[test]
    fn md5_password_varies_with_user_password_and_salt() {
        let base = md5_password("alice", "hunter2", &[1, 2, 3, 4]);
        assert_ne!(base, md5_password("bob", "hunter2", &[1, 2, 3, 4]));
        assert_ne!(base, md5_password("alice", "other", &[1, 2, 3, 4]));
        assert_ne!(base, md5_password("alice", "hunter2", &[5, 6, 7, 8]));
    }
}
