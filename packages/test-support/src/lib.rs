//! Dependency-light helpers for generating test data.
//!
//! Two flavours are provided: ULID-suffixed values for tests that need
//! process-wide uniqueness, and deterministic counting/hashing values for
//! tests that need the same data on every run.

use ulid::Ulid;

/// Generate a unique string with the given prefix.
///
/// # Examples
/// ```
/// use test_support::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{prefix}-{}", Ulid::new())
}

/// Generate a unique email address with the given prefix.
///
/// # Examples
/// ```
/// use test_support::unique_email;
///
/// let email = unique_email("test");
/// assert!(email.starts_with("test-"));
/// assert!(email.ends_with("@example.test"));
/// ```
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.test", Ulid::new())
}

/// The nth placeholder email address, `email_{n}@example.test`.
///
/// Deterministic on purpose: tests that assert on the address itself should
/// use these rather than [`unique_email`].
pub fn placeholder_email(n: usize) -> String {
    format!("email_{n}@example.test")
}

/// The first `count` placeholder email addresses, in order.
pub fn placeholder_emails(count: usize) -> Vec<String> {
    (0..count).map(placeholder_email).collect()
}

/// Generate a deterministic 32-byte seed from a test name.
///
/// The seed is stable across runs but differs between tests, so concurrent
/// tests never collide on seeded data.
pub fn test_seed(test_name: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(test_name.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Hex form of [`test_seed`] for APIs that take a string key.
pub fn test_digest(test_name: &str) -> String {
    test_seed(test_name)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
