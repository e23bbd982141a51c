//! Domain-separated BLAKE3 hashing for the Harvest protocol.
//!
//! Cross-domain collisions are prevented by mandatory domain separation
//! using BLAKE3's built-in mode flags.
//!
//! ## Modes
//!
//! - [`hash`] — Pure hashing: snapshot leaf values, general hashing
//! - [`derive_key`] — Key derivation: the inner-node MAC key
//! - [`keyed_hash`] — Keyed MAC: Merkle inner nodes
//!
//! ## Leaf scheme
//!
//! Leaf values are **double-hashed** ([`merkle_leaf`]): the encoded leaf is
//! hashed, and that digest is hashed again before entering the proof path.
//! A 32-byte inner-node value therefore never collides with a leaf, which
//! blocks second-preimage attacks replaying internal nodes as leaves.

/// Registered BLAKE3 context strings for the Harvest protocol.
/// Using an unregistered context string is a protocol violation.
pub mod contexts {
    pub const MERKLE_INNER_NODE: &str = "Harvest v1 merkle-inner-node";

    /// All registered context strings. Used for validation.
    pub const ALL_CONTEXTS: &[&str] = &[MERKLE_INNER_NODE];
}

/// Compute the BLAKE3 hash of the input data.
pub fn hash(data: &[u8]) -> [u8; 32] {
    *::blake3::hash(data).as_bytes()
}

/// Derive a key using BLAKE3's built-in key derivation mode.
///
/// The context string must be one of the registered context strings in
/// [`contexts`].
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut hasher = ::blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    out.copy_from_slice(hasher.finalize().as_bytes());
    out
}

/// Compute a keyed BLAKE3 hash (MAC).
///
/// The key must be exactly 32 bytes, typically derived via [`derive_key`].
pub fn keyed_hash(key: &[u8; 32], message: &[u8]) -> [u8; 32] {
    *::blake3::keyed_hash(key, message).as_bytes()
}

/// Verify that a context string is registered in the Harvest protocol.
pub fn is_registered_context(context: &str) -> bool {
    contexts::ALL_CONTEXTS.contains(&context)
}

/// Compute a Merkle leaf hash from an encoded leaf value.
///
/// Leaves are double-hashed: `BLAKE3(BLAKE3(encoding))`.
pub fn merkle_leaf(encoding: &[u8]) -> [u8; 32] {
    hash(&hash(encoding))
}

/// Compute a Merkle inner-node hash from two child hashes.
///
/// The pair is ordered by byte-wise value before hashing, so a single
/// verification routine serves trees built with either child ordering.
/// Inner nodes use `BLAKE3::keyed_hash(K_inner, lo || hi)` where
/// `K_inner = BLAKE3::derive_key("Harvest v1 merkle-inner-node", "")`.
pub fn merkle_inner(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let k_inner = derive_key(contexts::MERKLE_INNER_NODE, b"");
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut message = [0u8; 64];
    message[..32].copy_from_slice(lo);
    message[32..].copy_from_slice(hi);
    keyed_hash(&k_inner, &message)
}
