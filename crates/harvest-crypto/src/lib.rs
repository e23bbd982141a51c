//! # harvest-crypto
//!
//! Hashing primitives for the Harvest reward protocol.
//!
//! Every Merkle root consumed by the claim engine is built from
//! domain-separated BLAKE3. No algorithm negotiation is permitted — the
//! hashing suite is fixed, and off-chain snapshot generators must mirror
//! it byte for byte.
//!
//! ## Modules
//!
//! - [`blake3`] — Domain-separated BLAKE3 hashing (leaf/inner node modes)
//! - [`merkle`] — Inclusion-proof verification and mirrored tree construction

pub mod blake3;
pub mod merkle;
