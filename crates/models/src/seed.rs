use serde::{Deserialize, Serialize};

/// A provably-fair seed triple. Within one epoch, `nonce` is monotonically
/// non-decreasing and advances by exactly one per consumed bet; rotation
/// starts a fresh epoch at `nonce = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTriple {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
}

impl SeedTriple {
    pub fn new(server_seed: String, client_seed: String) -> Self {
        Self {
            server_seed,
            client_seed,
            nonce: 0,
        }
    }
}

/// What `get_current_info()` reveals: the server seed only as its SHA-256
/// commitment, never in the clear, until rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedInfo {
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
}

/// Returned by `rotate_seeds()`: the just-retired epoch, now safe to reveal
/// in full, and the fresh triple that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRotation {
    pub revealed_server_seed: String,
    pub revealed_client_seed: String,
    pub final_nonce: u64,
    pub new_server_seed_hash: String,
}

/// Result of `verify()` on a past [`crate::bet::BetResult`] given its
/// revealed server seed.
///
/// Per the stricter reading of the source's "Provably Fair verifier" (spec
/// Open Question c), `valid` requires *exact* decimal equality between
/// `expected` and `computed`, not the source's 0.01-tolerance comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub expected: rust_decimal::Decimal,
    pub computed: rust_decimal::Decimal,
    pub hmac_hex: String,
}
