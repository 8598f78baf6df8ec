use diceforge_models::error::EngineError;
use diceforge_models::seed::{SeedInfo, SeedRotation, SeedTriple, VerifyOutcome};
use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// The house-edge threshold for a given payout multiplier: a 1% edge shaved
/// off the fair `100 / multiplier` win boundary.
pub fn threshold_for_multiplier(multiplier: f64) -> f64 {
    (100.0 / multiplier) * 0.99
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive a roll in `[0.00, 99.99]` from one HMAC-SHA512 digest.
///
/// The digest is walked as 5-hex-character (20-bit) windows; the first
/// window whose value is below `1_000_000` supplies the roll as
/// `value % 10_000 / 100`. A window is discarded, never reused, so the
/// distribution over the retained windows stays uniform. Exhausting every
/// window in the digest without a hit is cryptographically implausible
/// (expected probability under 1e-30 per nonce) and surfaces as
/// [`EngineError::OracleExhausted`] rather than panicking.
fn compute_roll(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
) -> Result<(Decimal, String), EngineError> {
    let message = format!("{client_seed},{nonce}");
    let mut mac = HmacSha512::new_from_slice(server_seed.as_bytes())
        .expect("HMAC-SHA512 accepts keys of any length");
    mac.update(message.as_bytes());
    let digest_hex = hex::encode(mac.finalize().into_bytes());

    for window in digest_hex.as_bytes().chunks_exact(5) {
        let window_str = std::str::from_utf8(window).expect("hex digest is ascii");
        let value = u32::from_str_radix(window_str, 16).expect("5 hex chars parse as u32");
        if value < 1_000_000 {
            let roll = Decimal::new(i64::from(value % 10_000), 2);
            return Ok((roll, digest_hex));
        }
    }
    Err(EngineError::OracleExhausted { nonce })
}

/// Stateful provably-fair roll generator for one session.
///
/// Holds its own [`ChaCha20Rng`], not a process-global one, so that two
/// oracles (e.g. two sessions in a parallel sweep) never contend on or
/// correlate through shared RNG state.
pub struct RollOracle {
    seed: SeedTriple,
    rng: ChaCha20Rng,
}

impl RollOracle {
    pub fn new(server_seed: String, client_seed: String) -> Self {
        Self {
            seed: SeedTriple::new(server_seed, client_seed),
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Construct with an explicit RNG, for deterministic tests and for
    /// reproducing a sweep's seed rotations from a recorded run seed.
    pub fn with_rng(server_seed: String, client_seed: String, rng: ChaCha20Rng) -> Self {
        Self {
            seed: SeedTriple::new(server_seed, client_seed),
            rng,
        }
    }

    pub fn generate_server_seed(rng: &mut impl RngCore) -> String {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    pub fn current_info(&self) -> SeedInfo {
        SeedInfo {
            server_seed_hash: sha256_hex(&self.seed.server_seed),
            client_seed: self.seed.client_seed.clone(),
            nonce: self.seed.nonce,
        }
    }

    /// Changing the client seed starts a fresh nonce sequence against the
    /// current server seed.
    pub fn set_client_seed(&mut self, client_seed: String) {
        self.seed.client_seed = client_seed;
        self.seed.nonce = 0;
    }

    /// Consume the current nonce, advance it, and return the roll plus the
    /// raw HMAC hex digest (kept for audit logs, not re-derived later).
    pub fn roll(&mut self) -> Result<(Decimal, u64, String), EngineError> {
        let nonce = self.seed.nonce;
        let (value, digest_hex) = compute_roll(&self.seed.server_seed, &self.seed.client_seed, nonce)?;
        self.seed.nonce += 1;
        Ok((value, nonce, digest_hex))
    }

    /// Retire the current epoch, revealing it in full, and begin a new one
    /// with a freshly generated server seed and the nonce reset to zero.
    /// The client seed carries over unchanged.
    pub fn rotate_seeds(&mut self) -> SeedRotation {
        let new_server_seed = Self::generate_server_seed(&mut self.rng);
        let revealed_server_seed = std::mem::replace(&mut self.seed.server_seed, new_server_seed);
        let revealed_client_seed = self.seed.client_seed.clone();
        let final_nonce = self.seed.nonce;
        self.seed.nonce = 0;
        SeedRotation {
            revealed_server_seed,
            revealed_client_seed,
            final_nonce,
            new_server_seed_hash: sha256_hex(&self.seed.server_seed),
        }
    }

    /// Recompute a past roll from its revealed server seed and compare it
    /// exactly against what was recorded at the time.
    pub fn verify(
        server_seed: &str,
        client_seed: &str,
        nonce: u64,
        expected: Decimal,
    ) -> Result<VerifyOutcome, EngineError> {
        let (computed, digest_hex) = compute_roll(server_seed, client_seed, nonce)?;
        Ok(VerifyOutcome {
            valid: computed == expected,
            expected,
            computed,
            hmac_hex: digest_hex,
        })
    }
}
