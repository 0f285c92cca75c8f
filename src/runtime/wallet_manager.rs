//! Ephemeral wallet generation.
//!
//! Every job owns exactly one freshly generated key pair. Keys are never
//! persisted, never cloned, and the signing key is wiped when the job drops it.

use core::fmt;

use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::to_checksum;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{FaucetBotError, Result};

/// Single-use secp256k1 key pair.
pub struct EphemeralWallet {
    signer: LocalWallet,
}

impl EphemeralWallet {
    /// Draw 32 bytes from the OS entropy source and derive the wallet.
    ///
    /// Panics only if the OS entropy source itself fails.
    pub fn generate() -> Self {
        loop {
            let mut secret = Zeroizing::new([0u8; 32]);
            OsRng.fill_bytes(&mut secret[..]);
            // Zero or >= curve order: draw again (probability ~2^-128).
            if let Ok(wallet) = Self::from_secret(&secret) {
                return wallet;
            }
        }
    }

    /// Build a wallet from a raw 32-byte secret.
    pub fn from_secret(secret: &[u8; 32]) -> Result<Self> {
        let signer = LocalWallet::from_bytes(secret).map_err(|e| FaucetBotError::CryptoError {
            reason: format!("Invalid private key: {}", e),
        })?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// EIP-55 checksummed address.
    pub fn checksum_address(&self) -> String {
        to_checksum(&self.signer.address(), None)
    }

    /// Signer for transactions originating from this wallet.
    pub fn signer(&self) -> &LocalWallet {
        &self.signer
    }
}

impl fmt::Debug for EphemeralWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralWallet")
            .field("address", &self.checksum_address())
            .finish_non_exhaustive()
    }
}
