//! Credential sources: how the typed password becomes the password that
//! actually unlocks the vault.
//!
//! Most vaults use the password as typed ([`Identity`]).  Vaults protected
//! by a challenge-response token use the hex-encoded HMAC-SHA1 response to
//! the password instead ([`TokenCredential`]).  Talking to real hardware is
//! left to implementors of [`ChallengeResponse`]; [`EmulatedToken`] computes
//! the same responses in software.

use std::collections::HashMap;

use zeroize::Zeroize;

use crate::crypto::challenge::{yubi_hmac_sha1, CREDENTIAL_LEN, MAX_CHALLENGE_LEN, RESPONSE_LEN};
use crate::errors::{NotpassError, Result};

/// Turns a typed password into the effective vault password.
pub trait CredentialSource {
    fn effective_password(&mut self, password: &str) -> Result<String>;
}

/// Uses the password unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl CredentialSource for Identity {
    fn effective_password(&mut self, password: &str) -> Result<String> {
        Ok(password.to_string())
    }
}

/// A device that answers HMAC-SHA1 challenges from a numbered slot.
pub trait ChallengeResponse {
    fn challenge_response_hmac_sha1(
        &mut self,
        slot: u8,
        challenge: &[u8],
    ) -> Result<[u8; RESPONSE_LEN]>;
}

/// Derives the effective password through a challenge-response token.
#[derive(Debug)]
pub struct TokenCredential<T> {
    token: T,
    slot: u8,
}

impl<T: ChallengeResponse> TokenCredential<T> {
    pub fn new(token: T, slot: u8) -> Self {
        Self { token, slot }
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn into_inner(self) -> T {
        self.token
    }
}

impl<T: ChallengeResponse> CredentialSource for TokenCredential<T> {
    fn effective_password(&mut self, password: &str) -> Result<String> {
        let mut challenge = encode_challenge(password);
        let response = self.token.challenge_response_hmac_sha1(self.slot, &challenge);
        challenge.zeroize();

        let mut response = response?;
        let effective = hex::encode(response);
        response.zeroize();
        Ok(effective)
    }
}

/// UTF-16LE bytes of `password`, cut to the longest challenge a token takes.
pub fn encode_challenge(password: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = password.encode_utf16().flat_map(u16::to_le_bytes).collect();
    bytes.truncate(MAX_CHALLENGE_LEN);
    bytes
}

/// Software stand-in for a hardware token.
#[derive(Default)]
pub struct EmulatedToken {
    slots: HashMap<u8, [u8; CREDENTIAL_LEN]>,
}

impl EmulatedToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program `slot` with a 20-byte HMAC-SHA1 secret.
    pub fn with_slot(mut self, slot: u8, secret: &[u8]) -> Result<Self> {
        let secret: [u8; CREDENTIAL_LEN] = secret.try_into().map_err(|_| {
            NotpassError::TokenError(format!(
                "slot secret must be {CREDENTIAL_LEN} bytes, got {}",
                secret.len()
            ))
        })?;
        if let Some(mut old) = self.slots.insert(slot, secret) {
            old.zeroize();
        }
        Ok(self)
    }
}

impl ChallengeResponse for EmulatedToken {
    fn challenge_response_hmac_sha1(
        &mut self,
        slot: u8,
        challenge: &[u8],
    ) -> Result<[u8; RESPONSE_LEN]> {
        let secret = self
            .slots
            .get(&slot)
            .ok_or_else(|| NotpassError::TokenError(format!("slot {slot} is not configured")))?;
        yubi_hmac_sha1(secret, challenge)
    }
}

impl Drop for EmulatedToken {
    fn drop(&mut self) {
        for secret in self.slots.values_mut() {
            secret.zeroize();
        }
    }
}

impl std::fmt::Debug for EmulatedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut slots: Vec<_> = self.slots.keys().collect();
        slots.sort();
        f.debug_struct("EmulatedToken").field("slots", &slots).finish()
    }
}
