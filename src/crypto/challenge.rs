//! HMAC-SHA1 challenge-response as computed by a YubiKey slot.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::errors::{NotpassError, Result};

/// Secret length of an HMAC-SHA1 challenge-response slot.
pub const CREDENTIAL_LEN: usize = 20;

/// Largest challenge a token accepts.
pub const MAX_CHALLENGE_LEN: usize = 64;

/// Length of the HMAC-SHA1 response.
pub const RESPONSE_LEN: usize = 20;

/// Compute the response a token holding `credential` gives for `challenge`.
///
/// Tokens treat a full 64-byte challenge as padded with its last byte value,
/// and a shorter challenge as padded with trailing zeros.  That trailing run
/// is stripped before hashing.
pub fn yubi_hmac_sha1(credential: &[u8], challenge: &[u8]) -> Result<[u8; RESPONSE_LEN]> {
    if credential.len() != CREDENTIAL_LEN {
        return Err(NotpassError::TokenError(format!(
            "expected credential to be exactly {CREDENTIAL_LEN} bytes"
        )));
    }
    if challenge.len() > MAX_CHALLENGE_LEN {
        return Err(NotpassError::TokenError(format!(
            "expected challenge to be no more than {MAX_CHALLENGE_LEN} bytes"
        )));
    }

    let challenge = strip_padding(challenge);

    let mut mac = Hmac::<Sha1>::new_from_slice(credential)
        .map_err(|e| NotpassError::TokenError(format!("invalid HMAC key: {e}")))?;
    mac.update(challenge);

    Ok(mac.finalize().into_bytes().into())
}

fn strip_padding(challenge: &[u8]) -> &[u8] {
    let Some(&last) = challenge.last() else {
        return challenge;
    };
    if challenge.len() != MAX_CHALLENGE_LEN && last != 0 {
        return challenge;
    }

    let keep = challenge
        .iter()
        .rposition(|&b| b != last)
        .map_or(0, |i| i + 1);
    &challenge[..keep]
}
