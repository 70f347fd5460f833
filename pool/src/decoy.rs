//! Decoy entry construction.

use rollcall_crypto::{encrypt_with_ephemeral_key, generate_nonce};
use rollcall_store::PoolEntry;
use rollcall_types::{QrPayload, SessionId, SessionParams, StudentId, Timestamp, PAYLOAD_VERSION};

/// Build one decoy pool entry for a session.
///
/// The plaintext is a real payload in every respect (fresh nonce, a round
/// picked uniformly from the session's range, a plausible student id) but
/// the encryption key is ephemeral and discarded, so the ciphertext is
/// permanently opaque. Nothing about the wire form distinguishes it from a
/// student's entry.
pub fn decoy_entry(session_id: &SessionId, params: &SessionParams, now: Timestamp) -> PoolEntry {
    let round = random_round(params.max_rounds);
    let payload = QrPayload {
        version: PAYLOAD_VERSION,
        session_id: session_id.clone(),
        student_id: StudentId::new(random_u64()),
        round,
        issued_at: now,
        nonce: generate_nonce(),
    };
    let envelope = encrypt_with_ephemeral_key(payload.to_json().as_bytes());

    PoolEntry {
        session_id: session_id.clone(),
        owner: None,
        ciphertext: envelope.to_string(),
        round,
    }
}

/// Uniform pick from `1..=max_rounds`; `max_rounds == 0` degenerates to 1.
fn random_round(max_rounds: u32) -> u32 {
    if max_rounds <= 1 {
        return 1;
    }
    1 + (random_u64() % u64::from(max_rounds)) as u32
}

fn random_u64() -> u64 {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).expect("OS random source unavailable");
    u64::from_le_bytes(buf)
}
