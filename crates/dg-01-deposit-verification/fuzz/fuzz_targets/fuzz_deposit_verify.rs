//! Fuzz target for deposit signature verification.
//!
//! Arbitrary key and signature bytes must never panic and must never verify
//! differently twice.

#![no_main]

use dg_01_deposit_verification::{DepositMessage, DepositSignatureVerifier};
use libfuzzer_sys::fuzz_target;
use shared_types::{BlsPublicKey, BlsSignature, Bytes32};

#[derive(Debug, arbitrary::Arbitrary)]
struct DepositFuzzInput {
    pubkey_bytes: [u8; 48],
    signature_bytes: [u8; 96],
    withdrawal_credentials: [u8; 32],
    amount: u64,
}

fuzz_target!(|input: DepositFuzzInput| {
    let verifier = DepositSignatureVerifier::new([0, 0, 0, 0]);
    let message = DepositMessage {
        pubkey: BlsPublicKey(input.pubkey_bytes),
        withdrawal_credentials: Bytes32(input.withdrawal_credentials),
        amount: input.amount,
    };
    let signature = BlsSignature(input.signature_bytes);

    let first = verifier.verify(&message, &signature);
    let second = verifier.verify(&message, &signature);
    assert_eq!(first, second);
});
