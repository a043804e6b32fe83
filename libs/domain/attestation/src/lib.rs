// [libs/domain/attestation/src/lib.rs]

pub mod errors;
pub mod jws;
pub mod nonce;
pub mod verifier;

pub use errors::AttestationError;
pub use jws::DecodedJws;
pub use nonce::generate_nonce;
pub use verifier::{AttestationVerifier, SafetyNetSettings};
// FIN DEL ARCHIVO [libs/domain/attestation/src/lib.rs]
