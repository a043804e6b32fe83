// [libs/domain/attestation/src/errors.rs]
//! =================================================================
//! APARATO: ATTESTATION ERRORS (V4.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE VERIFICACIÓN
//! =================================================================

use thiserror::Error;

/// El detalle de cada fallo queda en el rastro de logs; hacia afuera
/// la verificación es deliberadamente opaca: el cliente ya recibió su
/// 204 y ningún estado observable distingue el motivo del rechazo.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AttestationError {
    #[error("MALFORMED_JWS: token structure or encoding is invalid")]
    MalformedJws,

    #[error("ATTESTATION_REJECTED: one of the verification steps failed")]
    VerificationFailed,
}
// FIN DEL ARCHIVO [libs/domain/attestation/src/errors.rs]
