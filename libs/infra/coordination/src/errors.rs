// [libs/infra/coordination/src/errors.rs]
//! =================================================================
//! APARATO: COORDINATION STORE ERRORS (V4.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DEL ALMACÉN VOLÁTIL
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoordinationError {
    #[error("COORDINATION_LINK_FAULT: store unreachable or protocol failure: {0}")]
    StoreFault(#[from] redis::RedisError),

    #[error("ENVELOPE_SERIALIZATION_FAULT: failed to encode queue element: {0}")]
    SerializationFault(#[from] serde_json::Error),
}
// FIN DEL ARCHIVO [libs/infra/coordination/src/errors.rs]
