// [libs/infra/devicecheck/src/errors.rs]
//! =================================================================
//! APARATO: DEVICECHECK ERRORS (V3.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DEL TÚNEL APPLE
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceCheckError {
    #[error("DEVICECHECK_BAD_FORMAT: the API rejected the request with a 4xx status")]
    BadFormat,

    #[error("DEVICECHECK_UNAVAILABLE: the API answered 5xx on every attempt")]
    ServerUnavailable,

    #[error("DEVICECHECK_TRANSPORT_FAULT: network failure on every attempt: {0}")]
    TransportFault(#[from] reqwest::Error),

    #[error("DEVICECHECK_RESPONSE_FAULT: unparseable bit state payload: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("DEVICECHECK_SIGNING_FAULT: could not mint the application JWT: {0}")]
    SigningFault(#[from] jsonwebtoken::errors::Error),
}
// FIN DEL ARCHIVO [libs/infra/devicecheck/src/errors.rs]
