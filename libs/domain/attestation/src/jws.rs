// [libs/domain/attestation/src/jws.rs]
/*!
 * =================================================================
 * APARATO: JWS STRUCTURAL DECODER (V4.1)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: DESCOMPOSICIÓN BASE64-URL DEL TOKEN SAFETYNET
 * =================================================================
 */

use base64::engine::general_purpose::URL_SAFE as BASE64_URL;
use base64::Engine;
use tracing::warn;

use crate::errors::AttestationError;

/// Token JWS descompuesto: cabecera y payload como JSON, firma cruda.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedJws {
    pub header: serde_json::Value,
    pub payload: serde_json::Value,
    pub signature: String,
}

/**
 * Divide el token en sus tres partes y decodifica cabecera y payload.
 *
 * # Errors:
 * - `AttestationError::MalformedJws`: aridad incorrecta, base64
 *   corrupto, UTF-8 inválido o JSON indecodificable.
 */
pub fn decode_jws(jws_token: &str) -> Result<DecodedJws, AttestationError> {
    let parts: Vec<&str> = jws_token.split('.').collect();

    let [header_part, payload_part, signature_part] = parts.as_slice() else {
        warn!(
            jws_parts = parts.len(),
            "⚠️ [SAFETYNET]: Could not decode jws token. Unexpected number of parts."
        );
        return Err(AttestationError::MalformedJws);
    };

    Ok(DecodedJws {
        header: parse_jws_part(header_part)?,
        payload: parse_jws_part(payload_part)?,
        signature: (*signature_part).to_string(),
    })
}

/// Decodifica una parte base64-url restaurando el padding PKCS:
/// `'=' × ((4 − len mod 4) mod 4)`.
fn parse_jws_part(jws_part: &str) -> Result<serde_json::Value, AttestationError> {
    let padding_length = (4 - jws_part.len() % 4) % 4;
    let padded_jws_part = format!("{jws_part}{}", "=".repeat(padding_length));

    let decoded_bytes = BASE64_URL.decode(padded_jws_part).map_err(|decode_fault| {
        warn!(error = %decode_fault, "⚠️ [SAFETYNET]: Could not decode jws token part.");
        AttestationError::MalformedJws
    })?;

    serde_json::from_slice(&decoded_bytes).map_err(|json_fault| {
        warn!(error = %json_fault, "⚠️ [SAFETYNET]: Could not decode jws token part.");
        AttestationError::MalformedJws
    })
}

// FIN DEL ARCHIVO [libs/domain/attestation/src/jws.rs]
