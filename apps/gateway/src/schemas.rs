// [apps/gateway/src/schemas.rs]
/*!
 * =================================================================
 * APARATO: REQUEST SCHEMA STRATA (V4.2 - ORACLE SEALED)
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: VALIDACIÓN DE CUERPOS, CABECERAS Y TOKENS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. INTEGER-BOOL WIRE: Las banderas viajan como enteros 0/1; todo
 *    otro valor es violación de esquema.
 * 2. ORACLE DENIAL: Ninguna respuesta distingue autorización fallida
 *    de éxito; el único 4xx observable es la violación de esquema con
 *    cuerpo constante.
 * =================================================================
 */

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::warn;

use sentinel_domain_models::Province;
use sentinel_infra_coordination::CoordinationError;
use sentinel_shared_config::SentinelConfig;

/// Cuerpo constante de toda violación de esquema.
const SCHEMA_VIOLATION_MESSAGE: &str = "Request not compliant with the defined schema.";

/// Año mínimo aceptado en fechas ISO de la superficie pública.
const MINIMUM_ACCEPTED_YEAR: i32 = 2020;

#[derive(Debug)]
pub enum ApiError {
    SchemaViolation,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::SchemaViolation => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": SCHEMA_VIOLATION_MESSAGE })),
            )
                .into_response(),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal Server Error." })),
            )
                .into_response(),
        }
    }
}

impl From<CoordinationError> for ApiError {
    fn from(store_fault: CoordinationError) -> Self {
        warn!(error = %store_fault, "💥 [GATEWAY]: Coordination store fault surfaced to handler.");
        ApiError::Internal
    }
}

impl From<JsonRejection> for ApiError {
    fn from(_rejection: JsonRejection) -> Self {
        ApiError::SchemaViolation
    }
}

/// Bandera entera del protocolo: exactamente 0 o 1.
fn deserialize_integer_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match i64::deserialize(deserializer)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "integer-bool out of range: {other}"
        ))),
    }
}

/// Fecha ISO opcional con año dentro de la era del servicio.
fn deserialize_bounded_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let Some(date) = Option::<NaiveDate>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if date.year() < MINIMUM_ACCEPTED_YEAR {
        return Err(serde::de::Error::custom("date precedes the service era"));
    }
    Ok(Some(date))
}

/// Campos comunes de una subida de operational info.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationalInfoBody {
    pub province: Province,
    #[serde(deserialize_with = "deserialize_integer_bool")]
    pub exposure_permission: bool,
    #[serde(deserialize_with = "deserialize_integer_bool")]
    pub bluetooth_active: bool,
    #[serde(deserialize_with = "deserialize_integer_bool")]
    pub notification_permission: bool,
    #[serde(deserialize_with = "deserialize_integer_bool")]
    pub exposure_notification: bool,
    #[serde(default, deserialize_with = "deserialize_bounded_date")]
    pub last_risky_exposure_on: Option<NaiveDate>,
}

impl OperationalInfoBody {
    /// Fragmento ISO que entra al nonce: el valor crudo del cuerpo,
    /// cadena vacía si ausente. El cliente codifica idéntico.
    pub fn last_risky_exposure_on_iso(&self) -> String {
        self.last_risky_exposure_on
            .map(|date| date.to_string())
            .unwrap_or_default()
    }
}

/// Cuerpo de la subida Android: operational info + material SafetyNet.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleOperationalInfoBody {
    #[serde(flatten)]
    pub operational_info: OperationalInfoBody,
    pub salt: String,
    pub signed_attestation: String,
}

impl GoogleOperationalInfoBody {
    /**
     * Valida el material de atestación contra los límites del entorno:
     * salt base64 de longitud codificada exacta y atestación acotada.
     */
    pub fn validate(&self, config: &SentinelConfig) -> Result<(), ApiError> {
        if self.salt.len() != config.salt_length {
            return Err(ApiError::SchemaViolation);
        }
        if BASE64_STANDARD.decode(&self.salt).is_err() {
            return Err(ApiError::SchemaViolation);
        }
        if self.signed_attestation.is_empty()
            || self.signed_attestation.len() > config.signed_attestation_max_length
        {
            return Err(ApiError::SchemaViolation);
        }
        Ok(())
    }
}

/// Cuerpo de la petición de autorización de analytics token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationBody {
    pub analytics_token: String,
    pub device_token: String,
}

impl AuthorizationBody {
    pub fn validate(&self, config: &SentinelConfig) -> Result<(), ApiError> {
        validate_analytics_token(&self.analytics_token, config.analytics_token_size)?;

        if self.device_token.is_empty()
            || self.device_token.len() > config.device_token_max_length
            || BASE64_STANDARD.decode(&self.device_token).is_err()
        {
            return Err(ApiError::SchemaViolation);
        }
        Ok(())
    }
}

/// El analytics token es hexadecimal minúsculo de longitud exacta.
pub fn validate_analytics_token(token: &str, expected_size: usize) -> Result<(), ApiError> {
    let well_formed = token.len() == expected_size
        && token
            .chars()
            .all(|character| character.is_ascii_hexdigit() && !character.is_ascii_uppercase());

    well_formed.then_some(()).ok_or(ApiError::SchemaViolation)
}

/// Extrae y valida el analytics token de la cabecera Authorization.
pub fn analytics_token_from_bearer(
    headers: &axum::http::HeaderMap,
    expected_size: usize,
) -> Result<String, ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::SchemaViolation)?;

    validate_analytics_token(token, expected_size)?;
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certify_integer_bool_wire_strictness() {
        let valid: OperationalInfoBody = serde_json::from_str(
            r#"{"province":"RM","exposure_permission":1,"bluetooth_active":0,
                "notification_permission":1,"exposure_notification":0}"#,
        )
        .unwrap();
        assert!(valid.exposure_permission);
        assert!(!valid.bluetooth_active);

        // Booleanos nativos y enteros fuera de rango violan el esquema.
        assert!(serde_json::from_str::<OperationalInfoBody>(
            r#"{"province":"RM","exposure_permission":true,"bluetooth_active":0,
                "notification_permission":1,"exposure_notification":0}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<OperationalInfoBody>(
            r#"{"province":"RM","exposure_permission":2,"bluetooth_active":0,
                "notification_permission":1,"exposure_notification":0}"#,
        )
        .is_err());
    }

    #[test]
    fn certify_service_era_date_bound() {
        assert!(serde_json::from_str::<OperationalInfoBody>(
            r#"{"province":"RM","exposure_permission":1,"bluetooth_active":1,
                "notification_permission":1,"exposure_notification":1,
                "last_risky_exposure_on":"2019-12-31"}"#,
        )
        .is_err());

        let accepted: OperationalInfoBody = serde_json::from_str(
            r#"{"province":"RM","exposure_permission":1,"bluetooth_active":1,
                "notification_permission":1,"exposure_notification":1,
                "last_risky_exposure_on":"2020-01-01"}"#,
        )
        .unwrap();
        assert_eq!(accepted.last_risky_exposure_on_iso(), "2020-01-01");
    }

    #[test]
    fn certify_analytics_token_shape() {
        assert!(validate_analytics_token(&"a".repeat(128), 128).is_ok());
        assert!(validate_analytics_token(&"0".repeat(128), 128).is_ok());

        assert!(validate_analytics_token(&"a".repeat(127), 128).is_err());
        assert!(validate_analytics_token(&"A".repeat(128), 128).is_err());
        assert!(validate_analytics_token(&"g".repeat(128), 128).is_err());
    }
}
// FIN DEL ARCHIVO [apps/gateway/src/schemas.rs]
