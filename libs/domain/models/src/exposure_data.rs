// [libs/domain/models/src/exposure_data.rs]
/*!
 * =================================================================
 * APARATO: EXPOSURE PAYLOAD ENTITIES (V4.1 - ENVELOPE HARDENED)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: VALIDACIÓN DE CARGA ÚTIL DEL SERVICIO DE INGESTA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. UPSTREAM CONTRACT: Los registros los produce un servicio externo;
 *    aquí sólo se valida forma y versión (únicamente versión 1).
 * 2. ENVELOPE GOVERNANCE: El sobre {version, payload} se verifica antes
 *    de intentar decodificar el payload interno.
 * =================================================================
 */

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{Province, TransmissionRiskLevel};

/// Versión de sobre aceptada por el pipeline de drenaje.
const SUPPORTED_ENVELOPE_VERSION: i64 = 1;

#[derive(Error, Debug)]
pub enum PayloadFormatError {
    #[error("ENVELOPE_DECODE_FAULT: element is not valid JSON: {0}")]
    UndecodableElement(#[from] serde_json::Error),

    #[error("ENVELOPE_VERSION_FAULT: unsupported or missing version")]
    UnsupportedVersion,

    #[error("ENVELOPE_PAYLOAD_FAULT: payload is missing or null")]
    MissingPayload,
}

/// Contacto individual estimado por el framework de exposición.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureInfo {
    pub date: NaiveDate,
    pub duration: i64,
    pub attenuation_value: i64,
    pub attenuation_durations: Vec<i64>,
    pub transmission_risk_level: TransmissionRiskLevel,
    pub total_risk_score: i64,
}

/// Resumen diario de detección producido por el cliente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureDetectionSummary {
    pub date: NaiveDate,
    pub matched_key_count: i64,
    pub days_since_last_exposure: i64,
    pub attenuation_durations: Vec<i64>,
    pub maximum_risk_score: i64,
    #[serde(default)]
    pub exposure_info: Vec<ExposureInfo>,
}

/// Carga útil completa reenviada por el servicio de ingesta upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposurePayload {
    pub province: Province,
    // NOTE: opcional para aceptar datos reenviados por la primera
    // versión del servicio de ingesta, que no incluía el campo.
    #[serde(default)]
    pub symptoms_started_on: Option<NaiveDate>,
    pub exposure_detection_summaries: Vec<ExposureDetectionSummary>,
}

/// Sobre de versionado con el que viajan los elementos en la cola.
#[derive(Debug, Deserialize)]
struct IngestionEnvelope {
    #[serde(default)]
    version: Option<i64>,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl ExposurePayload {
    /**
     * Decodifica y valida un elemento crudo de la cola de ingesta.
     *
     * # Errors:
     * Cualquier desviación estructural del sobre o del payload produce
     * `PayloadFormatError`; el llamador desvía el elemento crudo a la
     * cola de errores.
     */
    pub fn from_queue_element(raw_element: &str) -> Result<Self, PayloadFormatError> {
        let envelope: IngestionEnvelope = serde_json::from_str(raw_element)?;

        if envelope.version != Some(SUPPORTED_ENVELOPE_VERSION) {
            return Err(PayloadFormatError::UnsupportedVersion);
        }

        let payload_value = match envelope.payload {
            Some(value) if !value.is_null() => value,
            _ => return Err(PayloadFormatError::MissingPayload),
        };

        Ok(serde_json::from_value(payload_value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_envelope() -> String {
        r#"{
            "version": 1,
            "payload": {
                "province": "BG",
                "symptoms_started_on": "2026-03-02",
                "exposure_detection_summaries": [{
                    "date": "2026-03-01",
                    "matched_key_count": 2,
                    "days_since_last_exposure": 1,
                    "attenuation_durations": [300, 0, 0],
                    "maximum_risk_score": 4,
                    "exposure_info": [{
                        "date": "2026-03-01",
                        "duration": 5,
                        "attenuation_value": 45,
                        "attenuation_durations": [300, 0, 0],
                        "transmission_risk_level": 5,
                        "total_risk_score": 4
                    }]
                }]
            }
        }"#
        .to_string()
    }

    #[test]
    fn certify_envelope_acceptance() {
        let payload = ExposurePayload::from_queue_element(&valid_envelope()).unwrap();
        assert_eq!(payload.province.as_str(), "BG");
        assert_eq!(payload.exposure_detection_summaries.len(), 1);
        assert_eq!(
            payload.exposure_detection_summaries[0].exposure_info[0]
                .transmission_risk_level
                .level(),
            5
        );
    }

    #[test]
    fn certify_envelope_rejection_matrix() {
        // Versión desconocida
        let wrong_version = valid_envelope().replace("\"version\": 1", "\"version\": 2");
        assert!(matches!(
            ExposurePayload::from_queue_element(&wrong_version),
            Err(PayloadFormatError::UnsupportedVersion)
        ));

        // Sobre sin versión
        assert!(matches!(
            ExposurePayload::from_queue_element(r#"{"payload": {}}"#),
            Err(PayloadFormatError::UnsupportedVersion)
        ));

        // Payload nulo
        assert!(matches!(
            ExposurePayload::from_queue_element(r#"{"version": 1, "payload": null}"#),
            Err(PayloadFormatError::MissingPayload)
        ));

        // No-JSON
        assert!(matches!(
            ExposurePayload::from_queue_element("not-json-at-all"),
            Err(PayloadFormatError::UndecodableElement(_))
        ));

        // Provincia fuera de catálogo dentro del payload
        let wrong_province = valid_envelope().replace("\"BG\"", "\"QQ\"");
        assert!(matches!(
            ExposurePayload::from_queue_element(&wrong_province),
            Err(PayloadFormatError::UndecodableElement(_))
        ));
    }

    #[test]
    fn certify_summaries_default_and_optional_fields() {
        let minimal = r#"{
            "version": 1,
            "payload": {
                "province": "VE",
                "exposure_detection_summaries": []
            }
        }"#;
        let payload = ExposurePayload::from_queue_element(minimal).unwrap();
        assert_eq!(payload.symptoms_started_on, None);
        assert!(payload.exposure_detection_summaries.is_empty());
    }
}
// FIN DEL ARCHIVO [libs/domain/models/src/exposure_data.rs]
