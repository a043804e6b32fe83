// [libs/infra/devicecheck/src/client.rs]
/*!
 * =================================================================
 * APARATO: APPLE DEVICECHECK UPLINK (V3.3 - RETRY BOUNDED)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: LECTURA/ESCRITURA AUTENTICADA DE LOS DOS BITS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SIGNED SESSIONS: Cada llamada viaja con un JWT ES256 recién
 *    acuñado (iss = team, kid = clave de firma) y un transaction_id
 *    UUIDv4 irrepetible.
 * 2. BOUNDED RETRY: Tres intentos con espera exponencial de
 *    multiplicador 1 acotada en [2, 10] segundos; los 4xx no se
 *    reintentan jamás.
 * 3. GATEWAY SEAM: El trait 'DeviceCheckGateway' permite guionizar
 *    las respuestas de Apple en el proving grounds del protocolo.
 * =================================================================
 */

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;
use tracing::{instrument, warn};
use uuid::Uuid;

use sentinel_domain_models::DeviceCheckProbe;

use crate::errors::DeviceCheckError;

const QUERY_TWO_BITS_PATH: &str = "/query_two_bits";
const UPDATE_TWO_BITS_PATH: &str = "/update_two_bits";

/// Cuerpo literal con el que Apple señala bits jamás escritos.
const MISSING_BIT_STATE_BODY: &str = "Failed to find bit state";

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_MULTIPLIER_SECONDS: u64 = 1;
const BACKOFF_MIN_SECONDS: u64 = 2;
const BACKOFF_MAX_SECONDS: u64 = 10;

/// Puerta de acceso al estado de bits per-device.
#[async_trait]
pub trait DeviceCheckGateway: Send + Sync {
    async fn fetch_bits(&self, device_token: &str) -> Result<DeviceCheckProbe, DeviceCheckError>;

    async fn set_bits(
        &self,
        device_token: &str,
        bit0: bool,
        bit1: bool,
    ) -> Result<(), DeviceCheckError>;
}

#[derive(Serialize)]
struct DeviceCheckClaims {
    iss: String,
    iat: i64,
}

pub struct AppleDeviceCheckClient {
    network_session_client: reqwest::Client,
    device_check_base_endpoint: String,
    apple_team_identifier: String,
    apple_key_identifier: String,
    signing_key: EncodingKey,
}

impl AppleDeviceCheckClient {
    /**
     * Inicializa el cliente con la clave de firma ya decodificada.
     *
     * # Errors:
     * - `DeviceCheckError::SigningFault`: PEM corrupto o no-EC.
     */
    pub fn new(
        device_check_url: String,
        apple_team_identifier: String,
        apple_key_identifier: String,
        apple_certificate_key_pem: &str,
        requests_timeout_seconds: u64,
    ) -> Result<Self, DeviceCheckError> {
        let signing_key = EncodingKey::from_ec_pem(apple_certificate_key_pem.as_bytes())?;

        Ok(Self {
            network_session_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(requests_timeout_seconds))
                .build()
                .expect("FATAL: DeviceCheck client initialization failed."),
            device_check_base_endpoint: device_check_url.trim_end_matches('/').to_string(),
            apple_team_identifier,
            apple_key_identifier,
            signing_key,
        })
    }

    /// Acuña el JWT de autorización para una llamada DeviceCheck.
    fn generate_device_check_jwt(&self) -> Result<String, DeviceCheckError> {
        let mut jwt_header = Header::new(Algorithm::ES256);
        jwt_header.kid = Some(self.apple_key_identifier.clone());

        let claims = DeviceCheckClaims {
            iss: self.apple_team_identifier.clone(),
            iat: Utc::now().timestamp(),
        };

        Ok(encode(&jwt_header, &claims, &self.signing_key)?)
    }

    /// Fragmento común del cuerpo: transacción irrepetible y marca
    /// temporal en milisegundos.
    fn generate_common_payload() -> serde_json::Value {
        json!({
            "transaction_id": Uuid::new_v4().to_string(),
            "timestamp": Utc::now().timestamp_millis(),
        })
    }

    async fn execute_post(
        &self,
        target_url: &str,
        authorization_jwt: &str,
        request_body: &serde_json::Value,
    ) -> Result<String, DeviceCheckError> {
        let network_response = self
            .network_session_client
            .post(target_url)
            .bearer_auth(authorization_jwt)
            .json(request_body)
            .send()
            .await?;

        let response_status = network_response.status();
        if response_status.is_server_error() {
            return Err(DeviceCheckError::ServerUnavailable);
        }
        if response_status.is_client_error() {
            return Err(DeviceCheckError::BadFormat);
        }

        Ok(network_response.text().await?)
    }

    /**
     * POST con política de reintento acotada. Los fallos de transporte
     * y los 5xx se reintentan; un 4xx aborta de inmediato.
     */
    #[instrument(skip(self, request_body))]
    async fn post_with_retry(
        &self,
        target_url: &str,
        request_body: serde_json::Value,
    ) -> Result<String, DeviceCheckError> {
        let authorization_jwt = self.generate_device_check_jwt()?;
        let mut attempt_number: u32 = 0;

        loop {
            attempt_number += 1;

            match self
                .execute_post(target_url, &authorization_jwt, &request_body)
                .await
            {
                Ok(response_body) => return Ok(response_body),
                Err(DeviceCheckError::BadFormat) => {
                    warn!(url = target_url, "⛔ [DEVICECHECK]: The API returned a 4xx error.");
                    return Err(DeviceCheckError::BadFormat);
                }
                Err(retryable_fault) => {
                    if attempt_number >= MAX_ATTEMPTS {
                        warn!(
                            url = target_url,
                            attempts = attempt_number,
                            "⛔ [DEVICECHECK]: The API is not available."
                        );
                        return Err(retryable_fault);
                    }

                    let wait_seconds = (BACKOFF_MULTIPLIER_SECONDS << (attempt_number - 1))
                        .clamp(BACKOFF_MIN_SECONDS, BACKOFF_MAX_SECONDS);
                    warn!(
                        url = target_url,
                        attempt = attempt_number,
                        wait_seconds,
                        "🔁 [DEVICECHECK]: Failed HTTP request; retrying."
                    );
                    tokio::time::sleep(Duration::from_secs(wait_seconds)).await;
                }
            }
        }
    }
}

#[async_trait]
impl DeviceCheckGateway for AppleDeviceCheckClient {
    #[instrument(skip(self, device_token))]
    async fn fetch_bits(&self, device_token: &str) -> Result<DeviceCheckProbe, DeviceCheckError> {
        let target_url = format!("{}{}", self.device_check_base_endpoint, QUERY_TWO_BITS_PATH);

        let mut request_body = Self::generate_common_payload();
        request_body["device_token"] = json!(device_token);

        let response_body = self.post_with_retry(&target_url, request_body).await?;

        // Bits jamás escritos: la API responde 200 con texto plano en
        // lugar de JSON.
        if response_body == MISSING_BIT_STATE_BODY {
            return Ok(DeviceCheckProbe::pristine());
        }

        Ok(serde_json::from_str(&response_body)?)
    }

    #[instrument(skip(self, device_token))]
    async fn set_bits(
        &self,
        device_token: &str,
        bit0: bool,
        bit1: bool,
    ) -> Result<(), DeviceCheckError> {
        let target_url = format!("{}{}", self.device_check_base_endpoint, UPDATE_TWO_BITS_PATH);

        let mut request_body = Self::generate_common_payload();
        request_body["device_token"] = json!(device_token);
        request_body["bit0"] = json!(bit0);
        request_body["bit1"] = json!(bit1);

        self.post_with_retry(&target_url, request_body).await?;
        Ok(())
    }
}
// FIN DEL ARCHIVO [libs/infra/devicecheck/src/client.rs]
