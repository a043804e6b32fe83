// [apps/gateway/src/handlers/analytics.rs]
/*!
 * =================================================================
 * APARATO: ANALYTICS SURFACE HANDLERS (V4.3 - ORACLE SEALED)
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: SUBIDAS DE OPERATIONAL INFO Y AUTORIZACIÓN DE TOKENS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SILENT QUOTA: Un cupo ya consumido responde el mismo 204 que una
 *    subida admitida; el atacante no obtiene oráculo alguno.
 * 2. ASYNC AUTHORITY: La autorización iOS y la verificación Android
 *    se despachan al broker; la respuesta HTTP jamás espera a Apple
 *    ni a la criptografía de atestación.
 * 3. FAST-PATH SALT: El handler Android consulta el registro de salts
 *    sólo como atajo; la exclusión autoritativa vive en el worker
 *    tras la verificación, bajo set-if-absent atómico.
 * =================================================================
 */

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::{info, instrument, warn};

use sentinel_domain_models::{OperationalInfo, Platform};
use sentinel_infra_coordination::{AndroidVerificationJob, IosAuthorizationJob};
use sentinel_shared_watchtower::metrics::OPERATIONAL_INFO_ANDROID_REUSED_SALT;

use crate::schemas::{
    analytics_token_from_bearer, ApiError, AuthorizationBody, GoogleOperationalInfoBody,
    OperationalInfoBody,
};
use crate::state::AppState;

/**
 * Endpoint: POST /v1/analytics/apple/operational-info
 *
 * Consume el cupo mensual del analytics token y, sólo si el cupo
 * seguía disponible, encola el registro. Responde 204 en ambos casos.
 */
#[instrument(skip_all)]
pub async fn post_apple_operational_info(
    State(application_state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<OperationalInfoBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;
    let analytics_token =
        analytics_token_from_bearer(&headers, application_state.config.analytics_token_size)?;

    let operational_info = OperationalInfo::new(
        Platform::Ios,
        body.province,
        body.exposure_permission,
        body.bluetooth_active,
        body.notification_permission,
        body.exposure_notification,
        body.last_risky_exposure_on,
    );

    let quota_was_available = application_state
        .quota_ledger
        .consume(&analytics_token, operational_info.exposure_notification)
        .await?;

    if quota_was_available {
        application_state
            .ingestion_queues
            .enqueue_operational_info(&operational_info)
            .await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/**
 * Endpoint: POST /v1/analytics/google/operational-info
 *
 * Valida el material SafetyNet en forma, descarta salts ya vistos por
 * el camino rápido y despacha la verificación criptográfica al broker.
 * Responde 204 siempre.
 */
#[instrument(skip_all)]
pub async fn post_google_operational_info(
    State(application_state): State<AppState>,
    payload: Result<Json<GoogleOperationalInfoBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;
    body.validate(&application_state.config)?;

    if application_state
        .used_salt_registry
        .is_salt_known(&body.salt)
        .await?
    {
        warn!("♻️ [ANALYTICS]: Found previously used salt.");
        OPERATIONAL_INFO_ANDROID_REUSED_SALT
            .with_label_values(&["false"])
            .inc();
        return Ok(StatusCode::NO_CONTENT);
    }

    let operational_info = OperationalInfo::new(
        Platform::Android,
        body.operational_info.province,
        body.operational_info.exposure_permission,
        body.operational_info.bluetooth_active,
        body.operational_info.notification_permission,
        body.operational_info.exposure_notification,
        body.operational_info.last_risky_exposure_on,
    );

    application_state
        .task_broker
        .dispatch_android_verification(&AndroidVerificationJob {
            signed_attestation: body.signed_attestation.clone(),
            salt: body.salt.clone(),
            operational_info,
            last_risky_exposure_on: body.operational_info.last_risky_exposure_on_iso(),
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/**
 * Endpoint: POST /v1/analytics/apple/token
 *
 * 201 si el token ya posee cupo vigente; 202 si la autorización quedó
 * programada contra DeviceCheck.
 */
#[instrument(skip_all)]
pub async fn post_authorize_token(
    State(application_state): State<AppState>,
    payload: Result<Json<AuthorizationBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;
    body.validate(&application_state.config)?;

    if application_state
        .quota_ledger
        .is_authorized(&body.analytics_token)
        .await?
    {
        return Ok(StatusCode::CREATED);
    }

    application_state
        .task_broker
        .dispatch_ios_authorization(&IosAuthorizationJob {
            analytics_token: body.analytics_token.clone(),
            device_token: body.device_token.clone(),
        })
        .await?;

    info!("🛂 [ANALYTICS]: Analytics token authorization scheduled.");
    Ok(StatusCode::ACCEPTED)
}
// FIN DEL ARCHIVO [apps/gateway/src/handlers/analytics.rs]
