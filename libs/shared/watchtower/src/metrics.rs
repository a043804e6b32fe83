// [libs/shared/watchtower/src/metrics.rs]
/*!
 * =================================================================
 * APARATO: INGESTION METRIC STRATA (V7.1)
 * CLASIFICACIÓN: OBSERVABILITY (ESTRATO L6)
 * RESPONSABILIDAD: CONTADORES DE API, AUTORIZACIÓN Y DRENAJE
 * =================================================================
 */

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge_vec, IntCounter,
    IntCounterVec, IntGaugeVec,
};

// NOTE: Para monitorear las subidas, distinguir dummy y provincia es
// relevante; la latencia global de requests no basta. Se añaden
// métricas dedicadas en lugar de etiquetar todo el tráfico.

/// Peticiones de operational info respondidas, por dummy/plataforma/estado.
pub static OPERATIONAL_INFO_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sentinel_api_operational_info_requests",
        "Number of operational info requests the server responded to.",
        &["dummy", "platform", "http_status"]
    )
    .expect("METRIC_REGISTRATION_FAULT: operational_info_requests")
});

/// Subidas Android que presentaron un salt ya utilizado.
pub static OPERATIONAL_INFO_ANDROID_REUSED_SALT: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sentinel_api_operational_info_android_reused_salt",
        "Number of Android operational info requests using an already used salt.",
        &["after_verification"]
    )
    .expect("METRIC_REGISTRATION_FAULT: android_reused_salt")
});

/// Registros encolados pendientes de drenaje, por plataforma.
/// Gauge: el drainer de operational info lo decrementa al persistir.
pub static OPERATIONAL_INFO_ENQUEUED: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "sentinel_api_operational_info_enqueued",
        "Number of operational info records enqueued and not yet stored.",
        &["platform"]
    )
    .expect("METRIC_REGISTRATION_FAULT: operational_info_enqueued")
});

pub static AUTHORIZE_ANALYTICS_TOKEN_FIRST_STEP_BEGIN: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_authorize_analytics_token_first_step_begin",
        "Number of analytics tokens which started the authorization first step."
    )
    .expect("METRIC_REGISTRATION_FAULT: first_step_begin")
});

pub static AUTHORIZE_ANALYTICS_TOKEN_SECOND_STEP_BEGIN: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_authorize_analytics_token_second_step_begin",
        "Number of analytics tokens which started the authorization second step."
    )
    .expect("METRIC_REGISTRATION_FAULT: second_step_begin")
});

pub static AUTHORIZE_ANALYTICS_TOKEN_THIRD_STEP_BEGIN: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_authorize_analytics_token_third_step_begin",
        "Number of analytics tokens which started the authorization third step."
    )
    .expect("METRIC_REGISTRATION_FAULT: third_step_begin")
});

pub static AUTHORIZE_ANALYTICS_TOKEN_AUTHORIZED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_authorize_analytics_token_authorized",
        "Number of analytics tokens successfully authorized."
    )
    .expect("METRIC_REGISTRATION_FAULT: token_authorized")
});

pub static AUTHORIZE_ANALYTICS_TOKEN_BLACKLISTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_authorize_analytics_token_blacklisted",
        "Number of devices blacklisted during token authorization."
    )
    .expect("METRIC_REGISTRATION_FAULT: token_blacklisted")
});

pub static STORED_EXPOSURE_PAYLOAD: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_stored_exposure_payload",
        "Number of stored exposure payload documents."
    )
    .expect("METRIC_REGISTRATION_FAULT: stored_exposure_payload")
});

pub static WRONG_EXPOSURE_PAYLOAD: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_wrong_exposure_payload",
        "Number of malformed exposure payload documents coming from the ingestion service."
    )
    .expect("METRIC_REGISTRATION_FAULT: wrong_exposure_payload")
});

pub static DELETED_EXPOSURE_PAYLOAD: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_deleted_exposure_payload",
        "Number of exposure payload documents deleted by the retention sweep."
    )
    .expect("METRIC_REGISTRATION_FAULT: deleted_exposure_payload")
});

pub static DELETED_OPERATIONAL_INFO: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sentinel_worker_deleted_operational_info",
        "Number of operational info documents deleted by the retention sweep."
    )
    .expect("METRIC_REGISTRATION_FAULT: deleted_operational_info")
});

// FIN DEL ARCHIVO [libs/shared/watchtower/src/metrics.rs]
