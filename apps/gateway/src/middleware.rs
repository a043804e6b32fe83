// [apps/gateway/src/middleware.rs]
/*!
 * =================================================================
 * APARATO: TRAFFIC SHAPING GUARD (V4.2 - COVER PARITY)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: CORTOCIRCUITO DUMMY Y MONITOREO DE SUBIDAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COVER PARITY: Una petición dummy recibe el mismo 204 vacío que
 *    una real, tras una demora gaussiana sintonizada; el cuerpo jamás
 *    se inspecciona en el camino dummy.
 * 2. ORDER GOVERNANCE: El monitor envuelve al guardia dummy, de modo
 *    que el estado final (incluidos los 204 de cobertura) siempre se
 *    contabiliza.
 * =================================================================
 */

use std::f64::consts::PI;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rand::Rng;
use tracing::debug;

use sentinel_domain_models::Platform;
use sentinel_shared_watchtower::metrics::OPERATIONAL_INFO_REQUESTS;

use crate::schemas::ApiError;
use crate::state::AppState;

/// Cabecera obligatoria de las subidas: bandera entera de cobertura.
pub const DUMMY_DATA_HEADER: &str = "Immuni-Dummy-Data";

/// Bandera de cobertura extraída de la cabecera; acepta la forma
/// entera y su codificación como cadena.
fn parse_dummy_header(request: &Request) -> Result<bool, ApiError> {
    let raw_value = request
        .headers()
        .get(DUMMY_DATA_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::SchemaViolation)?;

    match raw_value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ApiError::SchemaViolation),
    }
}

/// Demora gaussiana N(μ, σ) en milisegundos, recortada en cero.
/// Transformación de Box–Muller sobre dos uniformes.
fn sample_cover_delay_millis(mean_millis: f64, sigma_millis: f64) -> f64 {
    let mut entropy_source = rand::thread_rng();
    let uniform_one: f64 = entropy_source.gen::<f64>().max(f64::MIN_POSITIVE);
    let uniform_two: f64 = entropy_source.gen();

    let gaussian_sample = (-2.0 * uniform_one.ln()).sqrt() * (2.0 * PI * uniform_two).cos();
    (mean_millis + sigma_millis * gaussian_sample).max(0.0)
}

/**
 * Guardia de tráfico de cobertura sobre los endpoints de subida.
 *
 * # Logic:
 * 1. Cabecera ausente o corrupta -> violación de esquema (400).
 * 2. Bandera a 1 -> demora gaussiana y 204 sin tocar el cuerpo.
 * 3. Bandera a 0 -> la petición continúa hacia el negocio.
 */
pub async fn dummy_traffic_guard(
    State(application_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let is_dummy = match parse_dummy_header(&request) {
        Ok(flag) => flag,
        Err(schema_fault) => return schema_fault.into_response(),
    };

    if is_dummy {
        let delay_millis = sample_cover_delay_millis(
            application_state.config.dummy_request_timeout_millis,
            application_state.config.dummy_request_timeout_sigma,
        );
        debug!(delay_millis, "🎭 [COVER_TRAFFIC]: Shaping dummy upload response.");
        tokio::time::sleep(Duration::from_millis(delay_millis as u64)).await;

        return StatusCode::NO_CONTENT.into_response();
    }

    next.run(request).await
}

async fn monitor_operational_info(platform: Platform, request: Request, next: Next) -> Response {
    let dummy_label = match parse_dummy_header(&request) {
        Ok(true) => "1",
        Ok(false) => "0",
        // La cabecera corrupta se contabiliza como tráfico no-dummy;
        // el guardia interno responderá con la violación de esquema.
        Err(_) => "0",
    };

    let response = next.run(request).await;

    OPERATIONAL_INFO_REQUESTS
        .with_label_values(&[
            dummy_label,
            platform.as_str(),
            response.status().as_str(),
        ])
        .inc();

    response
}

/// Monitor de la superficie iOS.
pub async fn monitor_apple_operational_info(request: Request, next: Next) -> Response {
    monitor_operational_info(Platform::Ios, request, next).await
}

/// Monitor de la superficie Android.
pub async fn monitor_google_operational_info(request: Request, next: Next) -> Response {
    monitor_operational_info(Platform::Android, request, next).await
}

// FIN DEL ARCHIVO [apps/gateway/src/middleware.rs]
