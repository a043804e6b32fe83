// [apps/gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: ANALYTICS ROUTING MATRIX (V4.2)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE ENDPOINTS Y ORDEN DE MIDDLEWARE
 *
 * VISION HIPER-HOLÍSTICA:
 * El orden de capas es observable: el monitor envuelve al guardia
 * dummy (contabiliza también los 204 de cobertura) y el guardia dummy
 * cortocircuita antes de deserializar el cuerpo, de modo que una
 * petición de cobertura con cuerpo inválido sigue recibiendo 204.
 * =================================================================
 */

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::analytics;
use crate::middleware::{
    dummy_traffic_guard, monitor_apple_operational_info, monitor_google_operational_info,
};
use crate::state::AppState;

pub fn create_analytics_router(application_shared_state: AppState) -> Router {
    // ESTRATO DE SUBIDAS: guardia dummy interno, monitor externo.
    let apple_operational_info_route = post(analytics::post_apple_operational_info)
        .layer(middleware::from_fn_with_state(
            application_shared_state.clone(),
            dummy_traffic_guard,
        ))
        .layer(middleware::from_fn(monitor_apple_operational_info));

    let google_operational_info_route = post(analytics::post_google_operational_info)
        .layer(middleware::from_fn_with_state(
            application_shared_state.clone(),
            dummy_traffic_guard,
        ))
        .layer(middleware::from_fn(monitor_google_operational_info));

    // COMPOSICIÓN GLOBAL (Root Topology)
    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .nest(
            "/v1/analytics",
            Router::new()
                .route("/apple/operational-info", apple_operational_info_route)
                .route("/apple/token", post(analytics::post_authorize_token))
                .route("/google/operational-info", google_operational_info_route),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(application_shared_state)
}
// FIN DEL ARCHIVO [apps/gateway/src/routes.rs]
