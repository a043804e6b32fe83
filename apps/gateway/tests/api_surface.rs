// [apps/gateway/tests/api_surface.rs]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use sentinel_gateway::prelude::{create_analytics_router, AppState};
use sentinel_infra_coordination::salt::used_salt_key;
use sentinel_infra_coordination::{CoordinationStore, MemoryCoordinationStore};
use sentinel_shared_config::SentinelConfig;

const ANALYTICS_TOKEN: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\
aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// Salt base64 de 24 caracteres codificados (18 bytes).
const SALT: &str = "AAAAAAAAAAAAAAAAAAAAAAAA";

fn testing_stack() -> (Router, AppState, Arc<MemoryCoordinationStore>) {
    let store = Arc::new(MemoryCoordinationStore::new());
    let config = Arc::new(SentinelConfig::from_environment().expect("default config"));
    let state = AppState::new(config, store.clone() as Arc<dyn CoordinationStore>);
    (create_analytics_router(state.clone()), state, store)
}

fn apple_upload_request(dummy: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/analytics/apple/operational-info")
        .header("content-type", "application/json")
        .header("Immuni-Dummy-Data", dummy)
        .header("authorization", format!("Bearer {ANALYTICS_TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_apple_body(exposure_notification: u8) -> String {
    format!(
        r#"{{"province":"RM","exposure_permission":1,"bluetooth_active":1,
            "notification_permission":1,"exposure_notification":{exposure_notification},
            "last_risky_exposure_on":"2026-07-20"}}"#
    )
}

async fn body_message(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn certify_schema_violation_contract() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing schema violation contract...");

    let (router, _state, _store) = testing_stack();

    // Cuerpo indecodificable con tráfico real: 400 con mensaje constante.
    let response = router
        .clone()
        .oneshot(apple_upload_request("0", "{\"broken\":"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_message(response)
        .await
        .contains("Request not compliant with the defined schema."));

    // Provincia fuera de catálogo.
    let wrong_province = valid_apple_body(0).replace("RM", "ZZ");
    let response = router
        .clone()
        .oneshot(apple_upload_request("0", &wrong_province))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Cabecera de cobertura ausente.
    let without_header = Request::builder()
        .method("POST")
        .uri("/v1/analytics/apple/operational-info")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {ANALYTICS_TOKEN}"))
        .body(Body::from(valid_apple_body(0)))
        .unwrap();
    let response = router.clone().oneshot(without_header).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Bearer con forma inválida (mayúsculas).
    let bad_bearer = Request::builder()
        .method("POST")
        .uri("/v1/analytics/apple/operational-info")
        .header("content-type", "application/json")
        .header("Immuni-Dummy-Data", "0")
        .header("authorization", format!("Bearer {}", "A".repeat(128)))
        .body(Body::from(valid_apple_body(0)))
        .unwrap();
    let response = router.clone().oneshot(bad_bearer).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn certify_apple_quota_consumption_flow() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing monthly quota consumption (S4)...");

    let (router, state, store) = testing_stack();
    state.quota_ledger.issue(ANALYTICS_TOKEN).await.unwrap();

    // Primera subida con exposición: admitida y encolada.
    let response = router
        .clone()
        .oneshot(apple_upload_request("0", &valid_apple_body(1)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        state.ingestion_queues.operational_info_queue_length().await.unwrap(),
        1
    );

    // El cupo con-exposición desapareció; el sin-exposición permanece.
    let current_month = sentinel_domain_models::date_utils::current_month_start();
    let members = store.set_members(ANALYTICS_TOKEN).await.unwrap();
    assert!(!members.contains(&format!("{current_month}:1")));
    assert!(members.contains(&format!("{current_month}:0")));

    // Segunda subida idéntica: 204 silencioso, sin segundo encolado.
    let response = router
        .clone()
        .oneshot(apple_upload_request("0", &valid_apple_body(1)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        state.ingestion_queues.operational_info_queue_length().await.unwrap(),
        1
    );
}

#[tokio::test]
async fn certify_cover_traffic_short_circuit() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing dummy short-circuit (S5)...");

    let (router, state, _store) = testing_stack();
    state.quota_ledger.issue(ANALYTICS_TOKEN).await.unwrap();

    // Cuerpo inválido con bandera dummy: 204 sin efectos secundarios.
    let response = router
        .clone()
        .oneshot(apple_upload_request("1", "definitely-not-json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        state.ingestion_queues.operational_info_queue_length().await.unwrap(),
        0
    );
    // El ledger quedó intacto.
    assert!(state.quota_ledger.is_authorized(ANALYTICS_TOKEN).await.unwrap());
}

#[tokio::test]
async fn certify_token_authorization_dispatch() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing token authorization surface (S1 front)...");

    let (router, state, store) = testing_stack();

    let authorization_body = format!(
        r#"{{"analytics_token":"{ANALYTICS_TOKEN}","device_token":"ZGV2aWNlLXRva2Vu"}}"#
    );
    let request = |body: String| {
        Request::builder()
            .method("POST")
            .uri("/v1/analytics/apple/token")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    };

    // Token sin cupo: programación asíncrona y 202.
    let response = router.clone().oneshot(request(authorization_body.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let dispatched = store
        .list_pop_blocking("authorization_ios", Duration::from_millis(50))
        .await
        .unwrap()
        .expect("ios authorization job dispatched");
    assert!(dispatched.contains(ANALYTICS_TOKEN));

    // Token ya autorizado: 201 inmediato, sin nuevo despacho.
    state.quota_ledger.issue(ANALYTICS_TOKEN).await.unwrap();
    let response = router.clone().oneshot(request(authorization_body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(store.list_length("authorization_ios").await.unwrap(), 0);

    // Device token fuera de base64: violación de esquema.
    let corrupt = format!(
        r#"{{"analytics_token":"{ANALYTICS_TOKEN}","device_token":"%%%"}}"#
    );
    let response = router.clone().oneshot(request(corrupt)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn certify_google_dispatch_and_salt_fast_path() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing Android dispatch strata (S3 front)...");

    let (router, _state, store) = testing_stack();

    let google_body = format!(
        r#"{{"province":"MI","exposure_permission":1,"bluetooth_active":1,
            "notification_permission":1,"exposure_notification":0,
            "salt":"{SALT}","signed_attestation":"h.p.s"}}"#
    );
    let request = |body: String| {
        Request::builder()
            .method("POST")
            .uri("/v1/analytics/google/operational-info")
            .header("content-type", "application/json")
            .header("Immuni-Dummy-Data", "0")
            .body(Body::from(body))
            .unwrap()
    };

    // Salt fresco: verificación despachada al broker.
    let response = router.clone().oneshot(request(google_body.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.list_length("authorization_android").await.unwrap(), 1);

    // Salt ya registrado: camino rápido, sin segundo despacho.
    store
        .string_set_if_absent(&used_salt_key(SALT), "1", Duration::from_secs(600))
        .await
        .unwrap();
    let response = router.clone().oneshot(request(google_body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.list_length("authorization_android").await.unwrap(), 1);

    // Salt de longitud incorrecta: violación de esquema.
    let short_salt = format!(
        r#"{{"province":"MI","exposure_permission":1,"bluetooth_active":1,
            "notification_permission":1,"exposure_notification":0,
            "salt":"QUFB","signed_attestation":"h.p.s"}}"#
    );
    let response = router.clone().oneshot(request(short_salt)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
// FIN DEL ARCHIVO [apps/gateway/tests/api_surface.rs]
