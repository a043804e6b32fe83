// [apps/warden/tests/drainer_pipeline.rs]

use std::sync::Arc;

use chrono::{Duration, Utc};

use sentinel_domain_models::{OperationalInfo, Platform};
use sentinel_infra_archive::{
    ArchiveClient, ExposurePayloadRepository, OperationalInfoRepository,
};
use sentinel_infra_coordination::queues::QueueKeys;
use sentinel_infra_coordination::{CoordinationStore, IngestionQueues, MemoryCoordinationStore};
use sentinel_warden::tasks::{delete_old_data, store_exposure_payloads, store_operational_info};

async fn testing_pipeline(
    strata_name: &str,
) -> (IngestionQueues, Arc<MemoryCoordinationStore>, ArchiveClient) {
    let store = Arc::new(MemoryCoordinationStore::new());
    let queues = IngestionQueues::new(
        store.clone() as Arc<dyn CoordinationStore>,
        QueueKeys {
            operational_info: "operational_info".to_string(),
            exposure_payload: "ingested_exposure_data".to_string(),
            exposure_payload_errors: "errors_exposure_data".to_string(),
        },
    );

    let archive_url = format!("file:{strata_name}?mode=memory&cache=shared");
    let archive = ArchiveClient::connect(&archive_url, None).await.unwrap();

    (queues, store, archive)
}

async fn count_rows(client: &ArchiveClient, table: &str) -> i64 {
    let connection = client.get_connection().unwrap();
    let mut rows = connection
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}

fn valid_envelope(index: usize) -> String {
    format!(
        r#"{{"version":1,"payload":{{"province":"BO","symptoms_started_on":"2026-07-0{}",
            "exposure_detection_summaries":[]}}}}"#,
        (index % 9) + 1
    )
}

#[tokio::test]
async fn certify_bounded_exposure_drain_cycles() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing bounded drain cycles (S6)...");

    let (queues, store, archive) = testing_pipeline("drain_cycles").await;
    let repository = ExposurePayloadRepository::new(archive.clone());

    // 150 sobres válidos frente a un límite de 100 por ciclo.
    let envelopes: Vec<String> = (0..150).map(valid_envelope).collect();
    store
        .list_push_right("ingested_exposure_data", &envelopes)
        .await
        .unwrap();

    store_exposure_payloads::run(&queues, &repository, 100).await.unwrap();
    assert_eq!(count_rows(&archive, "exposure_payloads").await, 100);
    assert_eq!(queues.exposure_payload_queue_length().await.unwrap(), 50);
    assert_eq!(queues.exposure_payload_errors_queue_length().await.unwrap(), 0);

    // Segundo ciclo: el remanente completo.
    store_exposure_payloads::run(&queues, &repository, 100).await.unwrap();
    assert_eq!(count_rows(&archive, "exposure_payloads").await, 150);
    assert_eq!(queues.exposure_payload_queue_length().await.unwrap(), 0);
}

#[tokio::test]
async fn certify_malformed_element_sideline() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing malformed element sideline...");

    let (queues, store, archive) = testing_pipeline("drain_sideline").await;
    let repository = ExposurePayloadRepository::new(archive.clone());

    let elements = vec![
        valid_envelope(0),
        "definitely-not-json".to_string(),
        r#"{"version":2,"payload":{"province":"BO","exposure_detection_summaries":[]}}"#.to_string(),
        r#"{"version":1,"payload":null}"#.to_string(),
        valid_envelope(1),
    ];
    store
        .list_push_right("ingested_exposure_data", &elements)
        .await
        .unwrap();

    store_exposure_payloads::run(&queues, &repository, 100).await.unwrap();

    // Los válidos persisten; los corruptos van crudos a la cola de errores.
    assert_eq!(count_rows(&archive, "exposure_payloads").await, 2);
    assert_eq!(queues.exposure_payload_errors_queue_length().await.unwrap(), 3);
    assert_eq!(queues.exposure_payload_queue_length().await.unwrap(), 0);
}

#[tokio::test]
async fn certify_operational_info_drain() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing operational info drain...");

    let (queues, _store, archive) = testing_pipeline("drain_operational").await;
    let repository = OperationalInfoRepository::new(archive.clone());

    for platform in [Platform::Ios, Platform::Android, Platform::Android] {
        queues
            .enqueue_operational_info(&OperationalInfo::new(
                platform,
                "GE".parse().unwrap(),
                true,
                true,
                true,
                false,
                None,
            ))
            .await
            .unwrap();
    }

    store_operational_info::run(&queues, &repository, 100).await.unwrap();

    assert_eq!(count_rows(&archive, "operational_info").await, 3);
    assert_eq!(queues.operational_info_queue_length().await.unwrap(), 0);

    // Ciclo vacío: inofensivo.
    store_operational_info::run(&queues, &repository, 100).await.unwrap();
    assert_eq!(count_rows(&archive, "operational_info").await, 3);
}

#[tokio::test]
async fn certify_retention_sweep_over_both_collections() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing retention sweep strata...");

    let (_queues, _store, archive) = testing_pipeline("drain_retention").await;
    let exposure_repository = ExposurePayloadRepository::new(archive.clone());
    let operational_repository = OperationalInfoRepository::new(archive.clone());

    let stale_timestamp = (Utc::now() - Duration::days(40))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let connection = archive.get_connection().unwrap();
    connection
        .execute(
            "INSERT INTO operational_info (
                platform, province, exposure_permission, bluetooth_active,
                notification_permission, exposure_notification, created_at
            ) VALUES ('ios', 'RM', 1, 1, 1, 0, ?1)",
            libsql::params![stale_timestamp.clone()],
        )
        .await
        .unwrap();
    connection
        .execute(
            "INSERT INTO exposure_payloads (
                province, exposure_detection_summaries, created_at
            ) VALUES ('RM', '[]', ?1)",
            libsql::params![stale_timestamp],
        )
        .await
        .unwrap();
    connection
        .execute(
            "INSERT INTO exposure_payloads (province, exposure_detection_summaries)
             VALUES ('MI', '[]')",
            (),
        )
        .await
        .unwrap();

    delete_old_data::run(&exposure_repository, &operational_repository, 30)
        .await
        .unwrap();

    // Sólo sobrevive el documento dentro del horizonte.
    assert_eq!(count_rows(&archive, "operational_info").await, 0);
    assert_eq!(count_rows(&archive, "exposure_payloads").await, 1);
}
// FIN DEL ARCHIVO [apps/warden/tests/drainer_pipeline.rs]
