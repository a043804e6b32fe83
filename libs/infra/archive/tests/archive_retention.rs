// [libs/infra/archive/tests/archive_retention.rs]

use chrono::{Duration, Utc};
use sentinel_domain_models::{ExposurePayload, OperationalInfo, Platform};
use sentinel_infra_archive::{ArchiveClient, ExposurePayloadRepository, OperationalInfoRepository};

async fn connect_memory_archive(strata_name: &str) -> ArchiveClient {
    let url = format!("file:{strata_name}?mode=memory&cache=shared");
    ArchiveClient::connect(&url, None).await.expect("memory archive ignition")
}

async fn count_rows(client: &ArchiveClient, table: &str) -> i64 {
    let connection = client.get_connection().unwrap();
    let mut rows = connection
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}

fn sample_operational_info(exposure_notification: bool) -> OperationalInfo {
    OperationalInfo::new(
        Platform::Ios,
        "RM".parse().unwrap(),
        true,
        true,
        true,
        exposure_notification,
        exposure_notification.then(|| "2026-07-20".parse().unwrap()),
    )
}

#[tokio::test]
async fn certify_operational_info_batch_persistence() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing OperationalInfo batch strata...");

    let client = connect_memory_archive("op_info_batch").await;
    let repository = OperationalInfoRepository::new(client.clone());

    let batch = vec![sample_operational_info(true), sample_operational_info(false)];
    let inserted = repository.insert_many(&batch).await.unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(count_rows(&client, "operational_info").await, 2);

    // La invariante de exposición se refleja en la columna nullable.
    let connection = client.get_connection().unwrap();
    let mut rows = connection
        .query(
            "SELECT last_risky_exposure_on FROM operational_info WHERE exposure_notification = 0",
            (),
        )
        .await
        .unwrap();
    let row = rows.next().await.unwrap().unwrap();
    assert!(matches!(row.get_value(0).unwrap(), libsql::Value::Null));

    // Lote vacío: ningún viaje transaccional.
    assert_eq!(repository.insert_many(&[]).await.unwrap(), 0);
}

#[tokio::test]
async fn certify_retention_sweep_horizon() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing retention sweep horizon...");

    let client = connect_memory_archive("op_info_retention").await;
    let repository = OperationalInfoRepository::new(client.clone());

    repository
        .insert_many(&[sample_operational_info(false)])
        .await
        .unwrap();

    // Registro antiguo inyectado más allá del horizonte de retención.
    let stale_timestamp = (Utc::now() - Duration::days(45))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let connection = client.get_connection().unwrap();
    connection
        .execute(
            "INSERT INTO operational_info (
                platform, province, exposure_permission, bluetooth_active,
                notification_permission, exposure_notification, created_at
            ) VALUES ('android', 'MI', 1, 1, 1, 0, ?1)",
            libsql::params![stale_timestamp],
        )
        .await
        .unwrap();

    let cutoff = Utc::now() - Duration::days(30);
    let deleted = repository.delete_older_than(cutoff).await.unwrap();

    assert_eq!(deleted, 1);
    assert_eq!(count_rows(&client, "operational_info").await, 1);

    // Segundo barrido: nada que borrar.
    assert_eq!(repository.delete_older_than(cutoff).await.unwrap(), 0);
}

#[tokio::test]
async fn certify_exposure_payload_document_parity() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing ExposurePayload document strata...");

    let client = connect_memory_archive("exposure_batch").await;
    let repository = ExposurePayloadRepository::new(client.clone());

    let payload_json = r#"{
        "province": "TO",
        "symptoms_started_on": "2026-06-11",
        "exposure_detection_summaries": [{
            "date": "2026-06-10",
            "matched_key_count": 1,
            "days_since_last_exposure": 2,
            "attenuation_durations": [900, 300, 0],
            "maximum_risk_score": 6,
            "exposure_info": []
        }]
    }"#;
    let payload: ExposurePayload = serde_json::from_str(payload_json).unwrap();

    let inserted = repository.insert_many(&[payload.clone()]).await.unwrap();
    assert_eq!(inserted, 1);

    // Los resúmenes persisten como documento JSON íntegro.
    let connection = client.get_connection().unwrap();
    let mut rows = connection
        .query("SELECT exposure_detection_summaries FROM exposure_payloads", ())
        .await
        .unwrap();
    let serialized: String = rows.next().await.unwrap().unwrap().get(0).unwrap();
    let recovered: Vec<sentinel_domain_models::ExposureDetectionSummary> =
        serde_json::from_str(&serialized).unwrap();
    assert_eq!(recovered, payload.exposure_detection_summaries);

    let deleted = repository
        .delete_older_than(Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(deleted, 0);
    assert_eq!(count_rows(&client, "exposure_payloads").await, 1);
}
// FIN DEL ARCHIVO [libs/infra/archive/tests/archive_retention.rs]
