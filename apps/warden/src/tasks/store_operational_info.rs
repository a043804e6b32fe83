// [apps/warden/src/tasks/store_operational_info.rs]
/*!
 * =================================================================
 * APARATO: OPERATIONAL INFO DRAINER (V4.2)
 * CLASIFICACIÓN: SCHEDULED TASK (ESTRATO L4)
 * RESPONSABILIDAD: PERSISTENCIA ACOTADA DE REGISTROS VALIDADOS
 * =================================================================
 */

use std::collections::HashMap;

use tracing::{info, instrument};

use sentinel_domain_models::OperationalInfo;
use sentinel_infra_archive::OperationalInfoRepository;
use sentinel_infra_coordination::IngestionQueues;
use sentinel_shared_watchtower::metrics::OPERATIONAL_INFO_ENQUEUED;

/**
 * Drena hasta `max_ingested_elements` registros y los persiste en un
 * solo lote. No hay cola de errores: todo elemento fue validado antes
 * de encolarse, así que un fallo de decodificación es corrupción del
 * almacén y debe aflorar al planificador.
 */
#[instrument(skip(ingestion_queues, operational_repository))]
pub async fn run(
    ingestion_queues: &IngestionQueues,
    operational_repository: &OperationalInfoRepository,
    max_ingested_elements: usize,
) -> anyhow::Result<()> {
    info!("📦 [DRAINER]: Store operational info periodic task started.");

    let drained_elements = ingestion_queues
        .drain_operational_info(max_ingested_elements)
        .await?;

    let operational_records: Vec<OperationalInfo> = drained_elements
        .iter()
        .map(|raw_element| serde_json::from_str(raw_element))
        .collect::<Result<_, _>>()?;

    if !operational_records.is_empty() {
        operational_repository.insert_many(&operational_records).await?;

        // Se decrementa junto para evidenciar que ocurre en la misma
        // pasada que balancea los incrementos de encolado.
        let mut count_per_platform: HashMap<&'static str, i64> = HashMap::new();
        for record in &operational_records {
            *count_per_platform.entry(record.platform.as_str()).or_default() += 1;
        }
        for (platform, stored_count) in count_per_platform {
            OPERATIONAL_INFO_ENQUEUED
                .with_label_values(&[platform])
                .sub(stored_count);
        }
    }

    let remaining_queue_length = ingestion_queues.operational_info_queue_length().await?;
    info!(
        stored_data = operational_records.len(),
        operational_info_queue_length = remaining_queue_length,
        "📦 [DRAINER]: Store operational info periodic task completed."
    );

    Ok(())
}
// FIN DEL ARCHIVO [apps/warden/src/tasks/store_operational_info.rs]
