// [apps/warden/src/tasks/store_exposure_payloads.rs]
/*!
 * =================================================================
 * APARATO: EXPOSURE PAYLOAD DRAINER (V4.2 - BOUNDED BATCH)
 * CLASIFICACIÓN: SCHEDULED TASK (ESTRATO L4)
 * RESPONSABILIDAD: DRENAJE ACOTADO HACIA EL ARCHIVO DURADERO
 *
 * # Mathematical Proof (At-Most-Once Extraction):
 * El par LRANGE+LTRIM viaja en un pipeline atómico del almacén: los
 * elementos extraídos no son visibles para ningún otro drenaje. Si la
 * inserción por lotes falla después, esos elementos se pierden; el
 * contrato del pipeline es at-least-once-or-lost y cada cliente
 * re-sube una vez al mes.
 * =================================================================
 */

use tracing::{info, instrument, warn};

use sentinel_domain_models::ExposurePayload;
use sentinel_infra_archive::ExposurePayloadRepository;
use sentinel_infra_coordination::IngestionQueues;
use sentinel_shared_watchtower::metrics::{STORED_EXPOSURE_PAYLOAD, WRONG_EXPOSURE_PAYLOAD};

/**
 * Drena hasta `max_ingested_elements` de la cola upstream, valida el
 * sobre de cada elemento y persiste los válidos en un solo lote. Los
 * corruptos se desvían a la cola de errores.
 */
#[instrument(skip(ingestion_queues, exposure_repository))]
pub async fn run(
    ingestion_queues: &IngestionQueues,
    exposure_repository: &ExposurePayloadRepository,
    max_ingested_elements: usize,
) -> anyhow::Result<()> {
    let drained_elements = ingestion_queues
        .drain_exposure_payloads(max_ingested_elements)
        .await?;

    let mut valid_payloads: Vec<ExposurePayload> = Vec::new();
    let mut bad_format_elements: Vec<String> = Vec::new();

    for raw_element in drained_elements {
        match ExposurePayload::from_queue_element(&raw_element) {
            Ok(payload) => valid_payloads.push(payload),
            Err(_format_fault) => bad_format_elements.push(raw_element),
        }
    }

    let stored_count = valid_payloads.len();
    if stored_count > 0 {
        exposure_repository.insert_many(&valid_payloads).await?;
        STORED_EXPOSURE_PAYLOAD.inc_by(stored_count as u64);
    }

    if !bad_format_elements.is_empty() {
        warn!(
            bad_format_data = bad_format_elements.len(),
            "🗑️ [DRAINER]: Found ingested data with bad format."
        );
        WRONG_EXPOSURE_PAYLOAD.inc_by(bad_format_elements.len() as u64);
        ingestion_queues
            .push_exposure_payload_errors(&bad_format_elements)
            .await?;
    }

    let remaining_queue_length = ingestion_queues.exposure_payload_queue_length().await?;
    info!(
        ingested_data = stored_count,
        ingestion_queue_length = remaining_queue_length,
        "📦 [DRAINER]: Store exposure payload periodic task completed."
    );

    Ok(())
}
// FIN DEL ARCHIVO [apps/warden/src/tasks/store_exposure_payloads.rs]
