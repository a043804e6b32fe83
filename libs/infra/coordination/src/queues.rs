// [libs/infra/coordination/src/queues.rs]
/*!
 * =================================================================
 * APARATO: INGESTION QUEUE ADAPTER (V4.1)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: COLAS FIFO DE INGESTA Y DESVÍO DE ELEMENTOS CORRUPTOS
 * =================================================================
 */

use std::sync::Arc;

use tracing::{info, instrument};

use sentinel_domain_models::OperationalInfo;
use sentinel_shared_watchtower::metrics::OPERATIONAL_INFO_ENQUEUED;

use crate::errors::CoordinationError;
use crate::store::CoordinationStore;

/// Claves de las tres listas de ingesta en el almacén de coordinación.
#[derive(Debug, Clone)]
pub struct QueueKeys {
    pub operational_info: String,
    pub exposure_payload: String,
    pub exposure_payload_errors: String,
}

/**
 * Adaptador de las colas de ingesta: productores (encolado de
 * operational info) y consumidores (drenaje acotado de los drainers).
 */
#[derive(Clone)]
pub struct IngestionQueues {
    coordination_store: Arc<dyn CoordinationStore>,
    keys: QueueKeys,
}

impl IngestionQueues {
    pub fn new(coordination_store: Arc<dyn CoordinationStore>, keys: QueueKeys) -> Self {
        Self {
            coordination_store,
            keys,
        }
    }

    /**
     * Encola el registro validado en la cola de operational info y
     * registra la métrica por plataforma.
     */
    #[instrument(skip(self, operational_info), fields(platform = %operational_info.platform))]
    pub async fn enqueue_operational_info(
        &self,
        operational_info: &OperationalInfo,
    ) -> Result<(), CoordinationError> {
        let encoded_record = serde_json::to_string(operational_info)?;

        self.coordination_store
            .list_push_right(&self.keys.operational_info, &[encoded_record])
            .await?;

        OPERATIONAL_INFO_ENQUEUED
            .with_label_values(&[operational_info.platform.as_str()])
            .inc();
        info!("📨 [INGESTION]: Successfully enqueued operational info.");
        Ok(())
    }

    /// Drena hasta `max_elements` de la cola de operational info.
    pub async fn drain_operational_info(
        &self,
        max_elements: usize,
    ) -> Result<Vec<String>, CoordinationError> {
        self.coordination_store
            .list_drain_head(&self.keys.operational_info, max_elements)
            .await
    }

    pub async fn operational_info_queue_length(&self) -> Result<usize, CoordinationError> {
        self.coordination_store
            .list_length(&self.keys.operational_info)
            .await
    }

    /// Drena hasta `max_elements` de la cola de exposure payloads.
    pub async fn drain_exposure_payloads(
        &self,
        max_elements: usize,
    ) -> Result<Vec<String>, CoordinationError> {
        self.coordination_store
            .list_drain_head(&self.keys.exposure_payload, max_elements)
            .await
    }

    pub async fn exposure_payload_queue_length(&self) -> Result<usize, CoordinationError> {
        self.coordination_store
            .list_length(&self.keys.exposure_payload)
            .await
    }

    /// Desvía elementos crudos corruptos hacia la cola de errores.
    pub async fn push_exposure_payload_errors(
        &self,
        raw_elements: &[String],
    ) -> Result<(), CoordinationError> {
        self.coordination_store
            .list_push_right(&self.keys.exposure_payload_errors, raw_elements)
            .await
    }

    pub async fn exposure_payload_errors_queue_length(&self) -> Result<usize, CoordinationError> {
        self.coordination_store
            .list_length(&self.keys.exposure_payload_errors)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCoordinationStore;
    use sentinel_domain_models::Platform;

    fn queues_over_memory() -> (IngestionQueues, Arc<MemoryCoordinationStore>) {
        let store = Arc::new(MemoryCoordinationStore::new());
        let queues = IngestionQueues::new(
            store.clone(),
            QueueKeys {
                operational_info: "operational_info".to_string(),
                exposure_payload: "ingested_exposure_data".to_string(),
                exposure_payload_errors: "errors_exposure_data".to_string(),
            },
        );
        (queues, store)
    }

    fn sample_record() -> OperationalInfo {
        OperationalInfo::new(
            Platform::Android,
            "PA".parse().unwrap(),
            true,
            true,
            false,
            false,
            None,
        )
    }

    #[tokio::test]
    async fn certify_enqueue_wire_format() {
        let (queues, _store) = queues_over_memory();

        queues.enqueue_operational_info(&sample_record()).await.unwrap();
        assert_eq!(queues.operational_info_queue_length().await.unwrap(), 1);

        let drained = queues.drain_operational_info(10).await.unwrap();
        assert_eq!(drained.len(), 1);

        // El elemento encolado debe ser el JSON canónico del registro.
        let decoded: OperationalInfo = serde_json::from_str(&drained[0]).unwrap();
        assert_eq!(decoded, sample_record());
    }

    #[tokio::test]
    async fn certify_error_sideline_isolation() {
        let (queues, _store) = queues_over_memory();

        queues
            .push_exposure_payload_errors(&["garbled".to_string()])
            .await
            .unwrap();

        assert_eq!(queues.exposure_payload_queue_length().await.unwrap(), 0);
        assert_eq!(queues.exposure_payload_errors_queue_length().await.unwrap(), 1);
    }
}
// FIN DEL ARCHIVO [libs/infra/coordination/src/queues.rs]
