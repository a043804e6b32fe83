// [apps/gateway/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY STATE ORCHESTRATOR (V4.1)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE LEDGER, COLAS Y BROKER
 *
 * # Mathematical Proof (Stateless Workers):
 * El estado compartido contiene únicamente adaptadores hacia el
 * almacén de coordinación; ningún handler comparte estado mutable en
 * proceso. La réplica horizontal del gateway es trivial.
 * =================================================================
 */

use std::sync::Arc;

use tracing::debug;

use sentinel_infra_coordination::broker::BrokerKeys;
use sentinel_infra_coordination::queues::QueueKeys;
use sentinel_infra_coordination::{
    CoordinationStore, IngestionQueues, QuotaLedger, TaskBroker, UsedSaltRegistry,
};
use sentinel_shared_config::SentinelConfig;

/**
 * Contenedor de estado compartido (Thread-Safe) del gateway.
 */
#[derive(Clone)]
pub struct AppState {
    /// Configuración inmutable capturada en la ignición.
    pub config: Arc<SentinelConfig>,
    /// Ledger de cuota mensual por analytics token.
    pub quota_ledger: QuotaLedger,
    /// Colas de ingesta de operational info y exposure payloads.
    pub ingestion_queues: IngestionQueues,
    /// Registro de salts SafetyNet de un solo uso (camino rápido).
    pub used_salt_registry: UsedSaltRegistry,
    /// Broker de trabajos de autorización hacia los procesos warden.
    pub task_broker: TaskBroker,
}

impl AppState {
    /**
     * Forja el estado maestro inyectando el almacén de coordinación.
     */
    pub fn new(config: Arc<SentinelConfig>, coordination_store: Arc<dyn CoordinationStore>) -> Self {
        debug!("🧬 [APP_STATE]: Executing gateway state ignition sequence...");

        let quota_ledger = QuotaLedger::new(
            coordination_store.clone(),
            config.analytics_token_expiration_days,
        );

        let ingestion_queues = IngestionQueues::new(
            coordination_store.clone(),
            QueueKeys {
                operational_info: config.operational_info_queue_key.clone(),
                exposure_payload: config.exposure_payload_queue_key.clone(),
                exposure_payload_errors: config.exposure_payload_errors_queue_key.clone(),
            },
        );

        let used_salt_registry = UsedSaltRegistry::new(
            coordination_store.clone(),
            config.safety_net_max_skew_minutes as u64,
        );

        let task_broker = TaskBroker::new(
            coordination_store,
            BrokerKeys {
                authorization_ios: config.authorization_ios_queue_key.clone(),
                authorization_android: config.authorization_android_queue_key.clone(),
            },
        );

        Self {
            config,
            quota_ledger,
            ingestion_queues,
            used_salt_registry,
            task_broker,
        }
    }
}
// FIN DEL ARCHIVO [apps/gateway/src/state/mod.rs]
