// [libs/infra/coordination/src/broker.rs]
/*!
 * =================================================================
 * APARATO: PERSISTENT TASK BROKER (V4.2 - EXPLICIT REGISTRATION)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: DESPACHO DURADERO DE TRABAJOS DE AUTORIZACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DURABILITY: Los sobres viajan como JSON en listas del almacén de
 *    coordinación; un worker caído no pierde trabajos pendientes.
 * 2. ROLE ISOLATION: Una cola por familia de trabajo (iOS / Android);
 *    cada proceso worker se liga a una sola en el arranque.
 * 3. POISON TOLERANCE: Un sobre indecodificable se registra y se
 *    descarta; nunca bloquea el consumo de la cola.
 * =================================================================
 */

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use sentinel_domain_models::OperationalInfo;

use crate::errors::CoordinationError;
use crate::store::CoordinationStore;

/// Trabajo de autorización del protocolo DeviceCheck (iOS).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosAuthorizationJob {
    pub analytics_token: String,
    pub device_token: String,
}

/// Trabajo de verificación de atestación SafetyNet (Android).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndroidVerificationJob {
    pub signed_attestation: String,
    pub salt: String,
    pub operational_info: OperationalInfo,
    /// Fecha ISO de última exposición riesgosa, o cadena vacía.
    pub last_risky_exposure_on: String,
}

/// Claves de las colas del broker.
#[derive(Debug, Clone)]
pub struct BrokerKeys {
    pub authorization_ios: String,
    pub authorization_android: String,
}

/**
 * Broker de tareas sobre el almacén de coordinación. El gateway
 * publica; los procesos warden consumen con pop bloqueante.
 */
#[derive(Clone)]
pub struct TaskBroker {
    coordination_store: Arc<dyn CoordinationStore>,
    keys: BrokerKeys,
}

impl TaskBroker {
    pub fn new(coordination_store: Arc<dyn CoordinationStore>, keys: BrokerKeys) -> Self {
        Self {
            coordination_store,
            keys,
        }
    }

    #[instrument(skip(self, job))]
    pub async fn dispatch_ios_authorization(
        &self,
        job: &IosAuthorizationJob,
    ) -> Result<(), CoordinationError> {
        let envelope = serde_json::to_string(job)?;
        self.coordination_store
            .list_push_right(&self.keys.authorization_ios, &[envelope])
            .await
    }

    #[instrument(skip(self, job))]
    pub async fn dispatch_android_verification(
        &self,
        job: &AndroidVerificationJob,
    ) -> Result<(), CoordinationError> {
        let envelope = serde_json::to_string(job)?;
        self.coordination_store
            .list_push_right(&self.keys.authorization_android, &[envelope])
            .await
    }

    /**
     * Extrae el siguiente trabajo iOS. Un sobre corrupto se descarta
     * con rastro de advertencia y se devuelve None.
     */
    pub async fn next_ios_authorization(
        &self,
        timeout: Duration,
    ) -> Result<Option<IosAuthorizationJob>, CoordinationError> {
        let Some(envelope) = self
            .coordination_store
            .list_pop_blocking(&self.keys.authorization_ios, timeout)
            .await?
        else {
            return Ok(None);
        };

        match serde_json::from_str(&envelope) {
            Ok(job) => Ok(Some(job)),
            Err(decode_fault) => {
                warn!(
                    queue = %self.keys.authorization_ios,
                    error = %decode_fault,
                    "🗑️ [TASK_BROKER]: Dropping undecodable job envelope."
                );
                Ok(None)
            }
        }
    }

    /// Extrae el siguiente trabajo Android, con la misma tolerancia a
    /// sobres corruptos que el consumo iOS.
    pub async fn next_android_verification(
        &self,
        timeout: Duration,
    ) -> Result<Option<AndroidVerificationJob>, CoordinationError> {
        let Some(envelope) = self
            .coordination_store
            .list_pop_blocking(&self.keys.authorization_android, timeout)
            .await?
        else {
            return Ok(None);
        };

        match serde_json::from_str(&envelope) {
            Ok(job) => Ok(Some(job)),
            Err(decode_fault) => {
                warn!(
                    queue = %self.keys.authorization_android,
                    error = %decode_fault,
                    "🗑️ [TASK_BROKER]: Dropping undecodable job envelope."
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCoordinationStore;
    use sentinel_domain_models::Platform;

    fn broker_over_memory() -> (TaskBroker, Arc<MemoryCoordinationStore>) {
        let store = Arc::new(MemoryCoordinationStore::new());
        let broker = TaskBroker::new(
            store.clone(),
            BrokerKeys {
                authorization_ios: "authorization_ios".to_string(),
                authorization_android: "authorization_android".to_string(),
            },
        );
        (broker, store)
    }

    #[tokio::test]
    async fn certify_ios_job_roundtrip() {
        let (broker, _store) = broker_over_memory();
        let job = IosAuthorizationJob {
            analytics_token: "a".repeat(128),
            device_token: "ZGV2".to_string(),
        };

        broker.dispatch_ios_authorization(&job).await.unwrap();
        let consumed = broker
            .next_ios_authorization(Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(consumed, Some(job));
    }

    #[tokio::test]
    async fn certify_android_job_roundtrip() {
        let (broker, _store) = broker_over_memory();
        let job = AndroidVerificationJob {
            signed_attestation: "header.payload.signature".to_string(),
            salt: "c2FsdA==".to_string(),
            operational_info: OperationalInfo::new(
                Platform::Android,
                "FI".parse().unwrap(),
                true,
                true,
                true,
                false,
                None,
            ),
            last_risky_exposure_on: String::new(),
        };

        broker.dispatch_android_verification(&job).await.unwrap();
        let consumed = broker
            .next_android_verification(Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(consumed, Some(job));
    }

    #[tokio::test]
    async fn certify_poison_envelope_tolerance() {
        let (broker, store) = broker_over_memory();

        store
            .list_push_right("authorization_ios", &["{not-a-job}".to_string()])
            .await
            .unwrap();

        let consumed = broker
            .next_ios_authorization(Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(consumed, None);
        // El sobre venenoso fue extraído y descartado.
        assert_eq!(store.list_length("authorization_ios").await.unwrap(), 0);
    }
}
// FIN DEL ARCHIVO [libs/infra/coordination/src/broker.rs]
