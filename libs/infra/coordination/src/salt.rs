// [libs/infra/coordination/src/salt.rs]
/*!
 * =================================================================
 * APARATO: SINGLE-USE SALT REGISTRY (V4.1)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PRIMER USO LINEALIZABLE DE SALTS SAFETYNET
 *
 * # Mathematical Proof (First-Use Linearizability):
 * SET NX EX es una única operación linealizable: de N verificaciones
 * concurrentes con el mismo salt, exactamente una observa el set
 * exitoso y encola; el resto descarta sin efectos.
 * =================================================================
 */

use std::sync::Arc;
use std::time::Duration;

use crate::errors::CoordinationError;
use crate::store::CoordinationStore;

const SECONDS_PER_MINUTE: u64 = 60;

/// Clave del registro para un salt dado.
pub fn used_salt_key(salt: &str) -> String {
    format!("~safetynet-used-salt:{salt}")
}

/**
 * Registro de salts consumidos. La ventana de vida coincide con la
 * ventana de sesgo aceptada para la atestación: fuera de ella el
 * timestamp del JWS ya rechaza la repetición.
 */
#[derive(Clone)]
pub struct UsedSaltRegistry {
    coordination_store: Arc<dyn CoordinationStore>,
    max_skew_minutes: u64,
}

impl UsedSaltRegistry {
    pub fn new(coordination_store: Arc<dyn CoordinationStore>, max_skew_minutes: u64) -> Self {
        Self {
            coordination_store,
            max_skew_minutes,
        }
    }

    /// Camino rápido del handler: el salt ya fue visto.
    pub async fn is_salt_known(&self, salt: &str) -> Result<bool, CoordinationError> {
        self.coordination_store
            .string_exists(&used_salt_key(salt))
            .await
    }

    /**
     * Reclama el primer uso del salt. Devuelve true únicamente para
     * el primer escritor dentro de la ventana de sesgo.
     */
    pub async fn claim_first_use(&self, salt: &str) -> Result<bool, CoordinationError> {
        let time_to_live = Duration::from_secs(self.max_skew_minutes * SECONDS_PER_MINUTE);

        self.coordination_store
            .string_set_if_absent(&used_salt_key(salt), "1", time_to_live)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCoordinationStore;

    #[test]
    fn certify_salt_key_layout() {
        assert_eq!(
            used_salt_key("c2FsdHNhbHRzYWx0c2FsdHNhbHQ="),
            "~safetynet-used-salt:c2FsdHNhbHRzYWx0c2FsdHNhbHQ="
        );
    }

    #[tokio::test]
    async fn certify_first_use_exclusivity() {
        let store = Arc::new(MemoryCoordinationStore::new());
        let registry = UsedSaltRegistry::new(store.clone(), 10);

        assert!(!registry.is_salt_known("salt-a").await.unwrap());
        assert!(registry.claim_first_use("salt-a").await.unwrap());
        assert!(registry.is_salt_known("salt-a").await.unwrap());

        // El segundo reclamo dentro de la ventana debe fallar.
        assert!(!registry.claim_first_use("salt-a").await.unwrap());

        // La vida de la clave es exactamente la ventana de sesgo.
        let remaining = store
            .remaining_ttl(&used_salt_key("salt-a"))
            .expect("salt key must expire");
        assert!(remaining <= Duration::from_secs(600));
    }
}
// FIN DEL ARCHIVO [libs/infra/coordination/src/salt.rs]
