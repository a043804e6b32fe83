// [apps/warden/src/tasks/verify_attestation.rs]
/*!
 * =================================================================
 * APARATO: SAFETYNET VERIFICATION TASK (V4.2)
 * CLASIFICACIÓN: BACKGROUND TASK (ESTRATO L4)
 * RESPONSABILIDAD: VERIFICAR, RECLAMAR EL SALT Y ENCOLAR
 *
 * # Mathematical Proof (Exactly-One Enqueue):
 * El reclamo del salt es un set-if-absent linealizable posterior a la
 * verificación: de N trabajos concurrentes con el mismo salt válido,
 * exactamente uno encola el registro. El cliente ya recibió 204; todo
 * rechazo es silencioso hacia afuera.
 * =================================================================
 */

use tracing::{instrument, warn};

use sentinel_domain_attestation::AttestationVerifier;
use sentinel_infra_coordination::{AndroidVerificationJob, IngestionQueues, UsedSaltRegistry};
use sentinel_shared_watchtower::metrics::OPERATIONAL_INFO_ANDROID_REUSED_SALT;

pub struct AttestationTask {
    attestation_verifier: AttestationVerifier,
    used_salt_registry: UsedSaltRegistry,
    ingestion_queues: IngestionQueues,
}

impl AttestationTask {
    pub fn new(
        attestation_verifier: AttestationVerifier,
        used_salt_registry: UsedSaltRegistry,
        ingestion_queues: IngestionQueues,
    ) -> Self {
        Self {
            attestation_verifier,
            used_salt_registry,
            ingestion_queues,
        }
    }

    /**
     * Procesa un trabajo de verificación del broker. Nunca propaga
     * error: la atestación rechazada termina en silencio.
     */
    #[instrument(skip_all)]
    pub async fn verify_and_record(&self, job: &AndroidVerificationJob) {
        if self
            .attestation_verifier
            .verify_attestation(
                &job.signed_attestation,
                &job.salt,
                &job.operational_info,
                &job.last_risky_exposure_on,
            )
            .is_err()
        {
            // El detalle ya quedó en el rastro del verificador.
            return;
        }

        // Este salt queda inutilizable durante la ventana de sesgo.
        match self.used_salt_registry.claim_first_use(&job.salt).await {
            Ok(true) => {
                if let Err(enqueue_fault) = self
                    .ingestion_queues
                    .enqueue_operational_info(&job.operational_info)
                    .await
                {
                    warn!(
                        error = %enqueue_fault,
                        "💥 [SAFETYNET_TASK]: Enqueue failed after salt claim; record lost."
                    );
                }
            }
            Ok(false) => {
                warn!("♻️ [SAFETYNET_TASK]: Found previously used salt.");
                OPERATIONAL_INFO_ANDROID_REUSED_SALT
                    .with_label_values(&["true"])
                    .inc();
            }
            Err(store_fault) => {
                warn!(
                    error = %store_fault,
                    "💥 [SAFETYNET_TASK]: Salt claim failed against the coordination store."
                );
            }
        }
    }
}
// FIN DEL ARCHIVO [apps/warden/src/tasks/verify_attestation.rs]
