// [libs/infra/archive/src/repositories/exposure_payload.rs]
/*!
 * =================================================================
 * APARATO: EXPOSURE PAYLOAD REPOSITORY (V3.2)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA POR LOTES DE CARGAS DE EXPOSICIÓN
 * =================================================================
 */

use chrono::{DateTime, Utc};
use libsql::{params, Value};
use tracing::{info, instrument};

use sentinel_domain_models::ExposurePayload;

use crate::client::ArchiveClient;
use crate::errors::ArchiveError;

const INSERT_EXPOSURE_PAYLOAD: &str = "
    INSERT INTO exposure_payloads (
        province, symptoms_started_on, exposure_detection_summaries
    ) VALUES (?1, ?2, ?3)
";

const DELETE_OLDER_THAN: &str = "DELETE FROM exposure_payloads WHERE created_at <= ?1";

pub struct ExposurePayloadRepository {
    archive_client: ArchiveClient,
}

impl ExposurePayloadRepository {
    pub fn new(archive_client: ArchiveClient) -> Self {
        Self { archive_client }
    }

    /**
     * Inserta el lote completo en una única transacción. Los resúmenes
     * de detección se sellan como columna JSON (contrato documental).
     */
    #[instrument(skip(self, payloads), fields(batch = payloads.len()))]
    pub async fn insert_many(&self, payloads: &[ExposurePayload]) -> Result<u64, ArchiveError> {
        if payloads.is_empty() {
            return Ok(0);
        }

        let database_connection = self.archive_client.get_connection()?;
        let database_transaction = database_connection
            .transaction()
            .await
            .map_err(|_| ArchiveError::TransactionFault)?;

        for payload in payloads {
            let serialized_summaries =
                serde_json::to_string(&payload.exposure_detection_summaries)?;

            let symptoms_started_on = match payload.symptoms_started_on {
                Some(date) => Value::from(date.to_string()),
                None => Value::Null,
            };

            database_transaction
                .execute(
                    INSERT_EXPOSURE_PAYLOAD,
                    params![
                        payload.province.as_str(),
                        symptoms_started_on,
                        serialized_summaries,
                    ],
                )
                .await?;
        }

        database_transaction
            .commit()
            .await
            .map_err(|_| ArchiveError::TransactionFault)?;

        Ok(payloads.len() as u64)
    }

    /**
     * Elimina todas las cargas creadas antes del umbral dado.
     */
    #[instrument(skip(self))]
    pub async fn delete_older_than(
        &self,
        reference_timestamp: DateTime<Utc>,
    ) -> Result<u64, ArchiveError> {
        let database_connection = self.archive_client.get_connection()?;

        let deleted_count = database_connection
            .execute(
                DELETE_OLDER_THAN,
                params![reference_timestamp.format("%Y-%m-%d %H:%M:%S").to_string()],
            )
            .await?;

        info!(
            deleted = deleted_count,
            created_before = %reference_timestamp,
            "🧹 [RETENTION]: ExposurePayload documents deletion completed."
        );
        Ok(deleted_count)
    }
}
// FIN DEL ARCHIVO [libs/infra/archive/src/repositories/exposure_payload.rs]
