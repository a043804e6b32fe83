// [libs/infra/archive/src/repositories/operational_info.rs]
/*!
 * =================================================================
 * APARATO: OPERATIONAL INFO REPOSITORY (V3.2)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA POR LOTES Y BARRIDO DE RETENCIÓN
 *
 * # Mathematical Proof (Batch Atomicity):
 * El lote completo viaja dentro de una transacción: un fallo a mitad
 * de inserción no deja registros parciales visibles. El contrato del
 * pipeline es at-least-once-or-lost; los elementos ya recortados de
 * la cola no se re-entregan.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use libsql::{params, Value};
use tracing::{info, instrument};

use sentinel_domain_models::OperationalInfo;

use crate::client::ArchiveClient;
use crate::errors::ArchiveError;

const INSERT_OPERATIONAL_INFO: &str = "
    INSERT INTO operational_info (
        platform, province, exposure_permission, bluetooth_active,
        notification_permission, exposure_notification, last_risky_exposure_on
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
";

const DELETE_OLDER_THAN: &str = "DELETE FROM operational_info WHERE created_at <= ?1";

pub struct OperationalInfoRepository {
    archive_client: ArchiveClient,
}

impl OperationalInfoRepository {
    pub fn new(archive_client: ArchiveClient) -> Self {
        Self { archive_client }
    }

    /**
     * Inserta el lote completo en una única transacción.
     * Devuelve la cantidad de registros persistidos.
     */
    #[instrument(skip(self, records), fields(batch = records.len()))]
    pub async fn insert_many(&self, records: &[OperationalInfo]) -> Result<u64, ArchiveError> {
        if records.is_empty() {
            return Ok(0);
        }

        let database_connection = self.archive_client.get_connection()?;
        let database_transaction = database_connection
            .transaction()
            .await
            .map_err(|_| ArchiveError::TransactionFault)?;

        for record in records {
            let last_risky_exposure_on = match record.last_risky_exposure_on {
                Some(date) => Value::from(date.to_string()),
                None => Value::Null,
            };

            database_transaction
                .execute(
                    INSERT_OPERATIONAL_INFO,
                    params![
                        record.platform.as_str(),
                        record.province.as_str(),
                        i64::from(record.exposure_permission),
                        i64::from(record.bluetooth_active),
                        i64::from(record.notification_permission),
                        i64::from(record.exposure_notification),
                        last_risky_exposure_on,
                    ],
                )
                .await?;
        }

        database_transaction
            .commit()
            .await
            .map_err(|_| ArchiveError::TransactionFault)?;

        Ok(records.len() as u64)
    }

    /**
     * Elimina todos los registros creados antes del umbral dado.
     * Devuelve la cantidad de registros eliminados.
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
            "🧹 [RETENTION]: OperationalInfo documents deletion completed."
        );
        Ok(deleted_count)
    }
}
// FIN DEL ARCHIVO [libs/infra/archive/src/repositories/operational_info.rs]
