// [apps/warden/src/tasks/delete_old_data.rs]
/*!
 * =================================================================
 * APARATO: RETENTION SWEEPER (V4.1)
 * CLASIFICACIÓN: SCHEDULED TASK (ESTRATO L4)
 * RESPONSABILIDAD: BORRADO DE DOCUMENTOS MÁS ALLÁ DEL HORIZONTE
 * =================================================================
 */

use chrono::{Duration, Utc};
use tracing::instrument;

use sentinel_infra_archive::{ExposurePayloadRepository, OperationalInfoRepository};
use sentinel_shared_watchtower::metrics::{DELETED_EXPOSURE_PAYLOAD, DELETED_OPERATIONAL_INFO};

/**
 * Elimina de ambas colecciones todo documento creado antes de
 * `now − data_retention_days`.
 */
#[instrument(skip(exposure_repository, operational_repository))]
pub async fn run(
    exposure_repository: &ExposurePayloadRepository,
    operational_repository: &OperationalInfoRepository,
    data_retention_days: i64,
) -> anyhow::Result<()> {
    let reference_timestamp = Utc::now() - Duration::days(data_retention_days);

    let deleted_exposure_payloads = exposure_repository
        .delete_older_than(reference_timestamp)
        .await?;
    if deleted_exposure_payloads > 0 {
        DELETED_EXPOSURE_PAYLOAD.inc_by(deleted_exposure_payloads);
    }

    let deleted_operational_infos = operational_repository
        .delete_older_than(reference_timestamp)
        .await?;
    if deleted_operational_infos > 0 {
        DELETED_OPERATIONAL_INFO.inc_by(deleted_operational_infos);
    }

    Ok(())
}
// FIN DEL ARCHIVO [apps/warden/src/tasks/delete_old_data.rs]
