// [libs/infra/archive/src/schema.rs]
/**
 * =================================================================
 * APARATO: ANALYTICS ARCHIVE SCHEMA (V3.1 - RETENTION READY)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. RETENTION STRATA: Ambas colecciones llevan 'created_at' indexado;
 *    el barrido de retención borra por umbral temporal explícito.
 * 2. IDEMPOTENCIA: DDL re-aplicable en caliente sin pérdida de datos.
 * 3. DOCUMENT PARITY: Los resúmenes de exposición viajan como columna
 *    JSON; el resto de campos se tipifican para consulta analítica.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, instrument};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las dos colecciones duraderas del backend de analítica.
 */
const ANALYTICS_TABLES: &[(&str, &str)] = &[
    (
        "TABLE_OPERATIONAL_INFO",
        r#"
        CREATE TABLE IF NOT EXISTS operational_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            platform TEXT NOT NULL,
            province TEXT NOT NULL,
            exposure_permission INTEGER NOT NULL,
            bluetooth_active INTEGER NOT NULL,
            notification_permission INTEGER NOT NULL,
            exposure_notification INTEGER NOT NULL,
            last_risky_exposure_on TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#,
    ),
    (
        "TABLE_EXPOSURE_PAYLOADS",
        r#"
        CREATE TABLE IF NOT EXISTS exposure_payloads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            province TEXT NOT NULL,
            symptoms_started_on TEXT,
            exposure_detection_summaries TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#,
    ),
];

/**
 * ESTRATO 2: ACELERACIÓN (Índices de Retención y Consulta)
 */
const ANALYTICS_INDEXES: &[(&str, &str)] = &[
    (
        "INDEX_OPERATIONAL_INFO_CREATED_AT",
        "CREATE INDEX IF NOT EXISTS idx_operational_info_created_at ON operational_info (created_at);",
    ),
    (
        "INDEX_EXPOSURE_PAYLOADS_CREATED_AT",
        "CREATE INDEX IF NOT EXISTS idx_exposure_payloads_created_at ON exposure_payloads (created_at);",
    ),
    (
        "INDEX_EXPOSURE_PAYLOADS_PROVINCE",
        "CREATE INDEX IF NOT EXISTS idx_exposure_payloads_province ON exposure_payloads (province);",
    ),
];

/**
 * Aplica el esquema completo de forma idempotente.
 */
#[instrument(skip(database_connection))]
pub async fn apply_analytics_schema(database_connection: &Connection) -> Result<()> {
    for (artifact_identifier, ddl_statement) in ANALYTICS_TABLES {
        database_connection
            .execute(ddl_statement, ())
            .await
            .with_context(|| format!("SCHEMA_FAULT: {artifact_identifier}"))?;
        debug!("🧱 [SCHEMA]: Artifact [{}] solidified.", artifact_identifier);
    }

    for (artifact_identifier, ddl_statement) in ANALYTICS_INDEXES {
        database_connection
            .execute(ddl_statement, ())
            .await
            .with_context(|| format!("SCHEMA_FAULT: {artifact_identifier}"))?;
        debug!("⚡ [SCHEMA]: Index [{}] energized.", artifact_identifier);
    }

    Ok(())
}
// FIN DEL ARCHIVO [libs/infra/archive/src/schema.rs]
