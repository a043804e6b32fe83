// [libs/infra/archive/src/client.rs]
/*!
 * =================================================================
 * APARATO: ARCHIVE CONNECTION CLIENT (V3.4 - ENDPOINT CLASSIFIED)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES DURADEROS Y BOOTSTRAP DE ESQUEMA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ENDPOINT TAXONOMY: La URL se clasifica una sola vez en un destino
 *    remoto, de disco o volátil; cada variante conoce su propio modo
 *    de apertura y sus requisitos de credenciales.
 * 2. SINGLE BOOTSTRAP PATH: El esquema se aplica sobre una única
 *    conexión de arranque; en destinos volátiles esa misma conexión
 *    queda retenida como ancla del segmento de memoria compartido.
 * =================================================================
 */

use std::sync::Arc;

use libsql::{Builder, Connection, Database};
use tracing::{error, info, instrument};

use crate::errors::ArchiveError;
use crate::schema::apply_analytics_schema;

/// Destino clasificado del archivo duradero.
enum ArchiveEndpoint {
    /// Cluster libSQL remoto; exige token de acceso.
    Remote { url: String, access_token: String },
    /// Fichero local en disco.
    LocalFile(String),
    /// Base volátil en RAM; sobrevive sólo mientras exista una
    /// conexión abierta sobre ella.
    Volatile(String),
}

impl ArchiveEndpoint {
    fn classify(
        archive_url: &str,
        access_token: Option<String>,
    ) -> Result<Self, ArchiveError> {
        if archive_url.is_empty() {
            return Err(ArchiveError::ConnectionFault(
                "ARCHIVE_ENDPOINT_UNDEFINED: no durable store url configured".into(),
            ));
        }

        if archive_url.starts_with("libsql://") || archive_url.starts_with("https://") {
            let access_token = access_token.ok_or_else(|| {
                ArchiveError::ConnectionFault(
                    "ARCHIVE_CREDENTIALS_MISSING: remote archive requires an access token".into(),
                )
            })?;
            return Ok(ArchiveEndpoint::Remote {
                url: archive_url.to_string(),
                access_token,
            });
        }

        if archive_url.contains(":memory:") || archive_url.contains("mode=memory") {
            return Ok(ArchiveEndpoint::Volatile(archive_url.to_string()));
        }

        Ok(ArchiveEndpoint::LocalFile(archive_url.to_string()))
    }

    fn is_volatile(&self) -> bool {
        matches!(self, ArchiveEndpoint::Volatile(_))
    }

    async fn open(&self) -> Result<Database, ArchiveError> {
        let build_outcome = match self {
            ArchiveEndpoint::Remote { url, access_token } => {
                Builder::new_remote(url.clone(), access_token.clone())
                    .build()
                    .await
            }
            ArchiveEndpoint::LocalFile(path) | ArchiveEndpoint::Volatile(path) => {
                Builder::new_local(path).build().await
            }
        };

        build_outcome.map_err(|open_fault| {
            ArchiveError::ConnectionFault(format!("ARCHIVE_OPEN_FAULT: {open_fault}"))
        })
    }
}

#[derive(Clone)]
pub struct ArchiveClient {
    durable_database: Arc<Database>,
    /// Conexión de arranque retenida: en destinos volátiles mantiene
    /// vivo el segmento de memoria donde reside el esquema.
    retained_ignition_connection: Option<Arc<Connection>>,
}

impl ArchiveClient {
    /**
     * Clasifica el destino, abre el driver y aplica el esquema sobre
     * la conexión de arranque en un único camino.
     *
     * # Errors:
     * - `ArchiveError::ConnectionFault`: URL vacía, credenciales
     *   ausentes para un destino remoto, o fallo de apertura/esquema.
     */
    #[instrument(skip(access_token))]
    pub async fn connect(
        archive_url: &str,
        access_token: Option<String>,
    ) -> Result<Self, ArchiveError> {
        let endpoint = ArchiveEndpoint::classify(archive_url, access_token)?;

        info!("🗄️ [ARCHIVE]: Opening durable analytics archive...");
        let durable_database = Arc::new(endpoint.open().await?);

        let ignition_connection = durable_database.connect().map_err(|link_fault| {
            ArchiveError::ConnectionFault(format!("ARCHIVE_IGNITION_FAULT: {link_fault}"))
        })?;

        apply_analytics_schema(&ignition_connection)
            .await
            .map_err(|schema_fault| {
                ArchiveError::ConnectionFault(format!("ARCHIVE_SCHEMA_FAULT: {schema_fault}"))
            })?;

        let retained_ignition_connection = if endpoint.is_volatile() {
            info!("🧷 [ARCHIVE]: Volatile archive pinned through its bootstrap connection.");
            Some(Arc::new(ignition_connection))
        } else {
            None
        };

        Ok(Self {
            durable_database,
            retained_ignition_connection,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, ArchiveError> {
        self.durable_database.connect().map_err(|link_fault| {
            error!("⚠️ [ARCHIVE]: Could not allocate a connection: {}", link_fault);
            ArchiveError::ConnectionFault(format!("ARCHIVE_LINK_FAULT: {link_fault}"))
        })
    }
}

// FIN DEL ARCHIVO [libs/infra/archive/src/client.rs]
