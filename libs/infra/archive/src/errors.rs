// [libs/infra/archive/src/errors.rs]
//! =================================================================
//! APARATO: ARCHIVE ERRORS (V3.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DEL ALMACÉN DURADERO
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    /// El detalle llega etiquetado desde el punto de fallo.
    #[error("{0}")]
    ConnectionFault(String),

    #[error("ARCHIVE_QUERY_FAULT: statement execution failed: {0}")]
    QueryFault(#[from] libsql::Error),

    #[error("ARCHIVE_TRANSACTION_FAULT: batch transaction collapsed")]
    TransactionFault,

    #[error("ARCHIVE_MAPPING_FAULT: domain serialization failed: {0}")]
    MappingFault(#[from] serde_json::Error),
}
// FIN DEL ARCHIVO [libs/infra/archive/src/errors.rs]
