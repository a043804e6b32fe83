// [libs/infra/archive/src/lib.rs]

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::ArchiveClient;
pub use errors::ArchiveError;
pub use repositories::{ExposurePayloadRepository, OperationalInfoRepository};
// FIN DEL ARCHIVO [libs/infra/archive/src/lib.rs]
