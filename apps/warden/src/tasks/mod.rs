// [apps/warden/src/tasks/mod.rs]

pub mod authorize_analytics_token;
pub mod delete_old_data;
pub mod store_exposure_payloads;
pub mod store_operational_info;
pub mod verify_attestation;

pub use authorize_analytics_token::AuthorizationProtocol;
pub use verify_attestation::AttestationTask;
// FIN DEL ARCHIVO [apps/warden/src/tasks/mod.rs]
