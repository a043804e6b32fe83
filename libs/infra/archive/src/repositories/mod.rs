// [libs/infra/archive/src/repositories/mod.rs]

pub mod exposure_payload;
pub mod operational_info;

pub use exposure_payload::ExposurePayloadRepository;
pub use operational_info::OperationalInfoRepository;
// FIN DEL ARCHIVO [libs/infra/archive/src/repositories/mod.rs]
