// [libs/infra/devicecheck/src/lib.rs]

pub mod client;
pub mod errors;

pub use client::{AppleDeviceCheckClient, DeviceCheckGateway};
pub use errors::DeviceCheckError;
// FIN DEL ARCHIVO [libs/infra/devicecheck/src/lib.rs]
