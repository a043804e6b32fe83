// [libs/domain/models/src/lib.rs]

pub mod date_utils;
pub mod device_check;
pub mod enums;
pub mod exposure_data;
pub mod operational_info;

pub use device_check::DeviceCheckProbe;
pub use enums::{Platform, Province, ProvinceParseError, TransmissionRiskLevel};
pub use exposure_data::{
    ExposureDetectionSummary, ExposureInfo, ExposurePayload, PayloadFormatError,
};
pub use operational_info::OperationalInfo;
// FIN DEL ARCHIVO [libs/domain/models/src/lib.rs]
