// [libs/domain/models/src/enums.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN ENUMERATION STRATA (V4.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: PLATAFORMAS, PROVINCIAS Y NIVELES DE RIESGO
 * =================================================================
 */

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeserializeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Plataforma móvil de origen de una subida de operational info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Catálogo cerrado de los 107 códigos provinciales de dos letras.
const PROVINCE_CODES: &[&str] = &[
    "AG", "AL", "AN", "AO", "AP", "AQ", "AR", "AT", "AV", "BA", "BG", "BI", "BL", "BN", "BO",
    "BR", "BS", "BT", "BZ", "CA", "CB", "CE", "CH", "CL", "CN", "CO", "CR", "CS", "CT", "CZ",
    "EN", "FC", "FE", "FG", "FI", "FM", "FR", "GE", "GO", "GR", "IM", "IS", "KR", "LC", "LE",
    "LI", "LO", "LT", "LU", "MB", "MC", "ME", "MI", "MN", "MO", "MS", "MT", "NA", "NO", "NU",
    "OR", "PA", "PC", "PD", "PE", "PG", "PI", "PN", "PO", "PR", "PT", "PU", "PV", "PZ", "RA",
    "RC", "RE", "RG", "RI", "RM", "RN", "RO", "SA", "SI", "SO", "SP", "SR", "SS", "SU", "SV",
    "TA", "TE", "TN", "TO", "TP", "TR", "TS", "TV", "UD", "VA", "VB", "VC", "VE", "VI", "VR",
    "VT", "VV",
];

#[derive(Error, Debug, PartialEq, Eq)]
#[error("PROVINCE_FAULT: '{0}' is not a recognized province code")]
pub struct ProvinceParseError(pub String);

/**
 * Código provincial validado contra el catálogo cerrado.
 *
 * La validación ocurre en la frontera de deserialización: un valor
 * fuera del catálogo nunca entra al dominio.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Province(&'static str);

impl Province {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl FromStr for Province {
    type Err = ProvinceParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        PROVINCE_CODES
            .iter()
            .find(|code| **code == raw)
            .map(|code| Province(code))
            .ok_or_else(|| ProvinceParseError(raw.to_string()))
    }
}

impl fmt::Display for Province {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.0)
    }
}

impl Serialize for Province {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for Province {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(DeserializeError::custom)
    }
}

/// Nivel de riesgo de transmisión del framework Exposure Notification.
/// Valores enteros 0..=8 según la escala del proveedor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransmissionRiskLevel(u8);

impl TransmissionRiskLevel {
    pub const MAX_LEVEL: u8 = 8;

    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MAX_LEVEL).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Serialize for TransmissionRiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for TransmissionRiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        TransmissionRiskLevel::new(raw).ok_or_else(|| {
            DeserializeError::custom(format!(
                "RISK_LEVEL_FAULT: {raw} exceeds the known transmission risk scale"
            ))
        })
    }
}

// FIN DEL ARCHIVO [libs/domain/models/src/enums.rs]
