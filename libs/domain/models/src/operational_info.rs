// [libs/domain/models/src/operational_info.rs]
/*!
 * =================================================================
 * APARATO: OPERATIONAL INFO ENTITY (V4.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: REGISTRO ANÓNIMO DE ESTADO DE DISPOSITIVO
 *
 * # Mathematical Proof (Anonymity Invariant):
 * El registro no transporta ningún identificador de dispositivo ni de
 * usuario; la única dimensión geográfica es la provincia. La invariante
 * exposure_notification = false ⇒ last_risky_exposure_on = ausente se
 * sella en el constructor: ningún camino de código puede persistir una
 * fecha de exposición sin la notificación correspondiente.
 * =================================================================
 */

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{Platform, Province};

/// Registro de estado operativo subido por un cliente móvil.
/// Inmutable tras su creación; lo destruye sólo el barrido de retención.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalInfo {
    pub platform: Platform,
    pub province: Province,
    pub exposure_permission: bool,
    pub bluetooth_active: bool,
    pub notification_permission: bool,
    pub exposure_notification: bool,
    #[serde(default)]
    pub last_risky_exposure_on: Option<NaiveDate>,
}

impl OperationalInfo {
    /**
     * Construye el registro sellando la invariante de exposición:
     * sin notificación de exposición, la fecha de último contacto
     * riesgoso se descarta.
     */
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        platform: Platform,
        province: Province,
        exposure_permission: bool,
        bluetooth_active: bool,
        notification_permission: bool,
        exposure_notification: bool,
        last_risky_exposure_on: Option<NaiveDate>,
    ) -> Self {
        Self {
            platform,
            province,
            exposure_permission,
            bluetooth_active,
            notification_permission,
            exposure_notification,
            last_risky_exposure_on: exposure_notification
                .then_some(last_risky_exposure_on)
                .flatten(),
        }
    }

    /// Fecha de última exposición riesgosa en formato ISO, o cadena
    /// vacía si ausente. Es el fragmento que entra al nonce SafetyNet.
    pub fn last_risky_exposure_on_iso(&self) -> String {
        self.last_risky_exposure_on
            .map(|date| date.to_string())
            .unwrap_or_default()
    }
}

// FIN DEL ARCHIVO [libs/domain/models/src/operational_info.rs]
