// [libs/domain/models/src/device_check.rs]
/*!
 * =================================================================
 * APARATO: DEVICECHECK PROBE MODEL (V4.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: LECTURA DE LOS DOS BITS PER-DEVICE DE APPLE
 *
 * # Mathematical Proof (Three-State Lock):
 * Los dos bits codifican un marcador de tres estados por dispositivo:
 * (F,F) = fresco, (T,F) = protocolo en curso, (T,T) = blacklisted.
 * Una sesión concurrente observa un estado no esperado en alguna de
 * sus lecturas y es expulsada, serializando el protocolo por device
 * token sin coordinar procesos.
 * =================================================================
 */

use chrono::NaiveDate;
use serde::Deserialize;

use crate::date_utils::current_month_start;

/// Instantánea de los bits DeviceCheck devuelta por la API de Apple.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceCheckProbe {
    pub bit0: bool,
    pub bit1: bool,
    /// Mes de última escritura en formato "YYYY-MM", si existe.
    #[serde(default)]
    pub last_update_time: Option<String>,
}

impl DeviceCheckProbe {
    /// Instantánea de un dispositivo que nunca escribió sus bits.
    pub fn pristine() -> Self {
        Self {
            bit0: false,
            bit1: false,
            last_update_time: None,
        }
    }

    fn last_update_month(&self) -> Option<NaiveDate> {
        let month = self.last_update_time.as_deref()?;
        format!("{month}-01").parse().ok()
    }

    /// Si el dispositivo ya validó un token en el mes corriente.
    /// Un mes futuro también cuenta como usado; el predicado es
    /// deliberadamente liberal ante relojes adelantados.
    pub fn used_in_current_month(&self) -> bool {
        self.last_update_month()
            .is_some_and(|month| current_month_start() <= month)
    }

    /// Configuración esperada en la primera y segunda lectura: ambos
    /// bits apagados.
    pub fn is_default_configuration(&self) -> bool {
        !self.bit0 && !self.bit1
    }

    /// Configuración esperada en la tercera lectura: bit0 encendido,
    /// bit1 apagado.
    pub fn is_authorized(&self) -> bool {
        self.bit0 && !self.bit1
    }

    /// Configuración de dispositivo expulsado: ambos bits encendidos.
    pub fn is_blacklisted(&self) -> bool {
        self.bit0 && self.bit1
    }
}

// FIN DEL ARCHIVO [libs/domain/models/src/device_check.rs]
