// [apps/warden/src/tasks/authorize_analytics_token.rs]
/*!
 * =================================================================
 * APARATO: IOS AUTHORIZATION PROTOCOL (V4.4 - RACE SHIELDED)
 * CLASIFICACIÓN: BACKGROUND TASK (ESTRATO L4)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS SOBRE LOS DOS BITS DEVICECHECK
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. THREE-READ PROTOCOL: Dos ventanas de espera uniformemente
 *    aleatorias separan las tres lecturas; una sesión concurrente no
 *    puede predecir la ventana y observa un estado no esperado.
 * 2. RELEASE GUARD: El descarte mensual y la persistencia del
 *    blacklisting ocurren sólo en el estrato de producción, para no
 *    inutilizar dispositivos de desarrollo.
 * 3. FAIL CLOSED: Cualquier fallo del túnel Apple aborta sin
 *    autorizar y sin blacklistear.
 *
 * # State Diagram (per device):
 *   default(F,F) --R1 default--> default(F,F) --W--> mid(T,F)
 *                                    --R3 auth--> default(F,F) [AUTH]
 *                                    --R3 other--> blacklist(T,T)
 *   default(F,F) --R1 used_this_month--> [DISCARD]
 *   any --R* not-expected--> blacklist(T,T)
 * =================================================================
 */

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, instrument, warn};

use sentinel_infra_coordination::{IosAuthorizationJob, QuotaLedger};
use sentinel_infra_devicecheck::{DeviceCheckError, DeviceCheckGateway};
use sentinel_shared_config::Environment;
use sentinel_shared_watchtower::metrics::{
    AUTHORIZE_ANALYTICS_TOKEN_AUTHORIZED, AUTHORIZE_ANALYTICS_TOKEN_BLACKLISTED,
    AUTHORIZE_ANALYTICS_TOKEN_FIRST_STEP_BEGIN, AUTHORIZE_ANALYTICS_TOKEN_SECOND_STEP_BEGIN,
    AUTHORIZE_ANALYTICS_TOKEN_THIRD_STEP_BEGIN,
};

/// Desenlaces que abortan el protocolo antes de la autorización.
enum ProtocolAbort {
    /// El dispositivo ya validó un token este mes: el analytics token
    /// se descarta sin castigo.
    DiscardToken,
    /// Configuración de bits no esperada: sesión concurrente o abuso.
    BlacklistDevice,
    /// Fallo del túnel Apple: abortar sin efectos.
    ApiFault,
}

impl From<DeviceCheckError> for ProtocolAbort {
    fn from(_fault: DeviceCheckError) -> Self {
        ProtocolAbort::ApiFault
    }
}

/// Ventana de espera uniforme [min, max] en segundos.
#[derive(Debug, Clone, Copy)]
pub struct SleepWindow {
    pub min_seconds: u64,
    pub max_seconds: u64,
}

impl SleepWindow {
    fn sample(&self) -> Duration {
        let seconds = rand::thread_rng()
            .gen_range(self.min_seconds as f64..=self.max_seconds as f64);
        Duration::from_secs_f64(seconds)
    }
}

pub struct AuthorizationProtocol {
    device_check_gateway: Arc<dyn DeviceCheckGateway>,
    quota_ledger: QuotaLedger,
    environment: Environment,
    check_window: SleepWindow,
    read_window: SleepWindow,
}

impl AuthorizationProtocol {
    pub fn new(
        device_check_gateway: Arc<dyn DeviceCheckGateway>,
        quota_ledger: QuotaLedger,
        environment: Environment,
        check_window: SleepWindow,
        read_window: SleepWindow,
    ) -> Self {
        Self {
            device_check_gateway,
            quota_ledger,
            environment,
            check_window,
            read_window,
        }
    }

    /**
     * Ejecuta el protocolo completo para un trabajo del broker.
     * Nunca propaga error: cada desenlace queda en el rastro.
     */
    #[instrument(skip_all)]
    pub async fn authorize_analytics_token(&self, job: &IosAuthorizationJob) {
        match self.execute_protocol(&job.device_token).await {
            Ok(()) => {
                if let Err(ledger_fault) = self.quota_ledger.issue(&job.analytics_token).await {
                    warn!(
                        error = %ledger_fault,
                        "💥 [AUTHORIZATION]: Quota issuance failed after a clean protocol run."
                    );
                    return;
                }
                AUTHORIZE_ANALYTICS_TOKEN_AUTHORIZED.inc();
            }
            Err(ProtocolAbort::BlacklistDevice) => {
                self.blacklist_device(&job.device_token).await;
            }
            Err(ProtocolAbort::DiscardToken) | Err(ProtocolAbort::ApiFault) => {}
        }
    }

    async fn execute_protocol(&self, device_token: &str) -> Result<(), ProtocolAbort> {
        self.first_step(device_token).await?;
        tokio::time::sleep(self.check_window.sample()).await;
        self.second_step(device_token).await?;
        tokio::time::sleep(self.read_window.sample()).await;
        self.third_step(device_token).await
    }

    /**
     * Lectura 1: el dispositivo debe estar fresco. En producción, un
     * uso previo dentro del mes descarta el token sin blacklistear.
     */
    async fn first_step(&self, device_token: &str) -> Result<(), ProtocolAbort> {
        AUTHORIZE_ANALYTICS_TOKEN_FIRST_STEP_BEGIN.inc();
        let probe = self.device_check_gateway.fetch_bits(device_token).await?;

        if self.environment.is_release() && probe.used_in_current_month() {
            warn!(
                bit0 = probe.bit0,
                bit1 = probe.bit1,
                last_update_time = ?probe.last_update_time,
                "🗓️ [AUTHORIZATION]: Device already authorized a token in the current month."
            );
            return Err(ProtocolAbort::DiscardToken);
        }

        if !probe.is_default_configuration() {
            warn!(
                bit0 = probe.bit0,
                bit1 = probe.bit1,
                "🚨 [AUTHORIZATION]: Non-default configuration in the first step."
            );
            return Err(ProtocolAbort::BlacklistDevice);
        }

        Ok(())
    }

    /**
     * Lectura 2: tras la primera ventana aleatoria los bits deben
     * seguir frescos; entonces se marca el protocolo en curso (T,F).
     */
    async fn second_step(&self, device_token: &str) -> Result<(), ProtocolAbort> {
        AUTHORIZE_ANALYTICS_TOKEN_SECOND_STEP_BEGIN.inc();
        let probe = self.device_check_gateway.fetch_bits(device_token).await?;

        if !probe.is_default_configuration() {
            warn!(
                bit0 = probe.bit0,
                bit1 = probe.bit1,
                "🚨 [AUTHORIZATION]: Non-default configuration in the second step."
            );
            return Err(ProtocolAbort::BlacklistDevice);
        }

        self.device_check_gateway
            .set_bits(device_token, true, false)
            .await?;
        Ok(())
    }

    /**
     * Lectura 3: sólo esta sesión debe haber marcado (T,F); entonces
     * se liberan los bits (F,F) y el token queda autorizable.
     */
    async fn third_step(&self, device_token: &str) -> Result<(), ProtocolAbort> {
        AUTHORIZE_ANALYTICS_TOKEN_THIRD_STEP_BEGIN.inc();
        let probe = self.device_check_gateway.fetch_bits(device_token).await?;

        if !probe.is_authorized() {
            warn!(
                bit0 = probe.bit0,
                bit1 = probe.bit1,
                "🚨 [AUTHORIZATION]: Unexpected configuration in the third step."
            );
            return Err(ProtocolAbort::BlacklistDevice);
        }

        self.device_check_gateway
            .set_bits(device_token, false, false)
            .await?;
        Ok(())
    }

    /**
     * Sella (T,T) en el dispositivo. La persistencia ocurre sólo en
     * producción para no inutilizar dispositivos de desarrollo.
     */
    async fn blacklist_device(&self, device_token: &str) {
        if self.environment.is_release() {
            if let Err(write_fault) = self
                .device_check_gateway
                .set_bits(device_token, true, true)
                .await
            {
                warn!(
                    error = %write_fault,
                    "💥 [AUTHORIZATION]: Blacklist write did not reach the DeviceCheck API."
                );
            }
        }
        AUTHORIZE_ANALYTICS_TOKEN_BLACKLISTED.inc();
        info!("⛔ [AUTHORIZATION]: Device blacklisted; token not authorized.");
    }
}
// FIN DEL ARCHIVO [apps/warden/src/tasks/authorize_analytics_token.rs]
