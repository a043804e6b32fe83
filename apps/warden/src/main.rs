// [apps/warden/src/main.rs]
/*!
 * =================================================================
 * APARATO: WARDEN MAIN ENTRY POINT (V4.1)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: LIGADURA DE ROL E IGNICIÓN SEGURA
 * =================================================================
 */

use clap::Parser;
use dotenvy::dotenv;
use tracing::error;

use sentinel_shared_config::SentinelConfig;
use sentinel_shared_watchtower::init_tracing;
use sentinel_warden::prelude::{WardenKernel, WardenRole};

/// Proceso de trasfondo del backend de analítica.
#[derive(Parser, Debug)]
#[command(name = "warden")]
struct WardenArguments {
    /// Rol operativo al que se liga este proceso.
    #[arg(long, value_enum)]
    role: WardenRole,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD (WATCHTOWER)
    init_tracing("sentinel_warden");

    // 3. LIGADURA DE ROL Y CAPTURA DE CONFIGURACIÓN
    let arguments = WardenArguments::parse();
    let config = match SentinelConfig::from_environment() {
        Ok(config) => config,
        Err(config_fault) => {
            error!("❌ [IGNITION_FAILED]: Environment capture collapsed: {}", config_fault);
            std::process::exit(1);
        }
    };

    // 4. IGNICIÓN DEL KERNEL LIGADO AL ROL
    WardenKernel::ignite_and_run(arguments.role, config).await
}
// FIN DEL ARCHIVO [apps/warden/src/main.rs]
