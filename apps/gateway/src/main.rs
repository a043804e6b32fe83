// [apps/gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY MAIN ENTRY POINT (V4.1)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO E IGNICIÓN SEGURA
 * =================================================================
 */

use dotenvy::dotenv;
use tracing::error;

use sentinel_gateway::prelude::GatewayKernel;
use sentinel_shared_config::SentinelConfig;
use sentinel_shared_watchtower::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD (WATCHTOWER)
    init_tracing("sentinel_gateway");

    // 3. CAPTURA TIPADA DE CONFIGURACIÓN
    let config = match SentinelConfig::from_environment() {
        Ok(config) => config,
        Err(config_fault) => {
            error!("❌ [IGNITION_FAILED]: Environment capture collapsed: {}", config_fault);
            std::process::exit(1);
        }
    };

    // 4. IGNICIÓN DEL KERNEL Y SERVICIO HTTP
    let kernel_instance = GatewayKernel::ignite(config).await?;
    kernel_instance.launch().await
}
// FIN DEL ARCHIVO [apps/gateway/src/main.rs]
