// [apps/gateway/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY SOVEREIGN KERNEL (V4.2)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * # Mathematical Proof (Deterministic Ignition):
 * El enlace con el almacén de coordinación se establece antes de abrir
 * el socket TCP, previniendo la ventana en la que un cliente recibiría
 * 5xx por un pool aún no inicializado.
 * =================================================================
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tracing::{info, instrument};

use sentinel_infra_coordination::RedisCoordinationClient;
use sentinel_shared_config::SentinelConfig;

use crate::routes::create_analytics_router;
use crate::state::AppState;

pub struct GatewayKernel {
    pub server_network_port: u16,
    pub application_shared_state: AppState,
}

impl GatewayKernel {
    /**
     * Realiza la ignición del enlace de coordinación y el estado
     * compartido del gateway.
     */
    #[instrument(skip(config))]
    pub async fn ignite(config: SentinelConfig) -> anyhow::Result<Self> {
        let coordination_client =
            RedisCoordinationClient::connect(&config.analytics_redis_url).await?;

        let shared_config = Arc::new(config);

        Ok(Self {
            server_network_port: shared_config.listening_network_port,
            application_shared_state: AppState::new(
                shared_config,
                Arc::new(coordination_client),
            ),
        })
    }

    /**
     * Levanta el servidor HTTP y bloquea hasta la señal de apagado.
     */
    pub async fn launch(self) -> anyhow::Result<()> {
        let listening_address =
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.server_network_port);

        let analytics_router = create_analytics_router(self.application_shared_state);

        info!(
            "🚀 [GATEWAY_ONLINE]: Analytics surface operational on port {}.",
            self.server_network_port
        );

        let tcp_listener = tokio::net::TcpListener::bind(listening_address).await?;
        axum::serve(tcp_listener, analytics_router)
            .with_graceful_shutdown(wait_for_shutdown_signal())
            .await?;

        info!("🛑 [GATEWAY_OFFLINE]: Analytics surface drained and closed.");
        Ok(())
    }
}

async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("📴 [GATEWAY]: Shutdown signal received; draining connections.");
}
// FIN DEL ARCHIVO [apps/gateway/src/kernel.rs]
