// [libs/infra/coordination/src/store.rs]
/*!
 * =================================================================
 * APARATO: COORDINATION STORE ADAPTER (V4.2 - PIPELINE ATOMIC)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: OPERACIONES TIPADAS SOBRE EL ALMACÉN VOLÁTIL
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. OBJECT SEAM: El trait 'CoordinationStore' es la costura que
 *    permite inyectar el doble de pruebas en memoria sin tocar la
 *    lógica de ledger, colas ni broker.
 * 2. ATOMICITY: Las parejas SADD+EXPIRE y LRANGE+LTRIM viajan en
 *    pipelines MULTI/EXEC de ida y vuelta única.
 * 3. NOMINAL PURITY: 'conn' -> 'store_connection', 'n' -> 'removed_count'.
 *
 * # Mathematical Proof (At-Most-Once Extraction):
 * El pipeline atómico LRANGE(0, max-1) + LTRIM(max, -1) garantiza que
 * ningún otro consumidor observe los elementos drenados: la extracción
 * es at-most-once incluso con drainers replicados.
 * =================================================================
 */

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info, instrument};

use crate::errors::CoordinationError;

/// Operaciones que el backend exige del almacén de coordinación.
/// Cada método es un viaje atómico al servidor.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Añade los miembros al set y fija la expiración de la clave,
    /// ambas operaciones dentro de un único pipeline atómico.
    async fn set_add_all_with_expiry(
        &self,
        key: &str,
        members: &[String],
        time_to_live: Duration,
    ) -> Result<(), CoordinationError>;

    async fn set_members(&self, key: &str) -> Result<Vec<String>, CoordinationError>;

    /// Elimina un miembro del set; devuelve si estaba presente.
    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, CoordinationError>;

    /// SET NX EX: devuelve true únicamente para el primer escritor.
    async fn string_set_if_absent(
        &self,
        key: &str,
        value: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError>;

    async fn string_exists(&self, key: &str) -> Result<bool, CoordinationError>;

    async fn list_push_right(
        &self,
        key: &str,
        elements: &[String],
    ) -> Result<(), CoordinationError>;

    /// Lee y recorta los primeros `max_elements` de la lista en un
    /// pipeline atómico; devuelve los elementos extraídos.
    async fn list_drain_head(
        &self,
        key: &str,
        max_elements: usize,
    ) -> Result<Vec<String>, CoordinationError>;

    async fn list_length(&self, key: &str) -> Result<usize, CoordinationError>;

    /// Pop bloqueante por la cabeza (broker de tareas).
    async fn list_pop_blocking(
        &self,
        key: &str,
        timeout: Duration,
    ) -> Result<Option<String>, CoordinationError>;
}

/**
 * Cliente del almacén de coordinación sobre un gestor de conexiones
 * multiplexado. El gestor es clonable y reconecta de forma autónoma.
 */
#[derive(Clone)]
pub struct RedisCoordinationClient {
    connection_manager: ConnectionManager,
}

impl RedisCoordinationClient {
    /**
     * Establece el enlace con el almacén de coordinación.
     *
     * # Errors:
     * - `CoordinationError::StoreFault`: URL corrupta o servidor caído.
     */
    #[instrument(skip(coordination_store_url))]
    pub async fn connect(coordination_store_url: &str) -> Result<Self, CoordinationError> {
        info!("🔌 [COORDINATION]: Initiating volatile store link synchronization...");

        let client = redis::Client::open(coordination_store_url)?;
        let connection_manager = client.get_connection_manager().await?;

        info!("⚓ [COORDINATION]: Volatile store link established.");
        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl CoordinationStore for RedisCoordinationClient {
    async fn set_add_all_with_expiry(
        &self,
        key: &str,
        members: &[String],
        time_to_live: Duration,
    ) -> Result<(), CoordinationError> {
        let mut store_connection = self.connection_manager.clone();

        let _: () = redis::pipe()
            .atomic()
            .sadd(key, members)
            .ignore()
            .expire(key, time_to_live.as_secs() as i64)
            .ignore()
            .query_async(&mut store_connection)
            .await?;

        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, CoordinationError> {
        let mut store_connection = self.connection_manager.clone();
        Ok(store_connection.smembers(key).await?)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, CoordinationError> {
        let mut store_connection = self.connection_manager.clone();
        let removed_count: i64 = store_connection.srem(key, member).await?;
        Ok(removed_count > 0)
    }

    async fn string_set_if_absent(
        &self,
        key: &str,
        value: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError> {
        let mut store_connection = self.connection_manager.clone();

        // SET NX EX responde OK al primer escritor y nil al resto.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(time_to_live.as_secs())
            .query_async(&mut store_connection)
            .await?;

        Ok(reply.is_some())
    }

    async fn string_exists(&self, key: &str) -> Result<bool, CoordinationError> {
        let mut store_connection = self.connection_manager.clone();
        Ok(store_connection.exists(key).await?)
    }

    async fn list_push_right(
        &self,
        key: &str,
        elements: &[String],
    ) -> Result<(), CoordinationError> {
        if elements.is_empty() {
            return Ok(());
        }

        let mut store_connection = self.connection_manager.clone();
        let _new_length: i64 = store_connection.rpush(key, elements).await?;
        Ok(())
    }

    async fn list_drain_head(
        &self,
        key: &str,
        max_elements: usize,
    ) -> Result<Vec<String>, CoordinationError> {
        if max_elements == 0 {
            return Ok(Vec::new());
        }

        let mut store_connection = self.connection_manager.clone();

        let (drained_elements,): (Vec<String>,) = redis::pipe()
            .atomic()
            .lrange(key, 0, max_elements as isize - 1)
            .ltrim(key, max_elements as isize, -1)
            .ignore()
            .query_async(&mut store_connection)
            .await?;

        debug!(
            queue = key,
            drained = drained_elements.len(),
            "📥 [COORDINATION]: Head drain extracted batch."
        );

        Ok(drained_elements)
    }

    async fn list_length(&self, key: &str) -> Result<usize, CoordinationError> {
        let mut store_connection = self.connection_manager.clone();
        Ok(store_connection.llen(key).await?)
    }

    async fn list_pop_blocking(
        &self,
        key: &str,
        timeout: Duration,
    ) -> Result<Option<String>, CoordinationError> {
        let mut store_connection = self.connection_manager.clone();

        let reply: Option<(String, String)> = store_connection
            .blpop(key, timeout.as_secs_f64())
            .await?;

        Ok(reply.map(|(_queue_key, element)| element))
    }
}
// FIN DEL ARCHIVO [libs/infra/coordination/src/store.rs]
