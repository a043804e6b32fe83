// [libs/infra/coordination/src/quota.rs]
/*!
 * =================================================================
 * APARATO: MONTHLY QUOTA LEDGER (V4.2 - RACE FREE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: EMISIÓN Y CONSUMO ATÓMICO DE CUPOS MENSUALES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. MEMBER ENCODING: Cada cupo es el miembro 'YYYY-MM-01:{0|1}'
 *    (mes × bandera de exposición) dentro del set del token.
 * 2. BOUNDARY SHIELD: La emisión pre-acuña los cupos del mes
 *    siguiente, cerrando la carrera de un cliente que autoriza a las
 *    23:59 UTC del último día del mes.
 *
 * # Mathematical Proof (Single Round-Trip Consumption):
 * SREM sobre un único miembro es linealizable en el almacén: de N
 * subidas concurrentes con el mismo (token, mes, bandera), exactamente
 * una observa 'was present' y es admitida.
 * =================================================================
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, instrument};

use sentinel_domain_models::date_utils::{current_month_start, next_month_start};

use crate::errors::CoordinationError;
use crate::store::CoordinationStore;

const SECONDS_PER_DAY: u64 = 86_400;

/// Miembro de cupo para un mes y una bandera de exposición.
fn authorization_member(month_start: NaiveDate, with_exposure: bool) -> String {
    format!("{month_start}:{}", i32::from(with_exposure))
}

/// Miembro de cupo del mes corriente.
pub fn member_for_current_month(with_exposure: bool) -> String {
    authorization_member(current_month_start(), with_exposure)
}

/// Miembro de cupo del mes siguiente.
pub fn member_for_next_month(with_exposure: bool) -> String {
    authorization_member(next_month_start(), with_exposure)
}

/// Los cuatro miembros que emite una autorización: mes corriente y
/// siguiente, con y sin exposición.
pub fn all_authorization_members() -> Vec<String> {
    vec![
        member_for_current_month(true),
        member_for_current_month(false),
        member_for_next_month(true),
        member_for_next_month(false),
    ]
}

/**
 * Ledger de cuota mensual sobre el almacén de coordinación.
 * La clave de cada entrada es el propio analytics token.
 */
#[derive(Clone)]
pub struct QuotaLedger {
    coordination_store: Arc<dyn CoordinationStore>,
    token_expiration_days: u64,
}

impl QuotaLedger {
    pub fn new(coordination_store: Arc<dyn CoordinationStore>, token_expiration_days: u64) -> Self {
        Self {
            coordination_store,
            token_expiration_days,
        }
    }

    /**
     * Emite los cuatro cupos del token y fija su expiración, todo en
     * un único pipeline atómico contra el almacén.
     */
    #[instrument(skip(self, analytics_token))]
    pub async fn issue(&self, analytics_token: &str) -> Result<(), CoordinationError> {
        let authorization_members = all_authorization_members();
        let token_time_to_live =
            Duration::from_secs(self.token_expiration_days * SECONDS_PER_DAY);

        self.coordination_store
            .set_add_all_with_expiry(analytics_token, &authorization_members, token_time_to_live)
            .await?;

        info!("🪪 [QUOTA_LEDGER]: New authorized analytics token issued.");
        Ok(())
    }

    /**
     * Un token está autorizado si conserva al menos un cupo del mes
     * corriente (con o sin exposición).
     */
    pub async fn is_authorized(&self, analytics_token: &str) -> Result<bool, CoordinationError> {
        let members = self.coordination_store.set_members(analytics_token).await?;

        let with_exposure = member_for_current_month(true);
        let without_exposure = member_for_current_month(false);

        Ok(members
            .iter()
            .any(|member| *member == with_exposure || *member == without_exposure))
    }

    /**
     * Consume el cupo (mes corriente, bandera) del token.
     * Devuelve true únicamente si el cupo seguía disponible.
     */
    #[instrument(skip(self, analytics_token))]
    pub async fn consume(
        &self,
        analytics_token: &str,
        with_exposure: bool,
    ) -> Result<bool, CoordinationError> {
        self.coordination_store
            .set_remove(analytics_token, &member_for_current_month(with_exposure))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCoordinationStore;

    const TOKEN: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn ledger_over_memory() -> (QuotaLedger, Arc<MemoryCoordinationStore>) {
        let store = Arc::new(MemoryCoordinationStore::new());
        let ledger = QuotaLedger::new(store.clone(), 62);
        (ledger, store)
    }

    #[test]
    fn certify_member_encoding() {
        let member = authorization_member(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(), true);
        assert_eq!(member, "2026-08-01:1");

        let member = authorization_member(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(), false);
        assert_eq!(member, "2026-08-01:0");
    }

    #[tokio::test]
    async fn certify_issue_places_four_members_with_ttl() {
        let (ledger, store) = ledger_over_memory();
        ledger.issue(TOKEN).await.unwrap();

        let mut members = store.set_members(TOKEN).await.unwrap();
        members.sort();
        let mut expected = all_authorization_members();
        expected.sort();
        assert_eq!(members, expected);

        let remaining = store.remaining_ttl(TOKEN).expect("token key must expire");
        assert!(remaining <= Duration::from_secs(62 * SECONDS_PER_DAY));
        assert!(remaining > Duration::from_secs(61 * SECONDS_PER_DAY));

        assert!(ledger.is_authorized(TOKEN).await.unwrap());
    }

    #[tokio::test]
    async fn certify_consume_exactly_once_per_flag() {
        let (ledger, _store) = ledger_over_memory();
        ledger.issue(TOKEN).await.unwrap();

        // Cada bandera se consume exactamente una vez en el mes.
        assert!(ledger.consume(TOKEN, true).await.unwrap());
        assert!(!ledger.consume(TOKEN, true).await.unwrap());
        assert!(ledger.consume(TOKEN, false).await.unwrap());
        assert!(!ledger.consume(TOKEN, false).await.unwrap());

        // Agotado el mes corriente, el token deja de estar autorizado;
        // los cupos del mes siguiente no cuentan.
        assert!(!ledger.is_authorized(TOKEN).await.unwrap());
    }

    #[tokio::test]
    async fn certify_unknown_token_rejection() {
        let (ledger, _store) = ledger_over_memory();

        assert!(!ledger.is_authorized("missing-token").await.unwrap());
        assert!(!ledger.consume("missing-token", true).await.unwrap());
    }

    #[tokio::test]
    async fn certify_consume_preserves_sibling_quota() {
        let (ledger, store) = ledger_over_memory();
        ledger.issue(TOKEN).await.unwrap();

        assert!(ledger.consume(TOKEN, true).await.unwrap());

        let members = store.set_members(TOKEN).await.unwrap();
        assert!(!members.contains(&member_for_current_month(true)));
        assert!(members.contains(&member_for_current_month(false)));
        assert!(members.contains(&member_for_next_month(true)));
        assert!(members.contains(&member_for_next_month(false)));
    }
}
// FIN DEL ARCHIVO [libs/infra/coordination/src/quota.rs]
