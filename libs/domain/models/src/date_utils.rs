// [libs/domain/models/src/date_utils.rs]
//! Aritmética de meses para el ledger de cuota mensual.

use chrono::{Datelike, Duration, NaiveDate, Utc};

/// Primer día del mes corriente (UTC).
pub fn current_month_start() -> NaiveDate {
    first_day_of_month(Utc::now().date_naive())
}

/// Primer día del mes siguiente (UTC).
pub fn next_month_start() -> NaiveDate {
    // Saltar 31 días desde el primer día garantiza aterrizar en el mes
    // siguiente para cualquier longitud de mes.
    first_day_of_month(current_month_start() + Duration::days(31))
}

fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 exists in every month")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn certify_month_boundary_arithmetic() {
        let current = current_month_start();
        let next = next_month_start();

        assert_eq!(current.day(), 1);
        assert_eq!(next.day(), 1);
        assert!(next > current);

        let elapsed = next.signed_duration_since(current).num_days();
        assert!((28..=31).contains(&elapsed));
    }

    #[test]
    fn certify_first_day_projection() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        assert_eq!(first_day_of_month(date), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());

        // La proyección de 31 días cruza correctamente diciembre.
        let december = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let january = first_day_of_month(december + Duration::days(31));
        assert_eq!(january, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }
}
// FIN DEL ARCHIVO [libs/domain/models/src/date_utils.rs]
