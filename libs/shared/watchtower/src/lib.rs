// [libs/shared/watchtower/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WATCHTOWER NEURAL OBSERVER (V7.3 - HOOK CHAINED)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4/L6)
 * RESPONSABILIDAD: GESTIÓN DE TELEMETRÍA, TRAZADO Y CAPTURA DE PÁNICOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL MODE: Logs compactos en desarrollo, tramas JSON planas en
 *    producción para la ingesta del panóptico.
 * 2. DIRECTIVE TABLE: Las dependencias ruidosas se silencian desde un
 *    catálogo único en lugar de una cadena de formato ad-hoc.
 * 3. HOOK CHAINING: El hook de pánico emite el rastro estructurado y
 *    delega después en el hook previo, preservando el volcado estándar.
 * =================================================================
 */

use std::any::Any;
use std::panic;

use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub mod metrics;

/// Dependencias cuyo parloteo no aporta al panóptico de ingesta.
const MUTED_DEPENDENCY_DIRECTIVES: &[&str] =
    &["tower_http=warn", "hyper=warn", "redis=warn", "libsql=error"];

/// Inicializa el trazado Watchtower y encadena el hook de pánicos.
///
/// # Comportamiento:
/// - Desarrollo: salida compacta para el operador.
/// - Producción: JSON plano apto para agregadores.
///
/// # Errors:
/// Produce pánico si otro suscriptor global ya fue inicializado.
pub fn init_tracing(service_name: &str) {
    let directive_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| build_default_filter(service_name));

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(directive_filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(directive_filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    install_collapse_hook(service_name);
}

/// Filtro por defecto: el servicio al nivel propio del estrato, las
/// dependencias según el catálogo de silenciamiento.
fn build_default_filter(service_name: &str) -> EnvFilter {
    let own_level = if cfg!(debug_assertions) { "debug" } else { "info" };

    let mut directives = vec![format!("{service_name}={own_level}")];
    directives.extend(MUTED_DEPENDENCY_DIRECTIVES.iter().map(|muted| muted.to_string()));

    EnvFilter::new(directives.join(","))
}

/// Encadena un hook que sella el colapso en el rastro estructurado
/// antes de devolver el control al hook previo (volcado estándar).
fn install_collapse_hook(service_name: &str) {
    let service_label = service_name.to_string();
    let previous_hook = panic::take_hook();

    panic::set_hook(Box::new(move |collapse_report| {
        let collapse_origin = collapse_report
            .location()
            .map(|origin| origin.to_string())
            .unwrap_or_else(|| "unlocated".to_string());

        error!(
            service = %service_label,
            origin = %collapse_origin,
            "💥 [WATCHTOWER]: Stratum collapsed: {}",
            describe_collapse_payload(collapse_report.payload())
        );

        previous_hook(collapse_report);
    }));
}

fn describe_collapse_payload(payload: &dyn Any) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-textual panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certify_default_filter_directive_table() {
        // El filtro por defecto debe construirse sin pánico y cubrir
        // el servicio más cada dependencia silenciada.
        let filter = build_default_filter("sentinel_gateway");
        let rendered = filter.to_string();

        assert!(rendered.contains("sentinel_gateway"));
        for muted in MUTED_DEPENDENCY_DIRECTIVES {
            let (dependency, _level) = muted.split_once('=').unwrap();
            assert!(rendered.contains(dependency), "missing directive for {dependency}");
        }
    }

    #[test]
    fn certify_collapse_payload_description() {
        let textual: Box<dyn Any + Send> = Box::new("boom".to_string());
        assert_eq!(describe_collapse_payload(textual.as_ref()), "boom");

        let static_text: Box<dyn Any + Send> = Box::new("static boom");
        assert_eq!(describe_collapse_payload(static_text.as_ref()), "static boom");

        let opaque: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(
            describe_collapse_payload(opaque.as_ref()),
            "non-textual panic payload"
        );
    }
}
// FIN DEL ARCHIVO [libs/shared/watchtower/src/lib.rs]
