// [libs/shared/config/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN ENVIRONMENT CAPTURE (V9.2 - INGESTION ALIGNED)
 * CLASIFICACIÓN: SHARED CONFIGURATION (ESTRATO L0)
 * RESPONSABILIDAD: HIDRATACIÓN TIPADA DEL ENTORNO DE PROCESO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE CAPTURE: El entorno se lee una sola vez en el bootstrap;
 *    los estratos L3/L4 reciben referencias inmutables.
 * 2. RELEASE AWARENESS: El endpoint DeviceCheck por defecto se alinea
 *    con el estrato de despliegue (producción vs. sandbox de Apple).
 * 3. CRONTAB GOVERNANCE: Las periodicidades de drenaje se validan en
 *    la ignición, no en el primer disparo del scheduler.
 * =================================================================
 */

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ENVIRONMENT_PARSE_FAULT: variable '{variable}' holds an unparseable value '{value}'")]
    UnparseableVariable { variable: String, value: String },

    #[error("CRONTAB_FAULT: variable '{variable}' holds an invalid crontab expression '{value}'")]
    InvalidCrontab { variable: String, value: String },
}

/// Estrato de despliegue del proceso. Gobierna los comportamientos
/// exclusivos de producción (blacklisting DeviceCheck, endpoint Apple).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Staging,
    Release,
}

impl Environment {
    pub fn is_release(self) -> bool {
        matches!(self, Environment::Release)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "staging" => Ok(Environment::Staging),
            "release" => Ok(Environment::Release),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Staging => "staging",
            Environment::Release => "release",
        };
        write!(formatter, "{label}")
    }
}

/**
 * Contenedor inmutable de la configuración del backend de analítica.
 *
 * Cada campo espeja una variable de entorno; los valores por defecto
 * replican el contrato operativo documentado del servicio.
 */
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    pub environment: Environment,

    // --- ENLACES DE INFRAESTRUCTURA ---
    pub analytics_redis_url: String,
    pub archive_database_url: String,
    pub archive_auth_token: Option<String>,

    // --- LEDGER DE CUOTA MENSUAL ---
    pub analytics_token_size: usize,
    pub analytics_token_expiration_days: u64,

    // --- CREDENCIALES APPLE DEVICECHECK ---
    pub apple_device_check_url: String,
    pub apple_team_id: String,
    pub apple_key_id: String,
    pub apple_certificate_key: String,

    // --- VENTANAS DEL PROTOCOLO DE AUTORIZACIÓN IOS ---
    pub check_time_seconds_min: u64,
    pub check_time_seconds_max: u64,
    pub read_time_seconds_min: u64,
    pub read_time_seconds_max: u64,

    // --- ATESTACIÓN SAFETYNET ---
    pub safety_net_apk_digest: String,
    pub safety_net_package_name: String,
    pub safety_net_issuer_hostname: String,
    pub safety_net_max_skew_minutes: i64,
    pub salt_length: usize,
    pub signed_attestation_max_length: usize,
    pub device_token_max_length: usize,

    // --- RETENCIÓN Y DRENAJE ---
    pub data_retention_days: i64,
    pub store_ingested_data_periodicity: String,
    pub store_operational_info_periodicity: String,
    pub delete_old_data_periodicity: String,
    pub exposure_payload_max_ingested_elements: usize,
    pub operational_info_max_ingested_elements: usize,

    // --- COLAS DE COORDINACIÓN ---
    pub operational_info_queue_key: String,
    pub exposure_payload_queue_key: String,
    pub exposure_payload_errors_queue_key: String,
    pub authorization_ios_queue_key: String,
    pub authorization_android_queue_key: String,

    // --- MOLDEADO DE TRÁFICO DUMMY ---
    pub dummy_request_timeout_millis: f64,
    pub dummy_request_timeout_sigma: f64,

    // --- RED SALIENTE ---
    pub requests_timeout_seconds: u64,

    // --- SUPERFICIE HTTP ---
    pub listening_network_port: u16,
}

impl SentinelConfig {
    /**
     * Hidrata la configuración completa desde el entorno del proceso.
     *
     * # Errors:
     * - `ConfigError::UnparseableVariable`: valor numérico corrupto.
     * - `ConfigError::InvalidCrontab`: periodicidad con forma inválida.
     */
    pub fn from_environment() -> Result<Self, ConfigError> {
        let environment = parse_or_default("ENV", Environment::Development)?;

        let apple_device_check_default = if environment.is_release() {
            "https://api.devicecheck.apple.com/v1"
        } else {
            "https://api.development.devicecheck.apple.com/v1"
        };

        Ok(Self {
            environment,

            analytics_redis_url: string_or_default(
                "ANALYTICS_REDIS_URL",
                "redis://localhost:6379/1",
            ),
            archive_database_url: string_or_default(
                "ARCHIVE_DATABASE_URL",
                "file:sentinel-analytics.db",
            ),
            archive_auth_token: env::var("ARCHIVE_AUTH_TOKEN").ok(),

            analytics_token_size: parse_or_default("ANALYTICS_TOKEN_SIZE", 128)?,
            analytics_token_expiration_days: parse_or_default(
                "ANALYTICS_TOKEN_EXPIRATION_DAYS",
                62,
            )?,

            apple_device_check_url: string_or_default(
                "APPLE_DEVICE_CHECK_URL",
                apple_device_check_default,
            ),
            apple_team_id: string_or_default("APPLE_TEAM_ID", ""),
            apple_key_id: string_or_default("APPLE_KEY_ID", ""),
            apple_certificate_key: string_or_default("APPLE_CERTIFICATE_KEY", ""),

            check_time_seconds_min: parse_or_default("CHECK_TIME_SECONDS_MIN", 7)?,
            check_time_seconds_max: parse_or_default("CHECK_TIME_SECONDS_MAX", 10)?,
            read_time_seconds_min: parse_or_default("READ_TIME_SECONDS_MIN", 0)?,
            read_time_seconds_max: parse_or_default("READ_TIME_SECONDS_MAX", 3)?,

            safety_net_apk_digest: string_or_default("SAFETY_NET_APK_DIGEST", ""),
            safety_net_package_name: string_or_default("SAFETY_NET_PACKAGE_NAME", ""),
            safety_net_issuer_hostname: string_or_default(
                "SAFETY_NET_ISSUER_HOSTNAME",
                "attest.android.com",
            ),
            safety_net_max_skew_minutes: parse_or_default("SAFETY_NET_MAX_SKEW_MINUTES", 10)?,
            salt_length: parse_or_default("SALT_LENGTH", 24)?,
            signed_attestation_max_length: parse_or_default(
                "SIGNED_ATTESTATION_MAX_LENGTH",
                10_000,
            )?,
            device_token_max_length: parse_or_default("DEVICE_TOKEN_MAX_LENGTH", 10_000)?,

            data_retention_days: parse_or_default("DATA_RETENTION_DAYS", 30)?,
            store_ingested_data_periodicity: crontab_or_default(
                "STORE_INGESTED_DATA_PERIODICITY",
                "* * * * *",
            )?,
            store_operational_info_periodicity: crontab_or_default(
                "STORE_OPERATIONAL_INFO_PERIODICITY",
                "* * * * *",
            )?,
            delete_old_data_periodicity: crontab_or_default(
                "DELETE_OLD_DATA_PERIODICITY",
                "0 0 * * *",
            )?,
            exposure_payload_max_ingested_elements: parse_or_default(
                "EXPOSURE_PAYLOAD_MAX_INGESTED_ELEMENTS",
                100,
            )?,
            operational_info_max_ingested_elements: parse_or_default(
                "OPERATIONAL_INFO_MAX_INGESTED_ELEMENTS",
                100,
            )?,

            operational_info_queue_key: string_or_default(
                "OPERATIONAL_INFO_QUEUE_KEY",
                "operational_info",
            ),
            exposure_payload_queue_key: string_or_default(
                "EXPOSURE_PAYLOAD_QUEUE_KEY",
                "ingested_exposure_data",
            ),
            exposure_payload_errors_queue_key: string_or_default(
                "EXPOSURE_PAYLOAD_ERRORS_QUEUE_KEY",
                "errors_exposure_data",
            ),
            authorization_ios_queue_key: string_or_default(
                "AUTHORIZATION_IOS_QUEUE_KEY",
                "authorization_ios",
            ),
            authorization_android_queue_key: string_or_default(
                "AUTHORIZATION_ANDROID_QUEUE_KEY",
                "authorization_android",
            ),

            dummy_request_timeout_millis: parse_or_default("DUMMY_REQUEST_TIMEOUT_MILLIS", 150.0)?,
            dummy_request_timeout_sigma: parse_or_default("DUMMY_REQUEST_TIMEOUT_SIGMA", 20.0)?,

            requests_timeout_seconds: parse_or_default("REQUESTS_TIMEOUT_SECONDS", 5)?,

            listening_network_port: parse_or_default("PORT", 3000)?,
        })
    }
}

fn string_or_default(variable: &str, default: &str) -> String {
    env::var(variable).unwrap_or_else(|_| default.to_string())
}

fn parse_or_default<T: FromStr>(variable: &str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::UnparseableVariable {
            variable: variable.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

fn crontab_or_default(variable: &str, default: &str) -> Result<String, ConfigError> {
    let expression = string_or_default(variable, default);
    validate_crontab(&expression).ok_or_else(|| ConfigError::InvalidCrontab {
        variable: variable.to_string(),
        value: expression.clone(),
    })?;
    Ok(expression)
}

/// Valida la forma de una expresión crontab de cinco campos.
/// El contenido de cada campo lo valida el scheduler en la ignición;
/// aquí sólo se rechaza la aridad incorrecta y los campos vacíos.
fn validate_crontab(expression: &str) -> Option<()> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    (fields.len() == 5 && fields.iter().all(|field| !field.is_empty())).then_some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certify_environment_parsing_strata() {
        assert_eq!("release".parse::<Environment>(), Ok(Environment::Release));
        assert_eq!("RELEASE".parse::<Environment>(), Ok(Environment::Release));
        assert_eq!("staging".parse::<Environment>(), Ok(Environment::Staging));
        assert!("production".parse::<Environment>().is_err());
        assert!(Environment::Release.is_release());
        assert!(!Environment::Development.is_release());
    }

    #[test]
    fn certify_crontab_arity_governance() {
        assert!(validate_crontab("* * * * *").is_some());
        assert!(validate_crontab("0 0 * * *").is_some());
        assert!(validate_crontab("*/5 2 * * 1-5").is_some());
        assert!(validate_crontab("* * * *").is_none());
        assert!(validate_crontab("0 0 * * * *").is_none());
        assert!(validate_crontab("").is_none());
    }

    #[test]
    fn certify_default_hydration_without_environment() {
        // Sin variables inyectadas, la hidratación debe caer en los
        // valores operativos documentados.
        let config = SentinelConfig::from_environment().expect("default hydration must succeed");

        assert_eq!(config.analytics_token_size, 128);
        assert_eq!(config.analytics_token_expiration_days, 62);
        assert_eq!(config.check_time_seconds_min, 7);
        assert_eq!(config.check_time_seconds_max, 10);
        assert_eq!(config.read_time_seconds_min, 0);
        assert_eq!(config.read_time_seconds_max, 3);
        assert_eq!(config.safety_net_issuer_hostname, "attest.android.com");
        assert_eq!(config.safety_net_max_skew_minutes, 10);
        assert_eq!(config.salt_length, 24);
        assert_eq!(config.signed_attestation_max_length, 10_000);
        assert_eq!(config.device_token_max_length, 10_000);
        assert_eq!(config.data_retention_days, 30);
        assert_eq!(config.exposure_payload_max_ingested_elements, 100);
        assert_eq!(config.operational_info_max_ingested_elements, 100);
        assert_eq!(config.operational_info_queue_key, "operational_info");
        assert_eq!(config.exposure_payload_queue_key, "ingested_exposure_data");
        assert_eq!(config.exposure_payload_errors_queue_key, "errors_exposure_data");
        assert_eq!(config.delete_old_data_periodicity, "0 0 * * *");
        assert_eq!(config.requests_timeout_seconds, 5);
        // Fuera de producción el endpoint DeviceCheck cae en el sandbox.
        if !config.environment.is_release() {
            assert!(config.apple_device_check_url.contains("api.development.devicecheck"));
        }
    }
}
// FIN DEL ARCHIVO [libs/shared/config/src/lib.rs]
