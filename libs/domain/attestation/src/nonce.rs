// [libs/domain/attestation/src/nonce.rs]
/*!
 * =================================================================
 * APARATO: ATTESTATION NONCE FORGE (V4.0)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: RECONSTRUCCIÓN DEL NONCE LIGADO AL PAYLOAD
 *
 * # Mathematical Proof (Payload Binding):
 * El nonce ata la atestación al contenido exacto de la subida:
 * provincia, las cuatro banderas como 0/1, la fecha ISO de última
 * exposición (cadena vacía si ausente) y el salt, concatenados sin
 * separador y sellados con SHA-256. El cliente construye el mismo
 * digest; cualquier divergencia de un solo byte invalida el JWS.
 * =================================================================
 */

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

use sentinel_domain_models::OperationalInfo;

/**
 * Genera el nonce esperado para la instantánea de operational info.
 * Debe coincidir byte a byte con el digest del cliente.
 */
pub fn generate_nonce(
    operational_info: &OperationalInfo,
    salt: &str,
    last_risky_exposure_on_iso: &str,
) -> String {
    let nonce_seed = format!(
        "{}{}{}{}{}{}{}",
        operational_info.province,
        i32::from(operational_info.exposure_permission),
        i32::from(operational_info.bluetooth_active),
        i32::from(operational_info.notification_permission),
        i32::from(operational_info.exposure_notification),
        last_risky_exposure_on_iso,
        salt,
    );

    BASE64_STANDARD.encode(Sha256::digest(nonce_seed.as_bytes()))
}

// FIN DEL ARCHIVO [libs/domain/attestation/src/nonce.rs]
