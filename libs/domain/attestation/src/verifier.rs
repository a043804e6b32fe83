// [libs/domain/attestation/src/verifier.rs]
/*!
 * =================================================================
 * APARATO: SAFETYNET ATTESTATION VERIFIER (V4.3 - HARDWARE BACKED)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: VERIFICACIÓN INTEGRAL DEL JWS DE ATESTACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CHAIN GOVERNANCE: La cadena x5c se valida por firmas en pareja
 *    (hoja ← intermedias) con ventanas de validez vigentes, y la hoja
 *    debe cubrir el hostname emisor en su SAN.
 * 2. RSA ONLY: La clave pública de la hoja debe ser RSA; la firma del
 *    JWS se verifica con el algoritmo anunciado en la cabecera.
 * 3. PAYLOAD INVARIANTS: Sesgo temporal, nonce, paquete APK, digest,
 *    integridad básica, perfil CTS y respaldo de hardware.
 * =================================================================
 */

use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{instrument, warn};
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

use sentinel_domain_models::OperationalInfo;

use crate::errors::AttestationError;
use crate::jws::decode_jws;
use crate::nonce::generate_nonce;

/// Token que debe aparecer en la lista 'evaluationType' del payload.
const HARDWARE_BACKED_EVALUATION: &str = "HARDWARE_BACKED";

/// Parámetros de verificación inyectados desde el entorno.
#[derive(Debug, Clone)]
pub struct SafetyNetSettings {
    pub apk_digest: String,
    pub package_name: String,
    pub issuer_hostname: String,
    pub max_skew_minutes: i64,
}

pub struct AttestationVerifier {
    settings: SafetyNetSettings,
}

impl AttestationVerifier {
    pub fn new(settings: SafetyNetSettings) -> Self {
        Self { settings }
    }

    /**
     * Verifica que la atestación sea genuina, firmada por el emisor
     * esperado y ligada byte a byte a la instantánea subida.
     *
     * # Errors:
     * - `AttestationError::MalformedJws`: estructura indecodificable.
     * - `AttestationError::VerificationFailed`: cualquier paso de
     *   cadena, firma o payload que no se cumpla.
     */
    #[instrument(skip_all)]
    pub fn verify_attestation(
        &self,
        signed_attestation: &str,
        salt: &str,
        operational_info: &OperationalInfo,
        last_risky_exposure_on_iso: &str,
    ) -> Result<(), AttestationError> {
        let decoded_jws = decode_jws(signed_attestation)?;
        let certificate_chain = extract_certificates(&decoded_jws.header)?;

        self.validate_certificate_chain(&certificate_chain)?;
        verify_jws_signature(signed_attestation, &decoded_jws.header, &certificate_chain)?;
        self.validate_payload(
            &decoded_jws.payload,
            operational_info,
            salt,
            last_risky_exposure_on_iso,
        )
    }

    /**
     * Valida la cadena de certificados: ventanas de validez vigentes,
     * cada eslabón firmado por el siguiente y SAN de la hoja cubriendo
     * el hostname del emisor de atestaciones.
     */
    fn validate_certificate_chain(
        &self,
        certificate_chain: &[Vec<u8>],
    ) -> Result<(), AttestationError> {
        let parsed_chain: Vec<X509Certificate<'_>> = certificate_chain
            .iter()
            .map(|der_certificate| {
                X509Certificate::from_der(der_certificate)
                    .map(|(_, certificate)| certificate)
                    .map_err(|parse_fault| {
                        warn!(error = %parse_fault, "⚠️ [SAFETYNET]: Could not load a chain certificate.");
                        AttestationError::VerificationFailed
                    })
            })
            .collect::<Result<_, _>>()?;

        for certificate in &parsed_chain {
            if !certificate.validity().is_valid() {
                warn!("⚠️ [SAFETYNET]: Certificate outside its validity window.");
                return Err(AttestationError::VerificationFailed);
            }
        }

        // Firmas en pareja: el eslabón i debe estar firmado por i+1.
        for link_index in 0..parsed_chain.len() - 1 {
            let subject = &parsed_chain[link_index];
            let issuer = &parsed_chain[link_index + 1];

            subject
                .verify_signature(Some(issuer.public_key()))
                .map_err(|verify_fault| {
                    warn!(
                        link = link_index,
                        error = %verify_fault,
                        "⚠️ [SAFETYNET]: Could not validate the certificates chain."
                    );
                    AttestationError::VerificationFailed
                })?;
        }

        let leaf_certificate = &parsed_chain[0];
        if !leaf_san_covers_hostname(leaf_certificate, &self.settings.issuer_hostname) {
            warn!(
                issuer_hostname = %self.settings.issuer_hostname,
                "⚠️ [SAFETYNET]: Leaf certificate does not cover the attestation issuer."
            );
            return Err(AttestationError::VerificationFailed);
        }

        Ok(())
    }

    /**
     * Valida las invariantes del payload ya autenticado.
     */
    fn validate_payload(
        &self,
        payload: &serde_json::Value,
        operational_info: &OperationalInfo,
        salt: &str,
        last_risky_exposure_on_iso: &str,
    ) -> Result<(), AttestationError> {
        let now_millis = Utc::now().timestamp_millis();
        let skew_millis = Duration::minutes(self.settings.max_skew_minutes).num_milliseconds();
        let lower_bound_skew = now_millis - skew_millis;
        let upper_bound_skew = now_millis + skew_millis;

        let expected_nonce = generate_nonce(operational_info, salt, last_risky_exposure_on_iso);

        let timestamp_within_skew = payload["timestampMs"]
            .as_i64()
            .is_some_and(|timestamp| (lower_bound_skew..=upper_bound_skew).contains(&timestamp));

        let nonce_matches = payload["nonce"].as_str() == Some(expected_nonce.as_str());

        let package_matches =
            payload["apkPackageName"].as_str() == Some(self.settings.package_name.as_str());

        let apk_digest_matches = payload["apkCertificateDigestSha256"]
            .get(0)
            .and_then(|digest| digest.as_str())
            == Some(self.settings.apk_digest.as_str());

        let basic_integrity = payload["basicIntegrity"].as_bool() == Some(true);
        let cts_profile_match = payload["ctsProfileMatch"].as_bool() == Some(true);

        let hardware_backed = payload["evaluationType"]
            .as_str()
            .is_some_and(|evaluation| {
                evaluation
                    .split(',')
                    .any(|token| token == HARDWARE_BACKED_EVALUATION)
            });

        if !(timestamp_within_skew
            && nonce_matches
            && package_matches
            && apk_digest_matches
            && basic_integrity
            && cts_profile_match
            && hardware_backed)
        {
            warn!(
                timestamp_within_skew,
                nonce_matches,
                package_matches,
                apk_digest_matches,
                basic_integrity,
                cts_profile_match,
                hardware_backed,
                "⚠️ [SAFETYNET]: The jws payload did not pass the validation check."
            );
            return Err(AttestationError::VerificationFailed);
        }

        Ok(())
    }
}

/**
 * Extrae la cadena DER del campo 'x5c' de la cabecera: secuencia no
 * vacía de certificados en base64 estándar.
 */
fn extract_certificates(header: &serde_json::Value) -> Result<Vec<Vec<u8>>, AttestationError> {
    let Some(certificates_field) = header["x5c"].as_array() else {
        warn!("⚠️ [SAFETYNET]: Could not retrieve certificates from the jws header.");
        return Err(AttestationError::VerificationFailed);
    };

    if certificates_field.is_empty() {
        warn!("⚠️ [SAFETYNET]: Empty certificate chain in the jws header.");
        return Err(AttestationError::VerificationFailed);
    }

    certificates_field
        .iter()
        .map(|certificate_entry| {
            certificate_entry
                .as_str()
                .ok_or(AttestationError::VerificationFailed)
                .and_then(|encoded| {
                    BASE64_STANDARD.decode(encoded).map_err(|decode_fault| {
                        warn!(
                            error = %decode_fault,
                            "⚠️ [SAFETYNET]: Could not decode the jws header certificates."
                        );
                        AttestationError::VerificationFailed
                    })
                })
        })
        .collect()
}

/// El SAN de la hoja debe contener el hostname del emisor como DNSName.
fn leaf_san_covers_hostname(leaf_certificate: &X509Certificate<'_>, hostname: &str) -> bool {
    leaf_certificate
        .subject_alternative_name()
        .ok()
        .flatten()
        .map(|extension| {
            extension.value.general_names.iter().any(
                |general_name| matches!(general_name, GeneralName::DNSName(dns) if *dns == hostname),
            )
        })
        .unwrap_or(false)
}

/**
 * Verifica la firma del JWS sobre 'header.payload' con la clave RSA
 * de la hoja y el algoritmo anunciado en la cabecera.
 */
fn verify_jws_signature(
    jws_token: &str,
    header: &serde_json::Value,
    certificate_chain: &[Vec<u8>],
) -> Result<(), AttestationError> {
    let (_, leaf_certificate) =
        X509Certificate::from_der(&certificate_chain[0]).map_err(|parse_fault| {
            warn!(error = %parse_fault, "⚠️ [SAFETYNET]: Could not load the leaf certificate.");
            AttestationError::VerificationFailed
        })?;

    let Ok(PublicKey::RSA(rsa_public_key)) = leaf_certificate.public_key().parsed() else {
        warn!("⚠️ [SAFETYNET]: Unexpected certificate public key type.");
        return Err(AttestationError::VerificationFailed);
    };

    let advertised_algorithm = header["alg"]
        .as_str()
        .and_then(|algorithm| Algorithm::from_str(algorithm).ok())
        .ok_or_else(|| {
            warn!("⚠️ [SAFETYNET]: Unknown or missing signature algorithm in the jws header.");
            AttestationError::VerificationFailed
        })?;

    // Los enteros DER llevan un octeto 0x00 de signo que la clave
    // cruda no debe incluir.
    let decoding_key = DecodingKey::from_rsa_raw_components(
        strip_sign_octet(rsa_public_key.modulus),
        strip_sign_octet(rsa_public_key.exponent),
    );

    let mut signature_validation = Validation::new(advertised_algorithm);
    signature_validation.validate_exp = false;
    signature_validation.validate_aud = false;
    signature_validation.required_spec_claims.clear();

    decode::<serde_json::Value>(jws_token, &decoding_key, &signature_validation)
        .map(|_verified_token| ())
        .map_err(|signature_fault| {
            warn!(error = %signature_fault, "⚠️ [SAFETYNET]: Could not verify jws signature.");
            AttestationError::VerificationFailed
        })
}

fn strip_sign_octet(der_integer: &[u8]) -> &[u8] {
    match der_integer {
        [0, rest @ ..] if !rest.is_empty() => rest,
        other => other,
    }
}

// FIN DEL ARCHIVO [libs/domain/attestation/src/verifier.rs]
