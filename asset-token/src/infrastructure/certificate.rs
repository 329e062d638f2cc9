//! Extraction of the client identity from an X.509 certificate.
//!
//! The serial number is rendered the way TLS-terminating web servers expose
//! it (`SSL_CLIENT_M_SERIAL`): uppercase hexadecimal without separators and
//! without the DER sign padding byte.

use x509_parser::prelude::*;

use crate::AssetTokenError;

/// Maximum certificate size accepted for parsing.
pub const MAX_CERT_SIZE: usize = 16 * 1024;

/// Returns the serial number of a DER-encoded certificate as uppercase hex.
pub fn serial_number_hex(cert_der: &[u8]) -> Result<String, AssetTokenError> {
    if cert_der.len() > MAX_CERT_SIZE {
        return Err(AssetTokenError::InvalidCertificate(format!(
            "certificate too large: {} bytes (max {MAX_CERT_SIZE})",
            cert_der.len()
        )));
    }

    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| AssetTokenError::InvalidCertificate(format!("{e:?}")))?;

    Ok(format_serial(cert.tbs_certificate.raw_serial()))
}

/// Hex-encodes a raw DER integer, dropping leading zero bytes but keeping a
/// single byte for a zero serial.
pub fn format_serial(raw: &[u8]) -> String {
    let start = raw
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or_else(|| raw.len().saturating_sub(1));
    hex::encode_upper(&raw[start..])
}
