//! TLS identity: a certificate chain and the private key for its leaf.

use std::fmt;
use std::path::Path;

use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use tracing::debug;

use crate::error::{Result, TlsError};
use crate::tls::crypto_provider;

/// A certificate chain plus the matching private key.
///
/// Construction fails unless the key belongs to the leaf certificate, so a
/// value of this type is always usable as-is.
pub struct Identity {
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl Identity {
    /// Load an identity from a PEM certificate file and a PEM key file.
    pub fn load(cert_path: &Path, key_path: &Path) -> Result<Self> {
        let fail = |reason: String| TlsError::IdentityLoad {
            cert_path: cert_path.to_path_buf(),
            key_path: key_path.to_path_buf(),
            reason,
        };

        let cert_pem = std::fs::read(cert_path)
            .map_err(|e| fail(format!("cannot read {}: {e}", cert_path.display())))?;
        let key_pem = std::fs::read(key_path)
            .map_err(|e| fail(format!("cannot read {}: {e}", key_path.display())))?;

        let identity = Self::from_pem(&cert_pem, &key_pem).map_err(fail)?;
        debug!(
            cert = %cert_path.display(),
            chain_len = identity.cert_chain.len(),
            "Loaded TLS identity"
        );
        Ok(identity)
    }

    /// Parse an identity from in-memory PEM data.
    ///
    /// The error is a human-readable reason; [`Identity::load`] wraps it into
    /// [`TlsError::IdentityLoad`].
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> std::result::Result<Self, String> {
        let cert_chain = CertificateDer::pem_slice_iter(cert_pem)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("malformed certificate PEM: {e}"))?;
        if cert_chain.is_empty() {
            return Err("no certificate found".into());
        }

        let key = PrivateKeyDer::from_pem_slice(key_pem)
            .map_err(|e| format!("malformed or missing private key: {e}"))?;

        let identity = Self { cert_chain, key };
        identity.ensure_key_matches()?;
        Ok(identity)
    }

    fn ensure_key_matches(&self) -> std::result::Result<(), String> {
        let signing_key = crypto_provider()
            .key_provider
            .load_private_key(self.key.clone_key())
            .map_err(|e| format!("unsupported private key: {e}"))?;

        CertifiedKey::new(self.cert_chain.clone(), signing_key)
            .keys_match()
            .map_err(|e| format!("private key does not match certificate: {e}"))
    }

    /// The certificate chain, leaf first.
    pub fn cert_chain(&self) -> &[CertificateDer<'static>] {
        &self.cert_chain
    }

    /// Split into the parts rustls config builders consume.
    pub fn into_parts(self) -> (Vec<CertificateDer<'static>>, PrivateKeyDer<'static>) {
        (self.cert_chain, self.key)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("chain_len", &self.cert_chain.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::certs::{generate_ca, generate_server_cert};

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_matching_pair() {
        let dir = tempfile::tempdir().unwrap();
        let ca = generate_ca("Identity Test").unwrap();
        let server = generate_server_cert(&ca, &["localhost"]).unwrap();
        let cert = write(dir.path(), "server.pem", &server.cert_pem);
        let key = write(dir.path(), "server.key", &server.key_pem);

        let identity = Identity::load(&cert, &key).unwrap();
        assert_eq!(identity.cert_chain().len(), 1);
    }

    #[test]
    fn rejects_key_from_another_certificate() {
        let ca = generate_ca("Identity Test").unwrap();
        let a = generate_server_cert(&ca, &["localhost"]).unwrap();
        let b = generate_server_cert(&ca, &["localhost"]).unwrap();

        let err = Identity::from_pem(a.cert_pem.as_bytes(), b.key_pem.as_bytes()).unwrap_err();
        assert!(err.contains("does not match"), "unexpected reason: {err}");
    }

    #[test]
    fn missing_file_is_identity_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Identity::load(&dir.path().join("nope.pem"), &dir.path().join("nope.key"))
            .unwrap_err();
        match err {
            TlsError::IdentityLoad { reason, .. } => assert!(reason.contains("cannot read")),
            other => panic!("expected IdentityLoad, got {other:?}"),
        }
    }

    #[test]
    fn empty_certificate_file_is_rejected() {
        let ca = generate_ca("Identity Test").unwrap();
        let server = generate_server_cert(&ca, &["localhost"]).unwrap();

        let err = Identity::from_pem(b"", server.key_pem.as_bytes()).unwrap_err();
        assert_eq!(err, "no certificate found");
    }

    #[test]
    fn garbage_key_is_rejected() {
        let ca = generate_ca("Identity Test").unwrap();
        let server = generate_server_cert(&ca, &["localhost"]).unwrap();

        assert!(Identity::from_pem(server.cert_pem.as_bytes(), b"not a key").is_err());
    }

    #[test]
    fn debug_output_hides_key() {
        let ca = generate_ca("Identity Test").unwrap();
        let server = generate_server_cert(&ca, &["localhost"]).unwrap();
        let identity =
            Identity::from_pem(server.cert_pem.as_bytes(), server.key_pem.as_bytes()).unwrap();

        let rendered = format!("{identity:?}");
        assert!(rendered.contains("chain_len: 1"));
        assert!(!rendered.contains("PRIVATE"));
    }
}
