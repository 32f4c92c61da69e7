//! Development certificate generation using rcgen.
//!
//! Produces a throwaway CA plus a server and a client certificate signed by
//! it, laid out under the file names the server and client expect by
//! default. NOT suitable for production use.
//!
//! Requires the `certs` feature.

use std::path::{Path, PathBuf};

use rcgen::{
    BasicConstraints, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, Issuer, KeyPair,
    KeyUsagePurpose,
};
use tracing::info;

use crate::tls::files;

/// CA material for signing leaf certificates.
pub struct CaBundle {
    /// CA certificate parameters (needed for signing).
    pub params: CertificateParams,
    /// CA key pair.
    pub key_pair: KeyPair,
    /// PEM-encoded CA certificate.
    pub ca_cert_pem: String,
}

/// A PEM certificate and its PEM private key.
#[derive(Debug, Clone)]
pub struct IssuedCert {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Everything needed to run the server and one client.
#[derive(Debug, Clone)]
pub struct DevBundle {
    pub ca_cert_pem: String,
    pub server: IssuedCert,
    pub client: IssuedCert,
}

/// Where [`write_dev_bundle`] put each file.
#[derive(Debug, Clone)]
pub struct DevBundlePaths {
    pub ca_cert: PathBuf,
    pub server_cert: PathBuf,
    pub server_key: PathBuf,
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
}

/// Certificate generation errors.
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    #[error("Certificate generation error: {0}")]
    Generation(String),

    #[error("I/O error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn generation(e: rcgen::Error) -> CertError {
    CertError::Generation(e.to_string())
}

/// Generate a self-signed CA.
pub fn generate_ca(org_name: &str) -> Result<CaBundle, CertError> {
    let mut params = CertificateParams::default();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params
        .distinguished_name
        .push(DnType::CommonName, format!("{org_name} CA"));
    params
        .distinguished_name
        .push(DnType::OrganizationName, org_name);
    params.key_usages.push(KeyUsagePurpose::KeyCertSign);
    params.key_usages.push(KeyUsagePurpose::CrlSign);

    let key_pair = KeyPair::generate().map_err(generation)?;
    let ca_cert = params.self_signed(&key_pair).map_err(generation)?;

    Ok(CaBundle {
        ca_cert_pem: ca_cert.pem(),
        params,
        key_pair,
    })
}

/// Generate a server certificate for `server_names` (DNS names or IP
/// literals) signed by `ca`.
pub fn generate_server_cert(ca: &CaBundle, server_names: &[&str]) -> Result<IssuedCert, CertError> {
    let mut params = CertificateParams::new(
        server_names
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    )
    .map_err(generation)?;
    let common_name = server_names.first().copied().unwrap_or("demogrpc server");
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params
        .extended_key_usages
        .push(ExtendedKeyUsagePurpose::ServerAuth);

    sign(params, ca)
}

/// Generate a client certificate with `common_name` as its CN, signed by
/// `ca`.
pub fn generate_client_cert(ca: &CaBundle, common_name: &str) -> Result<IssuedCert, CertError> {
    let mut params = CertificateParams::default();
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params
        .extended_key_usages
        .push(ExtendedKeyUsagePurpose::ClientAuth);

    sign(params, ca)
}

fn sign(params: CertificateParams, ca: &CaBundle) -> Result<IssuedCert, CertError> {
    let issuer = Issuer::from_params(&ca.params, &ca.key_pair);
    let key = KeyPair::generate().map_err(generation)?;
    let cert = params.signed_by(&key, &issuer).map_err(generation)?;

    Ok(IssuedCert {
        cert_pem: cert.pem(),
        key_pem: key.serialize_pem(),
    })
}

/// Generate a fresh CA with one server and one client certificate.
pub fn generate_dev_bundle(
    server_names: &[&str],
    client_name: &str,
) -> Result<DevBundle, CertError> {
    let ca = generate_ca("demogrpc Dev")?;
    let server = generate_server_cert(&ca, server_names)?;
    let client = generate_client_cert(&ca, client_name)?;

    Ok(DevBundle {
        ca_cert_pem: ca.ca_cert_pem,
        server,
        client,
    })
}

/// Write a dev bundle into `dir` using the default file names.
pub fn write_dev_bundle(dir: &Path, bundle: &DevBundle) -> Result<DevBundlePaths, CertError> {
    std::fs::create_dir_all(dir).map_err(|source| CertError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let paths = DevBundlePaths {
        ca_cert: dir.join(files::CA_CERT),
        server_cert: dir.join(files::SERVER_CERT),
        server_key: dir.join(files::SERVER_KEY),
        client_cert: dir.join(files::CLIENT_CERT),
        client_key: dir.join(files::CLIENT_KEY),
    };

    for (path, contents) in [
        (&paths.ca_cert, &bundle.ca_cert_pem),
        (&paths.server_cert, &bundle.server.cert_pem),
        (&paths.server_key, &bundle.server.key_pem),
        (&paths.client_cert, &bundle.client.cert_pem),
        (&paths.client_key, &bundle.client.key_pem),
    ] {
        std::fs::write(path, contents).map_err(|source| CertError::Io {
            path: path.clone(),
            source,
        })?;
    }

    info!(dir = %dir.display(), "Dev certificates written");
    Ok(paths)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generate_ca_produces_valid_pem() {
        let ca = generate_ca("demogrpc Test").unwrap();
        assert!(ca.ca_cert_pem.contains("BEGIN CERTIFICATE"));
        assert!(ca.ca_cert_pem.contains("END CERTIFICATE"));
    }

    #[test]
    fn server_and_client_certs_differ() {
        let bundle = generate_dev_bundle(&["localhost", "127.0.0.1"], "tester").unwrap();

        assert!(bundle.server.key_pem.contains("BEGIN PRIVATE KEY"));
        assert!(bundle.client.key_pem.contains("BEGIN PRIVATE KEY"));
        assert_ne!(bundle.server.cert_pem, bundle.client.cert_pem);
        assert_ne!(bundle.ca_cert_pem, bundle.server.cert_pem);
    }

    #[test]
    fn write_dev_bundle_uses_default_names() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = generate_dev_bundle(&["localhost"], "tester").unwrap();

        let paths = write_dev_bundle(dir.path(), &bundle).unwrap();

        for name in [
            files::CA_CERT,
            files::SERVER_CERT,
            files::SERVER_KEY,
            files::CLIENT_CERT,
            files::CLIENT_KEY,
        ] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
        assert_eq!(
            std::fs::read_to_string(paths.server_key).unwrap(),
            bundle.server.key_pem
        );
    }

    #[test]
    fn written_bundle_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = generate_dev_bundle(&["localhost"], "tester").unwrap();
        let paths = write_dev_bundle(dir.path(), &bundle).unwrap();

        crate::Identity::load(&paths.server_cert, &paths.server_key).unwrap();
        crate::Identity::load(&paths.client_cert, &paths.client_key).unwrap();
        let trust = crate::TrustStore::load(&paths.ca_cert).unwrap();
        assert_eq!(trust.len(), 1);
    }
}
