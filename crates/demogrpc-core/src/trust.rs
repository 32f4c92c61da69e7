//! Trust store built from a PEM CA bundle.

use std::path::Path;
use std::sync::Arc;

use rustls::RootCertStore;
use rustls::pki_types::CertificateDer;
use rustls::pki_types::pem::PemObject;
use tracing::{debug, warn};

use crate::error::{Result, TlsError};

/// Immutable set of trusted certificate authorities.
///
/// Cheap to clone; all clones share the same underlying store.
#[derive(Debug, Clone)]
pub struct TrustStore {
    roots: Arc<RootCertStore>,
}

impl TrustStore {
    /// Read and parse a PEM CA bundle.
    ///
    /// Fails with [`TlsError::TrustStoreLoad`] when the file cannot be read
    /// and [`TlsError::TrustStoreParse`] when it holds no usable certificate.
    pub fn load(path: &Path) -> Result<Self> {
        let pem = std::fs::read(path).map_err(|source| TlsError::TrustStoreLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_pem(&pem).ok_or_else(|| TlsError::TrustStoreParse {
            path: path.to_path_buf(),
        })?;
        debug!(path = %path.display(), anchors = store.len(), "Loaded trust store");
        Ok(store)
    }

    /// Parse a PEM bundle, keeping every certificate rustls accepts as an
    /// anchor.
    ///
    /// Malformed PEM sections are skipped and scanning resumes at the next
    /// section. Returns `None` if nothing usable was found.
    pub fn from_pem(pem: &[u8]) -> Option<Self> {
        let mut malformed = 0_usize;
        // The slice iterator consumes the offending lines before yielding an
        // error, so every item moves the cursor forward.
        let certs: Vec<CertificateDer<'static>> = CertificateDer::pem_slice_iter(pem)
            .filter_map(|section| {
                section
                    .inspect_err(|e| {
                        malformed += 1;
                        debug!(error = %e, "Skipping malformed PEM section in CA bundle");
                    })
                    .ok()
            })
            .collect();

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(certs);
        if ignored > 0 || malformed > 0 {
            warn!(
                added,
                ignored,
                malformed,
                "Skipped unusable entries in CA bundle"
            );
        }
        if added == 0 {
            return None;
        }

        Some(Self {
            roots: Arc::new(roots),
        })
    }

    /// Shared handle to the underlying root store.
    pub fn roots(&self) -> Arc<RootCertStore> {
        Arc::clone(&self.roots)
    }

    /// Number of trust anchors.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
