// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::{collections::HashSet, sync::Arc};

use crate::{
    certificate::{Certificate, Fingerprint},
    Error, Result,
};

/// The certificates a caller trusts without further issuer resolution.
///
/// The set is supplied by the caller and never modified by validation.
#[derive(Clone, Debug, Default)]
pub struct TrustAnchorSet {
    anchors: Vec<Arc<Certificate>>,
    fingerprints: HashSet<Fingerprint>,
}

impl TrustAnchorSet {
    /// Creates a set from parsed certificates. Duplicates are dropped.
    pub fn new<I>(anchors: I) -> Self
    where
        I: IntoIterator<Item = Arc<Certificate>>,
    {
        let mut set = Self::default();
        for anchor in anchors {
            if set.fingerprints.insert(anchor.fingerprint()) {
                set.anchors.push(anchor);
            }
        }
        set
    }

    /// Loads every certificate from a PEM bundle.
    ///
    /// JSON-escaped newlines (`\n` as two characters) are accepted so that a
    /// bundle can be embedded in a settings string.
    pub fn from_pem_bundle(pem: &[u8]) -> Result<Self> {
        let pem = String::from_utf8_lossy(pem).replace("\\n", "\n").into_bytes();

        let mut anchors = Vec::new();
        for pem_result in x509_parser::pem::Pem::iter_from_buffer(&pem) {
            let pem = pem_result.map_err(|e| Error::InvalidTrustAnchors(e.to_string()))?;
            let cert = Certificate::from_der(&pem.contents)
                .map_err(|e| Error::InvalidTrustAnchors(e.to_string()))?;
            anchors.push(Arc::new(cert));
        }

        if anchors.is_empty() {
            return Err(Error::InvalidTrustAnchors(
                "no certificates found in PEM bundle".into(),
            ));
        }

        Ok(Self::new(anchors))
    }

    /// Returns `true` if `cert` is one of the anchors.
    pub fn contains(&self, cert: &Certificate) -> bool {
        self.fingerprints.contains(&cert.fingerprint())
    }

    /// Anchors that could have issued `cert`.
    pub fn find_issuers(&self, cert: &Certificate) -> Vec<Arc<Certificate>> {
        self.anchors
            .iter()
            .filter(|anchor| cert.could_be_issued_by(anchor))
            .cloned()
            .collect()
    }

    /// Iterates the anchors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Certificate>> {
        self.anchors.iter()
    }

    /// Number of anchors.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns `true` if there are no anchors.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

impl FromIterator<Arc<Certificate>> for TrustAnchorSet {
    fn from_iter<I: IntoIterator<Item = Arc<Certificate>>>(iter: I) -> Self {
        Self::new(iter)
    }
}
