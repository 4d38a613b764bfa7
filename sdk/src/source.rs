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

//! Where issuer certificates and revocation data come from.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{certificate::Certificate, crl::Crl, ocsp::OcspResponse, OcspRequest};

/// Describes why a source could not supply revocation data.
///
/// None of these end a validation. They make the revocation status of the
/// certificate in question unknown.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum FetchError {
    /// The source has no data for the request. This is a normal answer.
    #[error("no data available")]
    NotAvailable,

    /// Data was found but could not be parsed.
    #[error("malformed data: {0}")]
    Malformed(String),

    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Identifies the issuer whose CRL is wanted.
#[derive(Clone, Copy, Debug)]
pub struct IssuerRef<'a> {
    /// The CA certificate that issued the certificate being checked.
    pub issuer: &'a Certificate,

    /// CRL distribution point URIs from the certificate being checked.
    pub distribution_points: &'a [String],
}

/// Identifies the certificate whose OCSP status is wanted.
#[derive(Clone, Copy, Debug)]
pub struct CertRef<'a> {
    /// The certificate being checked.
    pub certificate: &'a Certificate,

    /// Its issuer.
    pub issuer: &'a Certificate,
}

impl CertRef<'_> {
    /// Responder URIs from the certificate's authority information access.
    pub fn responders(&self) -> &[String] {
        &self.certificate.ocsp_responders
    }

    /// The request an online responder expects for this certificate.
    pub fn request(&self) -> OcspRequest {
        OcspRequest::for_certificate(self.certificate, self.issuer)
    }
}

/// A supplier of issuer certificates and revocation data.
///
/// Implementations include the store embedded in a signed document
/// ([`MemorySource`]) and online fetchers injected by the caller. The crate
/// performs no network access of its own.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// Returns certificates that could have issued `cert`.
    async fn resolve_issuer(&self, cert: &Certificate) -> Vec<Arc<Certificate>>;

    /// Returns the most recent CRL published by `issuer`.
    async fn fetch_crl(&self, issuer: &IssuerRef<'_>) -> Result<Arc<Crl>, FetchError>;

    /// Returns an OCSP response covering `cert`.
    async fn fetch_ocsp(&self, cert: &CertRef<'_>) -> Result<Arc<OcspResponse>, FetchError>;
}

/// An in-memory [`CertificateSource`], typically filled from the
/// certificates and revocation data embedded in a signed document.
///
/// Data that fails to parse is remembered: when no usable CRL or OCSP
/// response matches a request and some of the supplied data of that kind was
/// malformed, the fetch reports [`FetchError::Malformed`].
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    certificates: Vec<Arc<Certificate>>,
    crls: Vec<Arc<Crl>>,
    ocsp_responses: Vec<Arc<OcspResponse>>,
    malformed_certificates: usize,
    malformed_crls: usize,
    malformed_ocsp_responses: usize,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parsed certificate.
    pub fn with_certificate(mut self, cert: Arc<Certificate>) -> Self {
        self.certificates.push(cert);
        self
    }

    /// Adds a DER-encoded certificate.
    pub fn with_certificate_der(mut self, der: &[u8]) -> Self {
        match Certificate::from_der(der) {
            Ok(cert) => self.certificates.push(Arc::new(cert)),
            Err(e) => {
                log::warn!("ignoring embedded certificate: {e}");
                self.malformed_certificates += 1;
            }
        }
        self
    }

    /// Adds a parsed CRL.
    pub fn with_crl(mut self, crl: Arc<Crl>) -> Self {
        self.crls.push(crl);
        self
    }

    /// Adds a DER-encoded CRL.
    pub fn with_crl_der(mut self, der: &[u8]) -> Self {
        match Crl::from_der(der) {
            Ok(crl) => self.crls.push(Arc::new(crl)),
            Err(e) => {
                log::warn!("ignoring embedded CRL: {e}");
                self.malformed_crls += 1;
            }
        }
        self
    }

    /// Adds a parsed OCSP response.
    pub fn with_ocsp_response(mut self, response: Arc<OcspResponse>) -> Self {
        self.ocsp_responses.push(response);
        self
    }

    /// Adds a DER-encoded OCSP response.
    pub fn with_ocsp_der(mut self, der: &[u8]) -> Self {
        match OcspResponse::from_der(der) {
            Ok(response) => self.ocsp_responses.push(Arc::new(response)),
            Err(e) => {
                log::warn!("ignoring embedded OCSP response: {e}");
                self.malformed_ocsp_responses += 1;
            }
        }
        self
    }

    /// Number of certificates, CRLs and OCSP responses that could not be
    /// parsed.
    pub fn malformed_count(&self) -> usize {
        self.malformed_certificates + self.malformed_crls + self.malformed_ocsp_responses
    }
}

#[async_trait]
impl CertificateSource for MemorySource {
    async fn resolve_issuer(&self, cert: &Certificate) -> Vec<Arc<Certificate>> {
        self.certificates
            .iter()
            .filter(|candidate| cert.could_be_issued_by(candidate))
            .cloned()
            .collect()
    }

    async fn fetch_crl(&self, issuer: &IssuerRef<'_>) -> Result<Arc<Crl>, FetchError> {
        let newest = self
            .crls
            .iter()
            .filter(|crl| crl.is_issued_by(issuer.issuer))
            .max_by_key(|crl| crl.this_update);

        match newest {
            Some(crl) => Ok(crl.clone()),
            None if self.malformed_crls > 0 => Err(FetchError::Malformed(format!(
                "{} embedded CRL(s) could not be parsed",
                self.malformed_crls
            ))),
            None => Err(FetchError::NotAvailable),
        }
    }

    async fn fetch_ocsp(&self, cert: &CertRef<'_>) -> Result<Arc<OcspResponse>, FetchError> {
        let newest = self
            .ocsp_responses
            .iter()
            .filter(|response| {
                response
                    .find_response(cert.certificate, cert.issuer)
                    .is_some()
            })
            .max_by_key(|response| response.produced_at);

        match newest {
            Some(response) => Ok(response.clone()),
            None if self.malformed_ocsp_responses > 0 => Err(FetchError::Malformed(format!(
                "{} embedded OCSP response(s) could not be parsed",
                self.malformed_ocsp_responses
            ))),
            None => Err(FetchError::NotAvailable),
        }
    }
}
