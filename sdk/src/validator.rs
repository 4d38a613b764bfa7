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

//! The caller-facing entry points.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use sigtrust_status_tracker::{
    report_item, validation_codes, FailureKind, StatusTracker, ValidationReport,
};
use tokio::sync::Semaphore;

use crate::{
    certificate::Certificate,
    chain::{validate_chain, ChainRequest, Env},
    policy::ValidationPolicy,
    revocation::RunCache,
    source::CertificateSource,
    trust_anchors::TrustAnchorSet,
    verifier::{NativeSignatureVerifier, SignatureVerifier},
    CertificatePurpose, CertificateRole, CheckKind, Error, Result,
};

/// Validates signer certificates against trust anchors.
///
/// The validator holds the pluggable parts of a validation: the store of
/// certificates and revocation data embedded in the signed document, the
/// online fetcher, and the signature verifier. Each call to [`validate`] or
/// [`start_run`] starts a fresh run with its own cache.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use sigtrust::{
/// #     Certificate, MemorySource, SignatureValidator, TrustAnchorSet, ValidationPolicy,
/// # };
/// # async fn run(
/// #     signer: Arc<Certificate>,
/// #     chain: Vec<Arc<Certificate>>,
/// #     anchors: TrustAnchorSet,
/// # ) {
/// let validator = SignatureValidator::new().with_document_store(Arc::new(MemorySource::new()));
///
/// let report = validator
///     .validate(signer, &chain, chrono::Utc::now(), &anchors, &ValidationPolicy::default())
///     .await;
///
/// println!("{report}");
/// # }
/// ```
///
/// [`validate`]: Self::validate
/// [`start_run`]: Self::start_run
pub struct SignatureValidator {
    document: Option<Arc<dyn CertificateSource>>,
    online: Option<Arc<dyn CertificateSource>>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl Default for SignatureValidator {
    fn default() -> Self {
        Self {
            document: None,
            online: None,
            verifier: Arc::new(NativeSignatureVerifier),
        }
    }
}

impl SignatureValidator {
    /// Creates a validator without sources that uses
    /// [`NativeSignatureVerifier`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store of certificates and revocation data that came with the
    /// signed document.
    pub fn with_document_store(mut self, source: Arc<dyn CertificateSource>) -> Self {
        self.document = Some(source);
        self
    }

    /// Sets the source used to fetch missing issuers and revocation data.
    pub fn with_online_source(mut self, source: Arc<dyn CertificateSource>) -> Self {
        self.online = Some(source);
        self
    }

    /// Replaces the signature verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Validates the chain of `signer`, a document signing certificate.
    ///
    /// `supplied` holds the other certificates that came with the
    /// signature, in any order. Problems with the chain are reported, never
    /// returned as errors.
    pub async fn validate(
        &self,
        signer: Arc<Certificate>,
        supplied: &[Arc<Certificate>],
        reference_time: DateTime<Utc>,
        anchors: &TrustAnchorSet,
        policy: &ValidationPolicy,
    ) -> ValidationReport {
        self.start_run(anchors, policy)
            .validate(signer, supplied, reference_time)
            .await
    }

    /// Validates the chain of `leaf` for a role other than document signer,
    /// such as [`CertificateRole::TimestampAuthority`].
    ///
    /// Fails with [`Error::UnsupportedRole`] for roles that cannot start a
    /// path.
    pub async fn validate_as(
        &self,
        role: CertificateRole,
        leaf: Arc<Certificate>,
        supplied: &[Arc<Certificate>],
        reference_time: DateTime<Utc>,
        anchors: &TrustAnchorSet,
        policy: &ValidationPolicy,
    ) -> Result<ValidationReport> {
        let request =
            SignatureRequest::new(leaf, supplied.to_vec(), reference_time).as_role(role)?;

        Ok(self
            .start_run(anchors, policy)
            .validate_request(&request)
            .await)
    }

    /// Parses DER inputs and validates the signer's chain.
    ///
    /// A certificate that cannot be parsed ends the validation with a
    /// `certificate.malformed` item.
    pub async fn validate_der(
        &self,
        signer_der: &[u8],
        chain_der: &[&[u8]],
        reference_time: DateTime<Utc>,
        anchors: &TrustAnchorSet,
        policy: &ValidationPolicy,
    ) -> ValidationReport {
        let mut tracker = StatusTracker::default();

        let signer = match Certificate::from_der(signer_der) {
            Ok(cert) => Arc::new(cert),
            Err(e) => {
                report_malformed(&mut tracker, Some(CertificateRole::Signer), e.to_string());
                return tracker.into_report();
            }
        };

        let mut supplied = Vec::with_capacity(chain_der.len());
        for der in chain_der {
            match Certificate::from_der(der) {
                Ok(cert) => supplied.push(Arc::new(cert)),
                Err(e) => {
                    report_malformed(&mut tracker, None, e.to_string());
                    return tracker.into_report();
                }
            }
        }

        self.validate(signer, &supplied, reference_time, anchors, policy)
            .await
    }

    /// Starts a run in which several signatures can be validated while
    /// sharing revocation results.
    pub fn start_run<'a>(
        &'a self,
        anchors: &'a TrustAnchorSet,
        policy: &'a ValidationPolicy,
    ) -> ValidationRun<'a> {
        ValidationRun {
            validator: self,
            anchors,
            policy,
            cache: RunCache::default(),
            fetch_limiter: Semaphore::new(policy.max_concurrent_fetches.max(1)),
        }
    }
}

fn report_malformed(tracker: &mut StatusTracker, role: Option<CertificateRole>, error: String) {
    let item = report_item!(
        "<unparsed certificate>",
        format!("certificate could not be parsed: {error}"),
        "validate_der"
    )
    .reason(validation_codes::MALFORMED_CERTIFICATE);

    let item = match role {
        Some(role) => item.role(role.as_str()),
        None => item,
    };

    item.failure(tracker, FailureKind::Structural);
}

/// One signature to validate within a [`ValidationRun`].
#[derive(Clone, Debug)]
pub struct SignatureRequest {
    /// Leaf certificate of the signature.
    pub signer: Arc<Certificate>,

    /// Other certificates that came with the signature.
    pub chain: Vec<Arc<Certificate>>,

    /// Time the signature is evaluated at.
    pub reference_time: DateTime<Utc>,

    purpose: CertificatePurpose,
}

impl SignatureRequest {
    /// Creates a request for a document signature.
    pub fn new(
        signer: Arc<Certificate>,
        chain: Vec<Arc<Certificate>>,
        reference_time: DateTime<Utc>,
    ) -> Self {
        Self {
            signer,
            chain,
            reference_time,
            purpose: CertificatePurpose::Signature,
        }
    }

    /// Validates the leaf in `role` instead of as a document signer.
    pub fn as_role(mut self, role: CertificateRole) -> Result<Self> {
        self.purpose = role.purpose().ok_or(Error::UnsupportedRole(role))?;
        Ok(self)
    }

    /// What the leaf is validated for.
    pub fn purpose(&self) -> CertificatePurpose {
        self.purpose
    }
}

/// Validations that share one cache and one fetch limit.
///
/// Revocation outcomes and CRL checks computed for one signature are reused
/// by the others, so an intermediate shared by several chains is checked
/// once.
pub struct ValidationRun<'a> {
    validator: &'a SignatureValidator,
    anchors: &'a TrustAnchorSet,
    policy: &'a ValidationPolicy,
    cache: RunCache,
    fetch_limiter: Semaphore,
}

impl ValidationRun<'_> {
    /// Validates the chain of a document signing certificate.
    pub async fn validate(
        &self,
        signer: Arc<Certificate>,
        supplied: &[Arc<Certificate>],
        reference_time: DateTime<Utc>,
    ) -> ValidationReport {
        let request = SignatureRequest::new(signer, supplied.to_vec(), reference_time);
        self.validate_request(&request).await
    }

    /// Validates one request.
    pub async fn validate_request(&self, request: &SignatureRequest) -> ValidationReport {
        let env = Env {
            policy: self.policy,
            anchors: self.anchors,
            document: self.validator.document.as_deref(),
            online: self.validator.online.as_deref(),
            verifier: self.validator.verifier.as_ref(),
            cache: &self.cache,
            fetch_limiter: &self.fetch_limiter,
        };

        let chain = ChainRequest {
            leaf: request.signer.clone(),
            purpose: request.purpose,
            check_kind: check_kind_for(request.purpose),
            reference_time: request.reference_time,
            check_revocation: true,
            supplied: request.chain.clone(),
        };

        let report = validate_chain(&env, chain).await.into_report();
        log::debug!(
            "validated {}: {}",
            request.signer.reference(),
            report.status()
        );

        report
    }

    /// Validates independent signatures concurrently. Reports are returned
    /// in request order.
    pub async fn validate_all(&self, requests: &[SignatureRequest]) -> Vec<ValidationReport> {
        join_all(requests.iter().map(|request| self.validate_request(request))).await
    }

    /// Number of revocation outcomes computed so far.
    #[cfg(test)]
    pub(crate) fn revocation_outcomes(&self) -> usize {
        self.cache.outcomes.completed()
    }

    /// Number of OCSP responder checks computed so far.
    #[cfg(test)]
    pub(crate) fn responder_checks(&self) -> usize {
        self.cache.responder_checks.completed()
    }
}

fn check_kind_for(purpose: CertificatePurpose) -> CheckKind {
    match purpose {
        CertificatePurpose::Signature => CheckKind::Chain,
        CertificatePurpose::Timestamping => CheckKind::Timestamp,
        CertificatePurpose::OcspSigning | CertificatePurpose::CrlSigning => {
            CheckKind::RevocationData
        }
    }
}
