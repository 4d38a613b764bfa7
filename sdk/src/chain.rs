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

//! Path building and per-hop validation from a leaf certificate up to a
//! trust anchor.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sigtrust_status_tracker::{report_item, validation_codes, FailureKind, Status, StatusTracker};
use tokio::sync::Semaphore;

use crate::{
    certificate::{Certificate, CertificateNode, Fingerprint},
    policy::{OnlineFetching, ValidationPolicy},
    revocation::{bounded_fetch, check_revocation, RunCache},
    source::{CertificateSource, FetchError},
    trust_anchors::TrustAnchorSet,
    verifier::SignatureVerifier,
    CertificatePurpose, CertificateRole, CheckKind,
};

/// Everything a chain walk can consult. Shared by every chain of a run.
pub(crate) struct Env<'a> {
    pub(crate) policy: &'a ValidationPolicy,
    pub(crate) anchors: &'a TrustAnchorSet,
    pub(crate) document: Option<&'a dyn CertificateSource>,
    pub(crate) online: Option<&'a dyn CertificateSource>,
    pub(crate) verifier: &'a dyn SignatureVerifier,
    pub(crate) cache: &'a RunCache,
    pub(crate) fetch_limiter: &'a Semaphore,
}

/// One path to walk.
pub(crate) struct ChainRequest {
    pub(crate) leaf: Arc<Certificate>,
    pub(crate) purpose: CertificatePurpose,
    pub(crate) check_kind: CheckKind,
    pub(crate) reference_time: DateTime<Utc>,

    /// `false` for the issuer chains of CRLs and OCSP responses.
    pub(crate) check_revocation: bool,

    /// Certificates offered alongside the leaf.
    pub(crate) supplied: Vec<Arc<Certificate>>,
}

/// Walks the path of `request.leaf` and records one item per check.
///
/// Boxed because revocation checking validates the issuer chains of CRLs
/// and OCSP responses through this same function.
pub(crate) fn validate_chain<'a>(
    env: &'a Env<'a>,
    request: ChainRequest,
) -> BoxFuture<'a, StatusTracker> {
    Box::pin(walk(env, request))
}

async fn walk(env: &Env<'_>, request: ChainRequest) -> StatusTracker {
    let ChainRequest {
        leaf,
        purpose,
        check_kind,
        reference_time,
        check_revocation: revocation_enabled,
        supplied,
    } = request;

    let mut tracker = StatusTracker::default();
    let skew = env.policy.allowed_clock_skew;
    let mut visited: HashSet<Fingerprint> = HashSet::new();
    let mut current = leaf;
    let mut position = 0;

    loop {
        let is_anchor = env.anchors.contains(&current);
        let role = CertificateRole::classify(position, purpose, is_anchor);
        let reference = current.reference();
        visited.insert(current.fingerprint());

        log::debug!("checking {reference} as {role} at position {position}");

        if position >= env.policy.max_chain_depth {
            report_item!(
                reference,
                format!(
                    "path is longer than {} certificates",
                    env.policy.max_chain_depth
                ),
                "validate_chain"
            )
            .role(role.as_str())
            .reason(validation_codes::CHAIN_TOO_LONG)
            .failure(&mut tracker, FailureKind::Constraint);
            break;
        }

        let missing = current.missing_fields();
        if !missing.is_empty() {
            report_item!(
                reference,
                format!("certificate is malformed: {}", missing.join(", ")),
                "validate_chain"
            )
            .role(role.as_str())
            .reason(validation_codes::MALFORMED_CERTIFICATE)
            .failure(&mut tracker, FailureKind::Structural);
            break;
        }

        if is_anchor {
            if current.is_valid_at(reference_time, skew) {
                report_item!(reference, "certificate is a trust anchor", "validate_chain")
                    .role(role.as_str())
                    .reason(validation_codes::CERTIFICATE_TRUSTED)
                    .success(&mut tracker);
            } else {
                report_outside_validity(&mut tracker, &current, role, reference_time);
            }
            break;
        }

        if current.is_self_issued() {
            report_item!(
                reference,
                "self-issued certificate is not a trust anchor",
                "validate_chain"
            )
            .role(CertificateRole::Untrusted.as_str())
            .reason(validation_codes::ISSUER_UNRESOLVED)
            .indeterminate(&mut tracker);
            break;
        }

        let issuer = match find_issuer(env, &current, &supplied, &visited).await {
            IssuerSearch::Found(issuer) => issuer,
            IssuerSearch::NoCandidates => {
                report_item!(
                    reference,
                    format!("no issuer found for {}", current.issuer),
                    "validate_chain"
                )
                .role(role.as_str())
                .reason(validation_codes::ISSUER_UNRESOLVED)
                .indeterminate(&mut tracker);
                break;
            }
            IssuerSearch::NoneVerified => {
                report_item!(
                    reference,
                    "signature does not verify with any candidate issuer",
                    "validate_chain"
                )
                .role(role.as_str())
                .reason(validation_codes::SIGNATURE_INVALID)
                .failure(&mut tracker, FailureKind::Cryptographic);
                break;
            }
        };

        if !current.is_valid_at(reference_time, skew) {
            report_outside_validity(&mut tracker, &current, role, reference_time);
            break;
        }

        if let Err(violation) = check_constraints(&current, role, position) {
            report_item!(reference, violation, "validate_chain")
                .role(role.as_str())
                .reason(validation_codes::CONSTRAINT_VIOLATION)
                .failure(&mut tracker, FailureKind::Constraint);
            break;
        }

        report_item!(
            reference.clone(),
            format!("certificate verified with issuer {}", issuer.subject),
            "validate_chain"
        )
        .role(role.as_str())
        .reason(validation_codes::CERTIFICATE_VALIDATED)
        .success(&mut tracker);

        if revocation_enabled {
            let node = CertificateNode {
                certificate: current.clone(),
                role,
                position,
            };

            let outcome =
                check_revocation(env, &node, &issuer, check_kind, reference_time, &supplied).await;
            if outcome.verdict.is_none() {
                log::debug!("revocation checking is disabled for {reference}");
            }
            tracker.extend(&outcome.items);

            if outcome.status() == Status::Invalid {
                break;
            }
        }

        current = issuer;
        position += 1;
    }

    tracker
}

enum IssuerSearch {
    Found(Arc<Certificate>),
    NoneVerified,
    NoCandidates,
}

/// Looks for the issuer of `cert` in the supplied certificates, the
/// document store, the trust anchors and finally the online source, and
/// stops at the first candidate whose key verifies the signature.
async fn find_issuer(
    env: &Env<'_>,
    cert: &Certificate,
    supplied: &[Arc<Certificate>],
    visited: &HashSet<Fingerprint>,
) -> IssuerSearch {
    let mut tried: HashSet<Fingerprint> = HashSet::new();

    let from_supplied: Vec<Arc<Certificate>> = supplied
        .iter()
        .filter(|candidate| cert.could_be_issued_by(candidate))
        .cloned()
        .collect();
    if let Some(issuer) = try_candidates(env, cert, from_supplied, visited, &mut tried) {
        return IssuerSearch::Found(issuer);
    }

    if let Some(document) = env.document {
        let candidates = document.resolve_issuer(cert).await;
        if let Some(issuer) = try_candidates(env, cert, candidates, visited, &mut tried) {
            return IssuerSearch::Found(issuer);
        }
    }

    let from_anchors = env.anchors.find_issuers(cert);
    if let Some(issuer) = try_candidates(env, cert, from_anchors, visited, &mut tried) {
        return IssuerSearch::Found(issuer);
    }

    if let Some(online) = env.online {
        if env.policy.online_fetching != OnlineFetching::NeverFetch {
            let lookup = bounded_fetch(env, async {
                Ok::<_, FetchError>(online.resolve_issuer(cert).await)
            });
            match lookup.await {
                Ok(candidates) => {
                    if let Some(issuer) =
                        try_candidates(env, cert, candidates, visited, &mut tried)
                    {
                        return IssuerSearch::Found(issuer);
                    }
                }
                Err(e) => log::warn!("online issuer lookup for {} failed: {e:?}", cert.subject),
            }
        }
    }

    if tried.is_empty() {
        IssuerSearch::NoCandidates
    } else {
        IssuerSearch::NoneVerified
    }
}

fn try_candidates(
    env: &Env<'_>,
    cert: &Certificate,
    candidates: Vec<Arc<Certificate>>,
    visited: &HashSet<Fingerprint>,
    tried: &mut HashSet<Fingerprint>,
) -> Option<Arc<Certificate>> {
    candidates.into_iter().find(|candidate| {
        let fingerprint = candidate.fingerprint();
        if visited.contains(&fingerprint) || !tried.insert(fingerprint) {
            return false;
        }

        env.verifier.verify(
            &cert.signature_algorithm,
            &cert.tbs,
            &cert.signature,
            &candidate.spki,
        )
    })
}

fn report_outside_validity(
    tracker: &mut StatusTracker,
    cert: &Certificate,
    role: CertificateRole,
    reference_time: DateTime<Utc>,
) {
    report_item!(
        cert.reference(),
        format!(
            "certificate is not valid at {reference_time} (valid {} to {})",
            cert.not_before, cert.not_after
        ),
        "validate_chain"
    )
    .role(role.as_str())
    .reason(validation_codes::CERTIFICATE_EXPIRED_OR_NOT_YET_VALID)
    .failure(tracker, FailureKind::Temporal);
}

/// Checks basic constraints, key usage and extended key usage for the role
/// `cert` holds at `position`.
pub(crate) fn check_constraints(
    cert: &Certificate,
    role: CertificateRole,
    position: usize,
) -> Result<(), String> {
    match role {
        CertificateRole::Signer => match cert.key_usage {
            Some(ku) if !(ku.digital_signature || ku.non_repudiation) => Err(
                "key usage allows neither digitalSignature nor nonRepudiation".to_string(),
            ),
            _ => Ok(()),
        },

        CertificateRole::ChainIssuer => {
            let Some(bc) = cert.basic_constraints.filter(|bc| bc.ca) else {
                return Err("issuer is not a CA".to_string());
            };

            let below = position.saturating_sub(1);
            if let Some(path_len) = bc.path_len {
                if (path_len as usize) < below {
                    return Err(format!(
                        "path length constraint {path_len} is exceeded by {below} intermediate(s)"
                    ));
                }
            }

            match cert.key_usage {
                Some(ku) if !ku.key_cert_sign => {
                    Err("key usage does not allow keyCertSign".to_string())
                }
                _ => Ok(()),
            }
        }

        CertificateRole::CrlIssuer => match cert.key_usage {
            Some(ku) if !ku.crl_sign => Err("key usage does not allow cRLSign".to_string()),
            _ => Ok(()),
        },

        CertificateRole::OcspResponder => {
            let delegated = cert
                .extended_key_usage
                .as_ref()
                .is_some_and(|eku| eku.ocsp_signing);

            if delegated || cert.is_ca() {
                Ok(())
            } else {
                Err("extended key usage does not include OCSPSigning".to_string())
            }
        }

        CertificateRole::TimestampAuthority => {
            if cert
                .extended_key_usage
                .as_ref()
                .is_some_and(|eku| eku.time_stamping)
            {
                Ok(())
            } else {
                Err("extended key usage does not include timeStamping".to_string())
            }
        }

        CertificateRole::RootAnchor | CertificateRole::Untrusted => Ok(()),
    }
}
