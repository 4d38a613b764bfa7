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

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sigtrust_status_tracker::{report_item, validation_codes, StatusTracker};

use super::{first_problem, is_fresh, ArtifactTrust, RevocationVerdict, Target};
use crate::{
    certificate::Certificate,
    chain::{validate_chain, ChainRequest, Env},
    ocsp::{CertStatus, OcspResponse},
    CertificatePurpose, CertificateRole, CheckKind, RoleSet, Status, ValidationContext,
};

/// Answers whether `target` is revoked according to `response`.
///
/// Returns `None` when the response says nothing about the target. Problems
/// with the response itself are recorded in `diagnostics` and yield
/// [`RevocationVerdict::Unknown`].
pub(super) async fn validate(
    env: &Env<'_>,
    target: &Target<'_>,
    response: &OcspResponse,
    diagnostics: &mut StatusTracker,
) -> Option<RevocationVerdict> {
    let cert = &target.node.certificate;
    let issuer = target.issuer;
    let role = CertificateRole::OcspResponder.as_str();

    let Some(single) = response.find_response(cert, issuer) else {
        log::debug!("OCSP response does not cover {}", cert.reference());
        return None;
    };

    let untrusted = |diagnostics: &mut StatusTracker, reference: String, message: String| {
        report_item!(reference, message, "check_ocsp")
            .role(role)
            .reason(validation_codes::REVOCATION_ISSUER_UNTRUSTED)
            .indeterminate(diagnostics);
        Some(RevocationVerdict::Unknown(
            validation_codes::REVOCATION_ISSUER_UNTRUSTED,
        ))
    };

    let responder: Arc<Certificate> = if response.responder_id.matches(issuer) {
        issuer.clone()
    } else {
        let embedded = response
            .certificates
            .iter()
            .chain(target.supplied.iter())
            .find(|candidate| response.responder_id.matches(candidate));

        match embedded {
            Some(responder) => responder.clone(),
            None => {
                return untrusted(
                    diagnostics,
                    issuer.reference(),
                    "OCSP responder certificate was not found".to_string(),
                )
            }
        }
    };

    if !env.verifier.verify(
        &response.signature_algorithm,
        &response.tbs,
        &response.signature,
        &responder.spki,
    ) {
        report_item!(
            responder.reference(),
            "OCSP response signature does not verify with the responder key",
            "check_ocsp"
        )
        .role(role)
        .reason(validation_codes::REVOCATION_SIGNATURE_INVALID)
        .indeterminate(diagnostics);
        return Some(RevocationVerdict::Unknown(
            validation_codes::REVOCATION_SIGNATURE_INVALID,
        ));
    }

    let ctx = ValidationContext::new(
        RoleSet::single(CertificateRole::OcspResponder),
        CheckKind::RevocationData,
        target.reference_time,
    );

    let trust = env
        .cache
        .responder_checks
        .get_or_compute((responder.fingerprint(), issuer.fingerprint(), ctx), || {
            check_responder(
                env,
                &responder,
                issuer,
                response,
                target.reference_time,
                target.supplied,
            )
        })
        .await;

    if let Some(failure) = trust.failure {
        diagnostics.extend(&trust.items);
        return Some(RevocationVerdict::Unknown(failure));
    }

    if !is_fresh(
        single.this_update,
        single.next_update,
        target.reference_time,
        env.policy.allowed_clock_skew,
        target.settings.freshness,
    ) {
        report_item!(
            responder.reference(),
            format!(
                "OCSP response issued {} is not current at {}",
                single.this_update, target.reference_time
            ),
            "check_ocsp"
        )
        .role(role)
        .reason(validation_codes::REVOCATION_DATA_STALE)
        .indeterminate(diagnostics);
        return Some(RevocationVerdict::Unknown(
            validation_codes::REVOCATION_DATA_STALE,
        ));
    }

    Some(match single.status {
        CertStatus::Good => RevocationVerdict::NotRevoked,
        CertStatus::Revoked { time, reason } if time <= target.reference_time => {
            RevocationVerdict::Revoked { at: time, reason }
        }
        CertStatus::Revoked { .. } => RevocationVerdict::NotRevoked,
        CertStatus::Unknown => {
            RevocationVerdict::Unknown(validation_codes::REVOCATION_STATUS_UNKNOWN)
        }
    })
}

/// Checks that `responder` may answer for certificates of `issuer` and that
/// its chain validates. The result is shared by every response the
/// responder signs for that issuer.
async fn check_responder(
    env: &Env<'_>,
    responder: &Arc<Certificate>,
    issuer: &Certificate,
    response: &OcspResponse,
    reference_time: DateTime<Utc>,
    supplied: &[Arc<Certificate>],
) -> ArtifactTrust {
    let mut items = StatusTracker::default();
    let untrusted = |items: &mut StatusTracker, message: String| {
        report_item!(responder.reference(), message, "check_ocsp")
            .role(CertificateRole::OcspResponder.as_str())
            .reason(validation_codes::REVOCATION_ISSUER_UNTRUSTED)
            .indeterminate(items);
    };

    let delegated = responder.fingerprint() != issuer.fingerprint();
    if delegated && !is_authorized_delegate(env, responder, issuer) {
        untrusted(
            &mut items,
            format!(
                "OCSP responder is not authorized by {} to sign responses",
                issuer.subject
            ),
        );
        return ArtifactTrust {
            failure: Some(validation_codes::REVOCATION_ISSUER_UNTRUSTED),
            items: items.items().to_vec(),
        };
    }

    let mut supplied = supplied.to_vec();
    supplied.extend(response.certificates.iter().cloned());

    let chain = validate_chain(
        env,
        ChainRequest {
            leaf: responder.clone(),
            purpose: CertificatePurpose::OcspSigning,
            check_kind: CheckKind::RevocationData,
            reference_time,
            check_revocation: false,
            supplied,
        },
    )
    .await;

    if chain.worst_status() == Some(Status::Valid) {
        return ArtifactTrust::default();
    }

    untrusted(
        &mut items,
        format!("OCSP responder is not trusted: {}", first_problem(&chain)),
    );

    ArtifactTrust {
        failure: Some(validation_codes::REVOCATION_ISSUER_UNTRUSTED),
        items: items.items().to_vec(),
    }
}

/// A delegated responder must be certified by the target's issuer for OCSP
/// signing.
fn is_authorized_delegate(env: &Env<'_>, responder: &Certificate, issuer: &Certificate) -> bool {
    let ocsp_signing = responder
        .extended_key_usage
        .as_ref()
        .is_some_and(|eku| eku.ocsp_signing);

    ocsp_signing
        && responder.could_be_issued_by(issuer)
        && env.verifier.verify(
            &responder.signature_algorithm,
            &responder.tbs,
            &responder.signature,
            &issuer.spki,
        )
}
