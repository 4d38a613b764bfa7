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
    crl::Crl,
    CertificatePurpose, CertificateRole, CheckKind, RoleSet, Status, ValidationContext,
};

/// Answers whether `target` is revoked according to `crl`.
///
/// Problems with the CRL itself are recorded in `diagnostics` and yield
/// [`RevocationVerdict::Unknown`].
pub(super) async fn validate(
    env: &Env<'_>,
    target: &Target<'_>,
    crl: &Crl,
    diagnostics: &mut StatusTracker,
) -> RevocationVerdict {
    let issuer = target.issuer;
    let role = CertificateRole::CrlIssuer.as_str();

    if !crl.is_issued_by(issuer) {
        report_item!(
            issuer.reference(),
            format!("CRL was issued by {}, not by the certificate issuer", crl.issuer),
            "check_crl"
        )
        .role(role)
        .reason(validation_codes::REVOCATION_ISSUER_UNTRUSTED)
        .indeterminate(diagnostics);
        return RevocationVerdict::Unknown(validation_codes::REVOCATION_ISSUER_UNTRUSTED);
    }

    let ctx = ValidationContext::new(
        RoleSet::single(CertificateRole::CrlIssuer),
        CheckKind::RevocationData,
        target.reference_time,
    );

    let trust = env
        .cache
        .crl_checks
        .get_or_compute((issuer.fingerprint(), crl.fingerprint(), ctx), || {
            check_signer(env, issuer, crl, target.reference_time, target.supplied)
        })
        .await;

    if let Some(failure) = trust.failure {
        diagnostics.extend(&trust.items);
        return RevocationVerdict::Unknown(failure);
    }

    if !is_fresh(
        crl.this_update,
        crl.next_update,
        target.reference_time,
        env.policy.allowed_clock_skew,
        target.settings.freshness,
    ) {
        report_item!(
            issuer.reference(),
            format!(
                "CRL issued {} is not current at {}",
                crl.this_update, target.reference_time
            ),
            "check_crl"
        )
        .role(role)
        .reason(validation_codes::REVOCATION_DATA_STALE)
        .indeterminate(diagnostics);
        return RevocationVerdict::Unknown(validation_codes::REVOCATION_DATA_STALE);
    }

    match crl.find(&target.node.certificate.serial) {
        Some(entry) if entry.revocation_time <= target.reference_time => {
            RevocationVerdict::Revoked {
                at: entry.revocation_time,
                reason: entry.reason,
            }
        }
        _ => RevocationVerdict::NotRevoked,
    }
}

/// Verifies the CRL signature and the chain of its issuer. The result only
/// depends on the issuer, the CRL and the reference time, so it is shared
/// by every certificate the CRL covers.
async fn check_signer(
    env: &Env<'_>,
    issuer: &Arc<Certificate>,
    crl: &Crl,
    reference_time: DateTime<Utc>,
    supplied: &[Arc<Certificate>],
) -> ArtifactTrust {
    let role = CertificateRole::CrlIssuer.as_str();
    let mut items = StatusTracker::default();

    if !env
        .verifier
        .verify(&crl.signature_algorithm, &crl.tbs, &crl.signature, &issuer.spki)
    {
        report_item!(
            issuer.reference(),
            "CRL signature does not verify with the issuer key",
            "check_crl"
        )
        .role(role)
        .reason(validation_codes::REVOCATION_SIGNATURE_INVALID)
        .indeterminate(&mut items);

        return ArtifactTrust {
            failure: Some(validation_codes::REVOCATION_SIGNATURE_INVALID),
            items: items.items().to_vec(),
        };
    }

    let chain = validate_chain(
        env,
        ChainRequest {
            leaf: issuer.clone(),
            purpose: CertificatePurpose::CrlSigning,
            check_kind: CheckKind::RevocationData,
            reference_time,
            check_revocation: false,
            supplied: supplied.to_vec(),
        },
    )
    .await;

    if chain.worst_status() == Some(Status::Valid) {
        return ArtifactTrust::default();
    }

    report_item!(
        issuer.reference(),
        format!("CRL issuer is not trusted: {}", first_problem(&chain)),
        "check_crl"
    )
    .role(role)
    .reason(validation_codes::REVOCATION_ISSUER_UNTRUSTED)
    .indeterminate(&mut items);

    ArtifactTrust {
        failure: Some(validation_codes::REVOCATION_ISSUER_UNTRUSTED),
        items: items.items().to_vec(),
    }
}
