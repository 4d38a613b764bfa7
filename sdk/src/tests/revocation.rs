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

use std::{sync::Arc, time::Duration as StdDuration};

use chrono::Duration;

use super::fixtures::*;
use crate::{
    revocation::is_fresh, validation_codes, CertificateRole, FailureKind, FetchError,
    MemorySource, OnlineFetching, PolicyOverrides, PolicyRule, RevocationFailureMode, RoleSet,
    SignatureValidator, Status, ValidationPolicy, ValidationReport,
};

async fn run(
    pki: &TestPki,
    validator: &SignatureValidator,
    policy: &ValidationPolicy,
) -> ValidationReport {
    validator
        .validate(
            pki.signer.clone(),
            &pki.chain(),
            reference_time(),
            &pki.anchors(),
            policy,
        )
        .await
}

async fn with_store(pki: &TestPki, store: MemorySource) -> ValidationReport {
    run(pki, &validator(store), &ValidationPolicy::default()).await
}

fn soft() -> ValidationPolicy {
    ValidationPolicy::default()
}

fn hard() -> ValidationPolicy {
    ValidationPolicy::default().with_revocation_failure_mode(RevocationFailureMode::Hard)
}

#[tokio::test]
async fn revoked_by_crl() {
    let pki = TestPki::new();
    let store = MemorySource::new()
        .with_crl(
            pki.intermediate_crl()
                .revoke(&pki.signer, at(2025, 3, 1), Some(REASON_KEY_COMPROMISE))
                .build(),
        )
        .with_crl(pki.root_crl().build());

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Invalid);
    assert!(report.has_kind(FailureKind::Revocation));

    let invalid = report.first_invalid().unwrap();
    assert_eq!(invalid.certificate, pki.signer.reference());
    assert_eq!(invalid.reason.as_deref(), Some(validation_codes::CERTIFICATE_REVOKED));
    assert!(invalid.message.contains("keyCompromise"));

    // a revoked certificate ends the walk
    assert!(!report.has_reason(validation_codes::CERTIFICATE_TRUSTED));
}

#[tokio::test]
async fn revocation_after_reference_time_is_ignored() {
    let pki = TestPki::new();
    let store = MemorySource::new()
        .with_crl(
            pki.intermediate_crl()
                .revoke(&pki.signer, at(2025, 6, 15), None)
                .build(),
        )
        .with_crl(pki.root_crl().build());

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Valid, "{report}");
}

#[tokio::test]
async fn revoked_intermediate() {
    let pki = TestPki::new();
    let store = MemorySource::new()
        .with_crl(pki.intermediate_crl().build())
        .with_crl(
            pki.root_crl()
                .revoke(&pki.intermediate, at(2025, 1, 1), None)
                .build(),
        );

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Invalid);
    assert_eq!(
        report.first_invalid().unwrap().certificate,
        pki.intermediate.reference()
    );
}

#[tokio::test]
async fn stale_crl() {
    let pki = TestPki::new();
    let store = || {
        MemorySource::new()
            .with_crl(
                pki.intermediate_crl()
                    .updates(at(2025, 1, 1), Some(at(2025, 2, 1)))
                    .build(),
            )
            .with_crl(pki.root_crl().build())
    };

    let report = run(&pki, &validator(store()), &soft()).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_DATA_STALE));
    assert!(report.has_reason(validation_codes::REVOCATION_STATUS_UNKNOWN));

    let report = run(&pki, &validator(store()), &hard()).await;

    assert_eq!(report.status(), Status::Invalid);
    assert!(report.has_kind(FailureKind::Revocation));
}

#[tokio::test]
async fn freshness_window_without_next_update() {
    let pki = TestPki::new();
    let store = || {
        MemorySource::new()
            .with_crl(pki.intermediate_crl().updates(at(2025, 5, 20), None).build())
            .with_crl(pki.root_crl().build())
    };

    let report = run(&pki, &validator(store()), &soft()).await;
    assert_eq!(report.status(), Status::Valid, "{report}");

    let short = ValidationPolicy::default().with_freshness(Duration::days(1));
    let report = run(&pki, &validator(store()), &short).await;
    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_DATA_STALE));
}

#[test]
fn freshness_window_saturates() {
    let huge = Duration::try_days(100_000_000).unwrap();

    assert!(is_fresh(at(2025, 5, 1), None, reference_time(), Duration::zero(), huge));
    assert!(is_fresh(
        at(2025, 5, 1),
        Some(at(2025, 7, 1)),
        reference_time(),
        huge,
        Duration::days(30)
    ));
    assert!(!is_fresh(at(2025, 7, 1), None, reference_time(), Duration::zero(), huge));
}

#[tokio::test]
async fn crl_with_bad_signature() {
    let pki = TestPki::new();
    let store = MemorySource::new()
        .with_crl(pki.intermediate_crl().signed_with(&key(9)).build())
        .with_crl(pki.root_crl().build());

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_SIGNATURE_INVALID));
}

#[tokio::test]
async fn crl_issuer_without_crl_sign() {
    let pki = TestPki::with_intermediate(|builder| builder.key_usage(KU_KEY_CERT_SIGN));

    let report = with_store(&pki, pki.clean_store()).await;

    // an untrusted CRL leaves the status unknown; it never invalidates
    assert_eq!(report.status(), Status::Indeterminate);
    let untrusted = report
        .items()
        .iter()
        .find(|item| item.reason.as_deref() == Some(validation_codes::REVOCATION_ISSUER_UNTRUSTED))
        .unwrap();
    assert_eq!(untrusted.role.as_deref(), Some("crl_issuer"));
    assert!(untrusted.message.contains(validation_codes::CONSTRAINT_VIOLATION));
}

#[tokio::test]
async fn malformed_embedded_crl() {
    let pki = TestPki::new();
    let store = MemorySource::new()
        .with_crl_der(b"definitely not a CRL")
        .with_crl(pki.root_crl().build());

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_DATA_MALFORMED));
}

#[tokio::test]
async fn no_revocation_data() {
    let pki = TestPki::new();

    let report = with_store(&pki, MemorySource::new()).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_DATA_UNAVAILABLE));

    // nothing is invalid, so the walk reaches the anchor
    assert!(report.has_reason(validation_codes::CERTIFICATE_TRUSTED));
}

fn ocsp_store(pki: &TestPki, status: TestStatus) -> MemorySource {
    let response = OcspBuilder::new(INTERMEDIATE, &pki.intermediate_key)
        .status(&pki.signer, &pki.intermediate, status)
        .build();

    MemorySource::new()
        .with_ocsp_response(response)
        .with_crl(pki.root_crl().build())
}

#[tokio::test]
async fn ocsp_good() {
    let pki = TestPki::new();

    let report = with_store(&pki, ocsp_store(&pki, TestStatus::Good)).await;

    assert_eq!(report.status(), Status::Valid, "{report}");
    let signer: Vec<_> = report.items_for(&pki.signer.reference()).collect();
    assert_eq!(
        signer[1].reason.as_deref(),
        Some(validation_codes::CERTIFICATE_NOT_REVOKED)
    );
}

#[tokio::test]
async fn ocsp_revoked() {
    let pki = TestPki::new();
    let status = TestStatus::Revoked(at(2025, 4, 1), Some(REASON_KEY_COMPROMISE));

    let report = with_store(&pki, ocsp_store(&pki, status)).await;

    assert_eq!(report.status(), Status::Invalid);
    assert!(report.has_reason(validation_codes::CERTIFICATE_REVOKED));
}

#[tokio::test]
async fn ocsp_unknown() {
    let pki = TestPki::new();

    let report = with_store(&pki, ocsp_store(&pki, TestStatus::Unknown)).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_STATUS_UNKNOWN));
}

#[tokio::test]
async fn revoked_wins_over_good() {
    let pki = TestPki::new();
    let store = ocsp_store(&pki, TestStatus::Good).with_crl(
        pki.intermediate_crl()
            .revoke(&pki.signer, at(2025, 3, 1), None)
            .build(),
    );

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Invalid);
    assert!(report.has_reason(validation_codes::CERTIFICATE_REVOKED));
}

fn delegated_store(pki: &TestPki, responder: CertBuilder) -> MemorySource {
    let responder_key = key(8);
    let response = OcspBuilder::new("Sigtrust OCSP Responder", &responder_key)
        .status(&pki.signer, &pki.intermediate, TestStatus::Good)
        .with_certificate(responder.der())
        .build();

    MemorySource::new()
        .with_ocsp_response(response)
        .with_crl(pki.root_crl().build())
}

fn responder(pki: &TestPki) -> CertBuilder {
    CertBuilder::new(8, "Sigtrust OCSP Responder", &key(8))
        .issued_by(INTERMEDIATE, &pki.intermediate_key)
        .end_entity()
        .key_usage(KU_DIGITAL_SIGNATURE)
}

#[tokio::test]
async fn delegated_ocsp_responder() {
    let pki = TestPki::new();
    let store = delegated_store(&pki, responder(&pki).eku(EKU_OCSP_SIGNING));

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Valid, "{report}");
}

#[tokio::test]
async fn delegated_responder_needs_ocsp_signing() {
    let pki = TestPki::new();
    let store = delegated_store(&pki, responder(&pki));

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Indeterminate);
    let untrusted = report
        .items()
        .iter()
        .find(|item| item.reason.as_deref() == Some(validation_codes::REVOCATION_ISSUER_UNTRUSTED))
        .unwrap();
    assert_eq!(untrusted.role.as_deref(), Some("ocsp_responder"));
}

#[tokio::test]
async fn ocsp_with_bad_signature() {
    let pki = TestPki::new();
    // names the intermediate but is signed by someone else
    let response = OcspBuilder::new(INTERMEDIATE, &key(9))
        .status(&pki.signer, &pki.intermediate, TestStatus::Good)
        .build();
    let store = MemorySource::new()
        .with_ocsp_response(response)
        .with_crl(pki.root_crl().build());

    let report = with_store(&pki, store).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_SIGNATURE_INVALID));
}

fn unreachable_online() -> ScriptedSource {
    ScriptedSource::new(MemorySource::new())
        .crl(Answer::Fail(FetchError::Transport("connection refused".into())))
        .ocsp(Answer::Fail(FetchError::Transport("connection refused".into())))
}

#[tokio::test]
async fn unreachable_responder_soft_fail() {
    let pki = TestPki::new();
    let validator = validator(MemorySource::new().with_crl(pki.root_crl().build()))
        .with_online_source(Arc::new(unreachable_online()));

    let report = run(&pki, &validator, &soft()).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_DATA_UNAVAILABLE));
    assert!(report.has_reason(validation_codes::CERTIFICATE_TRUSTED));
}

#[tokio::test]
async fn unreachable_responder_hard_fail() {
    let pki = TestPki::new();
    let validator = validator(MemorySource::new().with_crl(pki.root_crl().build()))
        .with_online_source(Arc::new(unreachable_online()));

    let report = run(&pki, &validator, &hard()).await;

    assert_eq!(report.status(), Status::Invalid);
    let invalid = report.first_invalid().unwrap();
    assert_eq!(invalid.certificate, pki.signer.reference());
    assert_eq!(invalid.kind, Some(FailureKind::Revocation));
    assert_eq!(
        invalid.reason.as_deref(),
        Some(validation_codes::REVOCATION_STATUS_UNKNOWN)
    );
}

#[tokio::test(start_paused = true)]
async fn fetch_timeout() {
    let pki = TestPki::new();
    let online = ScriptedSource::new(MemorySource::new())
        .crl(Answer::Hang)
        .ocsp(Answer::Hang);
    let validator = SignatureValidator::new().with_online_source(Arc::new(online));
    let policy = ValidationPolicy::default().with_fetch_timeout(StdDuration::from_secs(2));

    let report = run(&pki, &validator, &policy).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_FETCH_TIMEOUT));
}

#[tokio::test]
async fn online_only_when_document_has_nothing() {
    let pki = TestPki::new();
    let online = ScriptedSource::new(pki.clean_store());
    let log = online.log.clone();

    // the document covers the signer but not the intermediate
    let document = MemorySource::new().with_crl(pki.intermediate_crl().build());
    let validator = validator(document).with_online_source(Arc::new(online));

    let report = run(&pki, &validator, &soft()).await;

    assert_eq!(report.status(), Status::Valid, "{report}");
    assert_eq!(log.crl_fetches_for(INTERMEDIATE), 0);
    assert_eq!(log.crl_fetches_for(ROOT), 1);
}

#[tokio::test]
async fn always_fetch() {
    let pki = TestPki::new();
    let online = ScriptedSource::new(pki.clean_store());
    let log = online.log.clone();
    let validator = validator(pki.clean_store()).with_online_source(Arc::new(online));
    let policy = ValidationPolicy::default().with_online_fetching(OnlineFetching::AlwaysFetch);

    let report = run(&pki, &validator, &policy).await;

    assert_eq!(report.status(), Status::Valid, "{report}");
    assert_eq!(log.crl_fetches_for(INTERMEDIATE), 1);
    assert_eq!(log.ocsp_fetches_for(SIGNER), 1);
    assert_eq!(log.ocsp_fetches_for(ROOT), 0);
}

#[tokio::test]
async fn never_fetch() {
    let pki = TestPki::new();
    let online = ScriptedSource::new(pki.clean_store());
    let log = online.log.clone();
    let validator = SignatureValidator::new().with_online_source(Arc::new(online));
    let policy = ValidationPolicy::default().with_online_fetching(OnlineFetching::NeverFetch);

    let report = run(&pki, &validator, &policy).await;

    assert_eq!(report.status(), Status::Indeterminate);
    assert!(report.has_reason(validation_codes::REVOCATION_DATA_UNAVAILABLE));
    assert_eq!(log.crl_fetches_for(INTERMEDIATE), 0);
    assert_eq!(log.ocsp_fetches_for(SIGNER), 0);
}

#[tokio::test]
async fn revocation_disabled() {
    let pki = TestPki::new();
    let policy = ValidationPolicy::default()
        .with_crl_checks(false)
        .with_ocsp_checks(false);

    let report = run(&pki, &validator(MemorySource::new()), &policy).await;

    assert_eq!(report.status(), Status::Valid, "{report}");
    assert_eq!(report.items().len(), 3);
}

#[tokio::test]
async fn rule_disables_checks_for_intermediates() {
    let pki = TestPki::new();
    let policy = ValidationPolicy::default().with_rule(PolicyRule::new(
        RoleSet::single(CertificateRole::ChainIssuer),
        PolicyOverrides {
            check_crl: Some(false),
            check_ocsp: Some(false),
            ..Default::default()
        },
    ));

    // no CRL from the root
    let store = MemorySource::new().with_crl(pki.intermediate_crl().build());
    let report = run(&pki, &validator(store), &policy).await;

    assert_eq!(report.status(), Status::Valid, "{report}");
    assert_eq!(report.items_for(&pki.intermediate.reference()).count(), 1);
}

#[tokio::test]
async fn rule_hard_fails_signer_only() {
    let pki = TestPki::new();
    let policy = ValidationPolicy::default().with_rule(PolicyRule::new(
        RoleSet::single(CertificateRole::Signer),
        PolicyOverrides {
            revocation_failure_mode: Some(RevocationFailureMode::Hard),
            ..Default::default()
        },
    ));

    // the signer has no revocation data, the intermediate does
    let store = MemorySource::new().with_crl(pki.root_crl().build());
    let report = run(&pki, &validator(store), &policy).await;
    assert_eq!(report.status(), Status::Invalid);
    assert_eq!(
        report.first_invalid().unwrap().certificate,
        pki.signer.reference()
    );

    // the intermediate has no revocation data, the signer does
    let store = MemorySource::new().with_crl(pki.intermediate_crl().build());
    let report = run(&pki, &validator(store), &policy).await;
    assert_eq!(report.status(), Status::Indeterminate);
}
