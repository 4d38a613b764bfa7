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
use sigtrust_status_tracker::{report_item, validation_codes, FailureKind, StatusTracker};

use super::{
    bounded_fetch, cache::SourceSlot, crl_validator, ocsp_validator, FetchFailure,
    RevocationOutcome, RevocationVerdict, Target,
};
use crate::{
    certificate::{Certificate, CertificateNode},
    chain::Env,
    crl::Crl,
    ocsp::OcspResponse,
    policy::{OnlineFetching, RevocationFailureMode, RevocationSettings},
    source::{CertRef, CertificateSource, FetchError, IssuerRef},
    CheckKind, ValidationContext,
};

/// Establishes the revocation status of `node`, which was issued by
/// `issuer`.
///
/// The outcome is computed at most once per certificate and context within
/// a run; later callers receive the same outcome.
pub(crate) async fn check_revocation(
    env: &Env<'_>,
    node: &CertificateNode,
    issuer: &Arc<Certificate>,
    check_kind: CheckKind,
    reference_time: DateTime<Utc>,
    supplied: &[Arc<Certificate>],
) -> Arc<RevocationOutcome> {
    let ctx = ValidationContext::derive(node, check_kind, reference_time);
    let key = (node.certificate.fingerprint(), ctx);

    env.cache
        .outcomes
        .get_or_compute(key, || evaluate(env, node, issuer, ctx, supplied))
        .await
}

async fn evaluate(
    env: &Env<'_>,
    node: &CertificateNode,
    issuer: &Arc<Certificate>,
    ctx: ValidationContext,
    supplied: &[Arc<Certificate>],
) -> RevocationOutcome {
    let settings = env.policy.revocation_settings(&ctx);
    let cert = &node.certificate;
    let reference = cert.reference();
    let role = node.role.as_str();

    if !settings.check_crl && !settings.check_ocsp {
        return RevocationOutcome {
            verdict: None,
            items: Vec::new(),
        };
    }

    let issuer_ref = IssuerRef {
        issuer,
        distribution_points: &cert.crl_distribution_points,
    };
    let cert_ref = CertRef {
        certificate: cert,
        issuer,
    };

    let mut gathered = Gathered::new(reference.clone(), role);
    let fetch = Fetch {
        settings: &settings,
        ctx,
        issuer_ref: &issuer_ref,
        cert_ref: &cert_ref,
    };

    if let Some(document) = env.document {
        gathered
            .collect(env, document, SourceSlot::Document, &fetch)
            .await;
    }

    let fetch_online = match settings.online_fetching {
        OnlineFetching::NeverFetch => false,
        OnlineFetching::FetchIfNoOtherDataAvailable => gathered.is_empty(),
        OnlineFetching::AlwaysFetch => true,
    };

    if fetch_online {
        if let Some(online) = env.online {
            gathered
                .collect(env, online, SourceSlot::Online, &fetch)
                .await;
        }
    }

    if gathered.is_empty() && gathered.diagnostics.items().is_empty() {
        report_item!(
            reference.clone(),
            "no CRL or OCSP response is available",
            "check_revocation"
        )
        .role(role)
        .reason(validation_codes::REVOCATION_DATA_UNAVAILABLE)
        .indeterminate(&mut gathered.diagnostics);
    }

    let target = Target {
        node,
        issuer,
        settings: &settings,
        reference_time: ctx.reference_time(),
        supplied,
    };
    let mut verdicts = Vec::new();

    for crl in &gathered.crls {
        verdicts.push(
            crl_validator::validate(env, &target, crl, &mut gathered.diagnostics).await,
        );
    }

    for response in &gathered.ocsp_responses {
        let verdict =
            ocsp_validator::validate(env, &target, response, &mut gathered.diagnostics).await;

        if let Some(verdict) = verdict {
            verdicts.push(verdict);
        }
    }

    let verdict =
        RevocationVerdict::merge(&verdicts, validation_codes::REVOCATION_DATA_UNAVAILABLE);
    log::debug!("revocation verdict for {reference}: {verdict:?}");

    let mut tracker = StatusTracker::default();
    match verdict {
        RevocationVerdict::Revoked { at, reason } => {
            let reason = reason.map(|r| format!(" ({r})")).unwrap_or_default();
            report_item!(
                reference,
                format!("certificate was revoked at {at}{reason}"),
                "check_revocation"
            )
            .role(role)
            .reason(validation_codes::CERTIFICATE_REVOKED)
            .failure(&mut tracker, FailureKind::Revocation);
        }

        RevocationVerdict::NotRevoked => {
            report_item!(reference, "certificate is not revoked", "check_revocation")
                .role(role)
                .reason(validation_codes::CERTIFICATE_NOT_REVOKED)
                .success(&mut tracker);
        }

        RevocationVerdict::Unknown(cause) => {
            tracker.append(&gathered.diagnostics);

            let item = report_item!(
                reference,
                format!("revocation status could not be determined ({cause})"),
                "check_revocation"
            )
            .role(role)
            .reason(validation_codes::REVOCATION_STATUS_UNKNOWN);

            match settings.failure_mode {
                RevocationFailureMode::Soft => item.indeterminate(&mut tracker),
                RevocationFailureMode::Hard => item.failure(&mut tracker, FailureKind::Revocation),
            }
        }
    }

    RevocationOutcome {
        verdict: Some(verdict),
        items: tracker.items().to_vec(),
    }
}

/// What to fetch for one certificate.
struct Fetch<'a> {
    settings: &'a RevocationSettings,
    ctx: ValidationContext,
    issuer_ref: &'a IssuerRef<'a>,
    cert_ref: &'a CertRef<'a>,
}

/// Revocation data collected from the sources, plus the problems met while
/// collecting and validating it.
struct Gathered {
    reference: String,
    role: &'static str,
    crls: Vec<Arc<Crl>>,
    ocsp_responses: Vec<Arc<OcspResponse>>,
    diagnostics: StatusTracker,
}

impl Gathered {
    fn new(reference: String, role: &'static str) -> Self {
        Self {
            reference,
            role,
            crls: Vec::new(),
            ocsp_responses: Vec::new(),
            diagnostics: StatusTracker::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.crls.is_empty() && self.ocsp_responses.is_empty()
    }

    /// Fetches the CRL and the OCSP response concurrently from one source.
    ///
    /// Each fetch happens at most once per run for its key: a CRL per
    /// issuer and an OCSP response per certificate. Certificates that share
    /// an issuer reuse the same CRL.
    async fn collect(
        &mut self,
        env: &Env<'_>,
        source: &dyn CertificateSource,
        slot: SourceSlot,
        fetch: &Fetch<'_>,
    ) {
        let crl = async {
            if !fetch.settings.check_crl {
                return None;
            }
            let key = (fetch.issuer_ref.issuer.fingerprint(), slot, fetch.ctx);
            Some(
                env.cache
                    .crl_fetches
                    .get_or_compute(key, || {
                        bounded_fetch(env, source.fetch_crl(fetch.issuer_ref))
                    })
                    .await,
            )
        };

        let ocsp = async {
            if !fetch.settings.check_ocsp {
                return None;
            }
            let key = (fetch.cert_ref.certificate.fingerprint(), slot, fetch.ctx);
            Some(
                env.cache
                    .ocsp_fetches
                    .get_or_compute(key, || {
                        bounded_fetch(env, source.fetch_ocsp(fetch.cert_ref))
                    })
                    .await,
            )
        };

        let (crl, ocsp) = tokio::join!(crl, ocsp);

        match crl.as_deref() {
            Some(Ok(crl)) => self.crls.push(crl.clone()),
            Some(Err(failure)) => self.record(failure.clone(), "CRL"),
            None => (),
        }

        match ocsp.as_deref() {
            Some(Ok(response)) => self.ocsp_responses.push(response.clone()),
            Some(Err(failure)) => self.record(failure.clone(), "OCSP response"),
            None => (),
        }
    }

    fn record(&mut self, failure: FetchFailure, what: &str) {
        let (reason, message) = match failure {
            FetchFailure::Source(FetchError::NotAvailable) => return,
            FetchFailure::Source(FetchError::Malformed(e)) => (
                validation_codes::REVOCATION_DATA_MALFORMED,
                format!("{what} is malformed: {e}"),
            ),
            FetchFailure::Source(FetchError::Transport(e)) => (
                validation_codes::REVOCATION_DATA_UNAVAILABLE,
                format!("{what} could not be fetched: {e}"),
            ),
            FetchFailure::TimedOut => {
                log::warn!("{what} fetch for {} timed out", self.reference);
                (
                    validation_codes::REVOCATION_FETCH_TIMEOUT,
                    format!("{what} fetch timed out"),
                )
            }
        };

        report_item!(self.reference.clone(), message, "check_revocation")
            .role(self.role)
            .reason(reason)
            .indeterminate(&mut self.diagnostics);
    }
}
