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

//! Revocation checking: CRL and OCSP validation, source selection and
//! per-run memoization.

use std::{future::Future, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use sigtrust_status_tracker::{ReportItem, Status, StatusTracker};

use crate::{
    certificate::{Certificate, CertificateNode},
    chain::Env,
    crl::RevocationReason,
    policy::RevocationSettings,
    source::FetchError,
};

pub(crate) mod cache;
mod crl_validator;
mod ocsp_validator;
mod orchestrator;

pub(crate) use cache::RunCache;
pub(crate) use orchestrator::check_revocation;

/// Answer of one revocation check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RevocationVerdict {
    /// Revoked at or before the reference time.
    Revoked {
        at: DateTime<Utc>,
        reason: Option<RevocationReason>,
    },

    NotRevoked,

    /// No conclusion. Carries the reason code that explains why.
    Unknown(&'static str),
}

impl RevocationVerdict {
    /// Conservative merge: any `Revoked` wins, then any `NotRevoked`,
    /// otherwise `Unknown`.
    pub(crate) fn merge(
        verdicts: &[RevocationVerdict],
        fallback: &'static str,
    ) -> RevocationVerdict {
        let revoked = verdicts
            .iter()
            .find(|v| matches!(v, RevocationVerdict::Revoked { .. }));
        let not_revoked = verdicts
            .iter()
            .find(|v| matches!(v, RevocationVerdict::NotRevoked));

        revoked
            .or(not_revoked)
            .or(verdicts.first())
            .copied()
            .unwrap_or(RevocationVerdict::Unknown(fallback))
    }
}

/// Result of checking one certificate, replayed into every report that
/// needs it.
#[derive(Clone, Debug)]
pub(crate) struct RevocationOutcome {
    /// `None` when revocation checking is disabled for the context.
    pub(crate) verdict: Option<RevocationVerdict>,
    pub(crate) items: Vec<ReportItem>,
}

impl RevocationOutcome {
    pub(crate) fn status(&self) -> Status {
        self.items
            .iter()
            .map(|item| item.status)
            .max()
            .unwrap_or(Status::Valid)
    }
}

/// Whether a revocation artifact's signer could be trusted.
#[derive(Clone, Debug, Default)]
pub(crate) struct ArtifactTrust {
    /// Reason code of the first failed check, if any.
    pub(crate) failure: Option<&'static str>,
    pub(crate) items: Vec<ReportItem>,
}

/// The certificate whose revocation status is being established, with
/// everything its validators need.
pub(crate) struct Target<'a> {
    pub(crate) node: &'a CertificateNode,
    pub(crate) issuer: &'a Arc<Certificate>,
    pub(crate) settings: &'a RevocationSettings,
    pub(crate) reference_time: DateTime<Utc>,
    pub(crate) supplied: &'a [Arc<Certificate>],
}

/// Summarizes why an artifact issuer chain did not validate.
pub(crate) fn first_problem(tracker: &StatusTracker) -> String {
    tracker
        .failures()
        .next()
        .map(|item| match &item.reason {
            Some(reason) => format!("{reason}: {}", item.message),
            None => item.message.to_string(),
        })
        .unwrap_or_else(|| "issuer chain did not validate".to_string())
}

/// Why a bounded fetch produced nothing.
#[derive(Clone, Debug)]
pub(crate) enum FetchFailure {
    Source(FetchError),
    TimedOut,
}

/// Runs one source call under the run's concurrency limit and the policy's
/// per-fetch timeout.
pub(crate) async fn bounded_fetch<T, F>(env: &Env<'_>, fetch: F) -> Result<T, FetchFailure>
where
    F: Future<Output = Result<T, FetchError>>,
{
    let _permit = env
        .fetch_limiter
        .acquire()
        .await
        .map_err(|e| FetchFailure::Source(FetchError::Transport(e.to_string())))?;

    match tokio::time::timeout(env.policy.fetch_timeout, fetch).await {
        Ok(result) => result.map_err(FetchFailure::Source),
        Err(_elapsed) => Err(FetchFailure::TimedOut),
    }
}

/// Returns `true` if `time` lies in `[this_update, next_update)`, widened by
/// `skew`. Without `next_update`, the window ends `freshness` after
/// `this_update`.
pub(crate) fn is_fresh(
    this_update: DateTime<Utc>,
    next_update: Option<DateTime<Utc>>,
    time: DateTime<Utc>,
    skew: Duration,
    freshness: Duration,
) -> bool {
    let end = next_update
        .or_else(|| this_update.checked_add_signed(freshness))
        .and_then(|end| end.checked_add_signed(skew))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let start = this_update
        .checked_sub_signed(skew)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    start <= time && time < end
}
