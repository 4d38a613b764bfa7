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

//! Validation policy and per-context rules.

use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{CheckKind, RoleSet, ValidationContext};

/// How an inconclusive revocation check affects the result.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationFailureMode {
    /// Unknown revocation status makes the chain `INDETERMINATE`.
    #[default]
    Soft,

    /// Unknown revocation status makes the chain `INVALID`.
    Hard,
}

/// When the online [`CertificateSource`] is consulted for revocation data.
///
/// [`CertificateSource`]: crate::CertificateSource
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnlineFetching {
    /// Only the document store is used.
    NeverFetch,

    /// The online source is used when the document store has neither a CRL
    /// nor an OCSP response for the certificate.
    #[default]
    FetchIfNoOtherDataAvailable,

    /// The online source is always used in addition to the document store.
    AlwaysFetch,
}

/// Settings that a [`PolicyRule`] may replace for the contexts it matches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PolicyOverrides {
    /// Replaces [`ValidationPolicy::revocation_failure_mode`].
    pub revocation_failure_mode: Option<RevocationFailureMode>,

    /// Replaces [`ValidationPolicy::online_fetching`].
    pub online_fetching: Option<OnlineFetching>,

    /// Replaces [`ValidationPolicy::freshness`].
    pub freshness: Option<Duration>,

    /// Replaces [`ValidationPolicy::check_crl`].
    pub check_crl: Option<bool>,

    /// Replaces [`ValidationPolicy::check_ocsp`].
    pub check_ocsp: Option<bool>,
}

/// Overrides that apply to certificates checked in some roles and, optionally,
/// only for some kinds of check.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyRule {
    roles: RoleSet,
    check_kinds: Vec<CheckKind>,
    overrides: PolicyOverrides,
}

impl PolicyRule {
    /// Creates a rule for every kind of check on certificates in `roles`.
    ///
    /// `RoleSet::complement_of` is a convenient way to write "every role
    /// except".
    pub fn new(roles: RoleSet, overrides: PolicyOverrides) -> Self {
        Self {
            roles,
            check_kinds: Vec::new(),
            overrides,
        }
    }

    /// Restricts the rule to the given kinds of check.
    pub fn for_check_kinds<I: IntoIterator<Item = CheckKind>>(mut self, kinds: I) -> Self {
        self.check_kinds = kinds.into_iter().collect();
        self
    }

    /// Returns `true` if every role of `ctx` is covered by the rule and the
    /// rule applies to its kind of check.
    pub fn matches(&self, ctx: &ValidationContext) -> bool {
        self.roles.is_superset_of(&ctx.roles())
            && (self.check_kinds.is_empty() || self.check_kinds.contains(&ctx.check_kind()))
    }

    /// The roles the rule applies to.
    pub fn roles(&self) -> RoleSet {
        self.roles
    }

    /// The overrides applied by the rule.
    pub fn overrides(&self) -> &PolicyOverrides {
        &self.overrides
    }
}

/// Effective revocation settings for one [`ValidationContext`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RevocationSettings {
    /// How unknown status is reported.
    pub failure_mode: RevocationFailureMode,

    /// When online data is fetched.
    pub online_fetching: OnlineFetching,

    /// Validity assumed for revocation data that has no `nextUpdate`.
    pub freshness: Duration,

    /// Whether CRLs are consulted.
    pub check_crl: bool,

    /// Whether OCSP responses are consulted.
    pub check_ocsp: bool,
}

/// Everything that controls a validation run.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationPolicy {
    /// How unknown revocation status is reported. Defaults to soft-fail.
    pub revocation_failure_mode: RevocationFailureMode,

    /// Maximum number of certificates in a path, leaf and anchor included.
    pub max_chain_depth: usize,

    /// Tolerance applied to every time comparison.
    pub allowed_clock_skew: Duration,

    /// When the online source is consulted.
    pub online_fetching: OnlineFetching,

    /// Whether CRLs are consulted.
    pub check_crl: bool,

    /// Whether OCSP responses are consulted.
    pub check_ocsp: bool,

    /// Limit on each individual fetch from a source.
    pub fetch_timeout: StdDuration,

    /// Limit on fetches in flight at the same time within one run.
    pub max_concurrent_fetches: usize,

    /// Validity assumed for revocation data that has no `nextUpdate`.
    pub freshness: Duration,

    /// Per-context overrides. The last matching rule wins.
    pub rules: Vec<PolicyRule>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            revocation_failure_mode: RevocationFailureMode::Soft,
            max_chain_depth: 10,
            allowed_clock_skew: Duration::zero(),
            online_fetching: OnlineFetching::FetchIfNoOtherDataAvailable,
            check_crl: true,
            check_ocsp: true,
            fetch_timeout: StdDuration::from_secs(10),
            max_concurrent_fetches: 4,
            freshness: Duration::days(30),
            rules: Vec::new(),
        }
    }
}

impl ValidationPolicy {
    /// Sets the revocation failure mode.
    pub fn with_revocation_failure_mode(mut self, mode: RevocationFailureMode) -> Self {
        self.revocation_failure_mode = mode;
        self
    }

    /// Sets the maximum chain depth.
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Sets the allowed clock skew.
    pub fn with_allowed_clock_skew(mut self, skew: Duration) -> Self {
        self.allowed_clock_skew = skew;
        self
    }

    /// Sets when online data is fetched.
    pub fn with_online_fetching(mut self, online_fetching: OnlineFetching) -> Self {
        self.online_fetching = online_fetching;
        self
    }

    /// Enables or disables CRL checking.
    pub fn with_crl_checks(mut self, enabled: bool) -> Self {
        self.check_crl = enabled;
        self
    }

    /// Enables or disables OCSP checking.
    pub fn with_ocsp_checks(mut self, enabled: bool) -> Self {
        self.check_ocsp = enabled;
        self
    }

    /// Sets the per-fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: StdDuration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the number of fetches allowed in flight at once.
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max;
        self
    }

    /// Sets the freshness window for revocation data without `nextUpdate`.
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Appends a per-context rule.
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Resolves the revocation settings for `ctx` by applying every matching
    /// rule in order over the policy-wide values.
    pub fn revocation_settings(&self, ctx: &ValidationContext) -> RevocationSettings {
        let mut settings = RevocationSettings {
            failure_mode: self.revocation_failure_mode,
            online_fetching: self.online_fetching,
            freshness: self.freshness,
            check_crl: self.check_crl,
            check_ocsp: self.check_ocsp,
        };

        for rule in self.rules.iter().filter(|rule| rule.matches(ctx)) {
            let o = &rule.overrides;
            if let Some(mode) = o.revocation_failure_mode {
                settings.failure_mode = mode;
            }
            if let Some(online_fetching) = o.online_fetching {
                settings.online_fetching = online_fetching;
            }
            if let Some(freshness) = o.freshness {
                settings.freshness = freshness;
            }
            if let Some(check_crl) = o.check_crl {
                settings.check_crl = check_crl;
            }
            if let Some(check_ocsp) = o.check_ocsp {
                settings.check_ocsp = check_ocsp;
            }
        }

        settings
    }
}
