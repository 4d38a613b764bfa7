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

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single check, or of a whole validation run.
///
/// Variants are declared from least to most severe so that the derived
/// ordering can be used to pick the worst status: `Invalid` >
/// `Indeterminate` > `Valid`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The check succeeded.
    Valid,

    /// The check could not reach a conclusion (missing issuer, stale or
    /// unavailable revocation data, fetch timeout).
    Indeterminate,

    /// The check failed.
    Invalid,
}

impl Status {
    /// Returns the more severe of the two statuses.
    pub fn worst(self, other: Status) -> Status {
        self.max(other)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "VALID",
            Self::Indeterminate => "INDETERMINATE",
            Self::Invalid => "INVALID",
        })
    }
}

/// Classifies why a [`ReportItem`] is not [`Status::Valid`].
///
/// [`ReportItem`]: crate::ReportItem
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Malformed certificate or artifact.
    Structural,

    /// Signature did not verify.
    Cryptographic,

    /// Certificate was expired or not yet valid at the reference time.
    Temporal,

    /// Basic constraints, path length, key usage or extended key usage
    /// violated.
    Constraint,

    /// Certificate was revoked, or revocation status could not be
    /// established under a hard-fail policy.
    Revocation,

    /// No conclusion could be reached.
    Indeterminate,

    /// The validation inputs themselves were unusable.
    Configuration,
}

impl FailureKind {
    /// Returns `true` if a failure of this kind ends validation of the chain
    /// it was found in.
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::Indeterminate)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Structural => "STRUCTURAL",
            Self::Cryptographic => "CRYPTOGRAPHIC",
            Self::Temporal => "TEMPORAL",
            Self::Constraint => "CONSTRAINT",
            Self::Revocation => "REVOCATION",
            Self::Indeterminate => "INDETERMINATE",
            Self::Configuration => "CONFIGURATION",
        })
    }
}
