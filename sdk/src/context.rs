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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{certificate::CertificateNode, RoleSet};

/// The kind of check a certificate is being validated for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Validation of a document signer's chain.
    Chain,

    /// Validation of the issuer of a CRL or OCSP response.
    RevocationData,

    /// Validation of a time-stamping authority's chain.
    Timestamp,
}

/// The circumstances under which a certificate is checked.
///
/// A context is an immutable value. Two contexts with the same fields are
/// equal and hash equally, however they were built, so a context can be used
/// both to select policy and as a memoization key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ValidationContext {
    roles: RoleSet,
    check_kind: CheckKind,
    reference_time: DateTime<Utc>,
}

impl ValidationContext {
    /// Creates a context from its parts.
    pub fn new(roles: RoleSet, check_kind: CheckKind, reference_time: DateTime<Utc>) -> Self {
        Self {
            roles,
            check_kind,
            reference_time,
        }
    }

    /// Creates the context for checking `node` in its assigned role.
    pub fn derive(
        node: &CertificateNode,
        check_kind: CheckKind,
        reference_time: DateTime<Utc>,
    ) -> Self {
        Self::new(RoleSet::single(node.role), check_kind, reference_time)
    }

    /// Roles the certificate is exercised in.
    pub fn roles(&self) -> RoleSet {
        self.roles
    }

    /// Kind of check being performed.
    pub fn check_kind(&self) -> CheckKind {
        self.check_kind
    }

    /// Point in time validity and revocation are evaluated at.
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }
}
