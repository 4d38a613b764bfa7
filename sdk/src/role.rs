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

//! Certificate roles and immutable role sets.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The role a certificate plays in a validation.
///
/// Every certificate visited during a chain walk is assigned exactly one
/// role by [`CertificateRole::classify`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateRole {
    /// End-entity certificate that produced the document signature.
    Signer,

    /// Intermediate CA certificate between a leaf and a trust anchor.
    ChainIssuer,

    /// Certificate found in the trust-anchor set.
    RootAnchor,

    /// Certificate whose key signed a CRL.
    CrlIssuer,

    /// Certificate whose key signed an OCSP response.
    OcspResponder,

    /// Certificate of a time-stamping authority.
    TimestampAuthority,

    /// Self-issued certificate that is not a trust anchor.
    Untrusted,
}

impl CertificateRole {
    /// Every role, in declaration order.
    pub const ALL: [CertificateRole; 7] = [
        Self::Signer,
        Self::ChainIssuer,
        Self::RootAnchor,
        Self::CrlIssuer,
        Self::OcspResponder,
        Self::TimestampAuthority,
        Self::Untrusted,
    ];

    /// Assigns the role of the certificate at `position` in a path that was
    /// started for `purpose`.
    ///
    /// Trust anchors are always [`RootAnchor`], whatever their position.
    /// Every other certificate above the leaf is a [`ChainIssuer`].
    ///
    /// [`RootAnchor`]: Self::RootAnchor
    /// [`ChainIssuer`]: Self::ChainIssuer
    pub fn classify(position: usize, purpose: CertificatePurpose, is_anchor: bool) -> Self {
        if is_anchor {
            return Self::RootAnchor;
        }

        if position > 0 {
            return Self::ChainIssuer;
        }

        match purpose {
            CertificatePurpose::Signature => Self::Signer,
            CertificatePurpose::Timestamping => Self::TimestampAuthority,
            CertificatePurpose::OcspSigning => Self::OcspResponder,
            CertificatePurpose::CrlSigning => Self::CrlIssuer,
        }
    }

    /// Returns the purpose a leaf certificate must serve to be given this
    /// role, if any.
    pub fn purpose(self) -> Option<CertificatePurpose> {
        match self {
            Self::Signer => Some(CertificatePurpose::Signature),
            Self::TimestampAuthority => Some(CertificatePurpose::Timestamping),
            Self::OcspResponder => Some(CertificatePurpose::OcspSigning),
            Self::CrlIssuer => Some(CertificatePurpose::CrlSigning),
            Self::ChainIssuer | Self::RootAnchor | Self::Untrusted => None,
        }
    }

    /// Short lowercase name, as used in reports and settings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signer => "signer",
            Self::ChainIssuer => "chain_issuer",
            Self::RootAnchor => "root_anchor",
            Self::CrlIssuer => "crl_issuer",
            Self::OcspResponder => "ocsp_responder",
            Self::TimestampAuthority => "timestamp_authority",
            Self::Untrusted => "untrusted",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for CertificateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the leaf certificate of a path was used for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificatePurpose {
    /// Signing a document.
    Signature,

    /// Signing a time-stamp token.
    Timestamping,

    /// Signing an OCSP response.
    OcspSigning,

    /// Signing a CRL.
    CrlSigning,
}

/// Error returned when a [`RoleSet`] cannot be constructed.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum RoleSetError {
    /// The complement of the given set is empty.
    #[error("role set {0} has no valid complement")]
    NoValidComplement(RoleSet),
}

/// An immutable, non-empty set of [`CertificateRole`]s.
///
/// Duplicates collapse and order is irrelevant: two sets with the same
/// members compare and hash equal no matter how they were built.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct RoleSet(u8);

impl RoleSet {
    const ALL_BITS: u8 = {
        let mut bits = 0u8;
        let mut i = 0;
        while i < CertificateRole::ALL.len() {
            bits |= 1 << (CertificateRole::ALL[i] as u8);
            i += 1;
        }
        bits
    };

    /// Creates a set containing exactly the given roles.
    pub fn of<I>(first: CertificateRole, rest: I) -> Self
    where
        I: IntoIterator<Item = CertificateRole>,
    {
        let bits = rest
            .into_iter()
            .fold(first.bit(), |bits, role| bits | role.bit());

        Self(bits)
    }

    /// Creates a set containing a single role.
    pub fn single(role: CertificateRole) -> Self {
        Self(role.bit())
    }

    /// Creates a set containing every role.
    pub fn all() -> Self {
        Self(Self::ALL_BITS)
    }

    /// Creates a set containing every role that is not in `other`.
    ///
    /// Fails with [`RoleSetError::NoValidComplement`] if `other` already
    /// contains every role.
    pub fn complement_of(other: &RoleSet) -> Result<Self, RoleSetError> {
        let bits = Self::ALL_BITS & !other.0;
        if bits == 0 {
            return Err(RoleSetError::NoValidComplement(*other));
        }

        Ok(Self(bits))
    }

    /// Returns `true` if `role` is a member of this set.
    pub fn contains(&self, role: CertificateRole) -> bool {
        self.0 & role.bit() != 0
    }

    /// Returns `true` if every member of `other` is also a member of this
    /// set.
    pub fn is_superset_of(&self, other: &RoleSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Iterates the members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = CertificateRole> + '_ {
        CertificateRole::ALL
            .into_iter()
            .filter(move |role| self.contains(*role))
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Always `false` for sets built by the public constructors.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::all() {
            return f.write_str("all");
        }

        f.write_str("{")?;
        for (i, role) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(role.as_str())?;
        }
        f.write_str("}")
    }
}

impl From<CertificateRole> for RoleSet {
    fn from(role: CertificateRole) -> Self {
        Self::single(role)
    }
}

impl Serialize for RoleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let roles = Vec::<CertificateRole>::deserialize(deserializer)?;
        let mut roles = roles.into_iter();

        let first = roles
            .next()
            .ok_or_else(|| serde::de::Error::custom("a role set needs at least one role"))?;

        Ok(Self::of(first, roles))
    }
}
