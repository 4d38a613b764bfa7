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

//! Certificate revocation lists.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use x509_parser::{
    extensions::ParsedExtension,
    prelude::{CertificateRevocationList, FromDer},
};

use crate::certificate::{asn1_time, strip_leading_zeros, Certificate, Fingerprint};

/// Describes errors that can occur when parsing a CRL.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum CrlError {
    /// The DER could not be parsed as a CRL.
    #[error("invalid CRL DER: {0}")]
    InvalidDer(String),

    /// The CRL was followed by unexpected bytes.
    #[error("trailing data after CRL")]
    TrailingData,

    /// A time field is outside the representable range.
    #[error("invalid CRL time")]
    InvalidTime,
}

/// Reason a certificate was revoked (RFC 5280, section 5.3.1).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    /// The entry undoes an earlier `CertificateHold` in a delta CRL.
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

impl RevocationReason {
    /// Maps a `CRLReason` code. Code 7 is unassigned.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Unspecified,
            1 => Self::KeyCompromise,
            2 => Self::CaCompromise,
            3 => Self::AffiliationChanged,
            4 => Self::Superseded,
            5 => Self::CessationOfOperation,
            6 => Self::CertificateHold,
            8 => Self::RemoveFromCrl,
            9 => Self::PrivilegeWithdrawn,
            10 => Self::AaCompromise,
            _ => return None,
        })
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unspecified => "unspecified",
            Self::KeyCompromise => "keyCompromise",
            Self::CaCompromise => "cACompromise",
            Self::AffiliationChanged => "affiliationChanged",
            Self::Superseded => "superseded",
            Self::CessationOfOperation => "cessationOfOperation",
            Self::CertificateHold => "certificateHold",
            Self::RemoveFromCrl => "removeFromCRL",
            Self::PrivilegeWithdrawn => "privilegeWithdrawn",
            Self::AaCompromise => "aACompromise",
        };
        f.write_str(s)
    }
}

/// One entry of a CRL.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevokedEntry {
    /// Serial number without leading zeros.
    pub serial: Vec<u8>,

    /// When the certificate was revoked.
    pub revocation_time: DateTime<Utc>,

    /// Reason code extension, if present.
    pub reason: Option<RevocationReason>,
}

/// A parsed, immutable certificate revocation list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Crl {
    /// Complete DER encoding.
    pub der: Vec<u8>,

    /// DER encoding of the `TBSCertList`, the data covered by the signature.
    pub tbs: Vec<u8>,

    /// Issuer distinguished name in RFC 4514 form.
    pub issuer: String,

    /// DER encoding of the issuer name.
    pub issuer_der: Vec<u8>,

    /// Issue date of this CRL.
    pub this_update: DateTime<Utc>,

    /// Date by which the next CRL will be issued, if stated.
    pub next_update: Option<DateTime<Utc>>,

    /// Revoked certificates.
    pub revoked: Vec<RevokedEntry>,

    /// Signature algorithm as a dotted-decimal OID.
    pub signature_algorithm: String,

    /// Signature value.
    pub signature: Vec<u8>,

    /// Key identifier from the authority key identifier extension, if
    /// present.
    pub authority_key_id: Option<Vec<u8>>,
}

impl Crl {
    /// Parses a DER-encoded CRL.
    pub fn from_der(der: &[u8]) -> Result<Self, CrlError> {
        let (rest, crl) = CertificateRevocationList::from_der(der)
            .map_err(|e| CrlError::InvalidDer(e.to_string()))?;

        if !rest.is_empty() {
            return Err(CrlError::TrailingData);
        }

        let revoked = crl
            .iter_revoked_certificates()
            .map(|entry| {
                Ok(RevokedEntry {
                    serial: strip_leading_zeros(entry.raw_serial()).to_vec(),
                    revocation_time: asn1_time(entry.revocation_date)
                        .ok_or(CrlError::InvalidTime)?,
                    reason: entry
                        .reason_code()
                        .and_then(|(_critical, code)| RevocationReason::from_code(code.0)),
                })
            })
            .collect::<Result<Vec<_>, CrlError>>()?;

        let authority_key_id = crl
            .extensions()
            .iter()
            .find_map(|ext| match ext.parsed_extension() {
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    aki.key_identifier.as_ref().map(|kid| kid.0.to_vec())
                }
                _ => None,
            });

        let next_update = match crl.next_update() {
            Some(time) => Some(asn1_time(time).ok_or(CrlError::InvalidTime)?),
            None => None,
        };

        Ok(Self {
            der: der.to_vec(),
            tbs: crl.tbs_cert_list.as_ref().to_vec(),
            issuer: crl.issuer().to_string(),
            issuer_der: crl.issuer().as_raw().to_vec(),
            this_update: asn1_time(crl.last_update()).ok_or(CrlError::InvalidTime)?,
            next_update,
            revoked,
            signature_algorithm: crl.signature_algorithm.algorithm.to_id_string(),
            signature: crl.signature_value.data.to_vec(),
            authority_key_id,
        })
    }

    /// Returns the entry for `serial`, ignoring `removeFromCRL` entries.
    pub fn find(&self, serial: &[u8]) -> Option<&RevokedEntry> {
        let serial = strip_leading_zeros(serial);
        self.revoked.iter().find(|entry| {
            entry.serial == serial && entry.reason != Some(RevocationReason::RemoveFromCrl)
        })
    }

    /// Returns `true` if `issuer` is named as the issuer of this CRL and,
    /// when both are present, its key identifier matches.
    pub fn is_issued_by(&self, issuer: &Certificate) -> bool {
        if self.issuer_der != issuer.subject_der {
            return false;
        }

        match (&self.authority_key_id, &issuer.subject_key_id) {
            (Some(aki), Some(ski)) => aki == ski,
            _ => true,
        }
    }

    /// SHA-256 of the DER encoding.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.der)
    }
}
