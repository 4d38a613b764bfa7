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

use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use sigtrust_crypto::hash::sha256;
use thiserror::Error;
use x509_parser::{
    extensions::{DistributionPointName, GeneralName, ParsedExtension},
    oid_registry::OID_PKIX_ACCESS_DESCRIPTOR_OCSP,
    prelude::{FromDer, X509Certificate},
    time::ASN1Time,
};

use crate::CertificateRole;

/// Describes errors that can occur when parsing a certificate.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum CertificateError {
    /// The DER could not be parsed as an X.509 certificate.
    #[error("invalid certificate DER: {0}")]
    InvalidDer(String),

    /// The certificate was followed by unexpected bytes.
    #[error("trailing data after certificate")]
    TrailingData,

    /// An extension that is needed for path validation could not be parsed.
    #[error("invalid {0} extension")]
    InvalidExtension(&'static str),

    /// A time field is outside the representable range.
    #[error("invalid validity time")]
    InvalidTime,
}

/// SHA-256 digest that identifies a certificate.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub(crate) fn of(data: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&sha256(data));
        Self(bytes)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Basic constraints extension.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BasicConstraints {
    /// Whether the subject is a CA.
    pub ca: bool,

    /// Maximum number of non-self-issued intermediates that may follow this
    /// certificate in a path.
    pub path_len: Option<u32>,
}

/// The key usage bits that path validation looks at.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct KeyUsage {
    /// `digitalSignature`
    pub digital_signature: bool,

    /// `nonRepudiation` (`contentCommitment`)
    pub non_repudiation: bool,

    /// `keyCertSign`
    pub key_cert_sign: bool,

    /// `cRLSign`
    pub crl_sign: bool,
}

/// Extended key usage extension.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtendedKeyUsage {
    /// `anyExtendedKeyUsage`
    pub any: bool,

    /// `id-kp-timeStamping`
    pub time_stamping: bool,

    /// `id-kp-OCSPSigning`
    pub ocsp_signing: bool,

    /// Any other purposes, as dotted-decimal OIDs.
    pub other: Vec<String>,
}

/// An X.509 certificate reduced to the fields path validation needs.
///
/// A `Certificate` is immutable once parsed and is shared between chains,
/// caches and reports as `Arc<Certificate>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Certificate {
    /// Complete DER encoding. Empty for synthetic certificates.
    pub der: Vec<u8>,

    /// DER encoding of the `TBSCertificate`, the data covered by the
    /// signature.
    pub tbs: Vec<u8>,

    /// Serial number as an unsigned big-endian integer without leading
    /// zeros.
    pub serial: Vec<u8>,

    /// Subject distinguished name in RFC 4514 form.
    pub subject: String,

    /// DER encoding of the subject name.
    pub subject_der: Vec<u8>,

    /// Issuer distinguished name in RFC 4514 form.
    pub issuer: String,

    /// DER encoding of the issuer name.
    pub issuer_der: Vec<u8>,

    /// Start of the validity period.
    pub not_before: DateTime<Utc>,

    /// End of the validity period.
    pub not_after: DateTime<Utc>,

    /// DER encoding of the `SubjectPublicKeyInfo`.
    pub spki: Vec<u8>,

    /// Content of the `subjectPublicKey` bit string.
    pub public_key: Vec<u8>,

    /// Signature algorithm as a dotted-decimal OID.
    pub signature_algorithm: String,

    /// Signature value.
    pub signature: Vec<u8>,

    /// X.509 version number (2 for v3).
    pub version: u32,

    /// Basic constraints extension, if present.
    pub basic_constraints: Option<BasicConstraints>,

    /// Key usage extension, if present.
    pub key_usage: Option<KeyUsage>,

    /// Extended key usage extension, if present.
    pub extended_key_usage: Option<ExtendedKeyUsage>,

    /// Subject key identifier, if present.
    pub subject_key_id: Option<Vec<u8>>,

    /// Key identifier from the authority key identifier extension, if
    /// present.
    pub authority_key_id: Option<Vec<u8>>,

    /// URIs from the CRL distribution points extension.
    pub crl_distribution_points: Vec<String>,

    /// OCSP responder URIs from the authority information access extension.
    pub ocsp_responders: Vec<String>,
}

impl Certificate {
    /// Parses a DER-encoded X.509 certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (rest, cert) = X509Certificate::from_der(der)
            .map_err(|e| CertificateError::InvalidDer(e.to_string()))?;

        if !rest.is_empty() {
            return Err(CertificateError::TrailingData);
        }

        let basic_constraints = cert
            .basic_constraints()
            .map_err(|_| CertificateError::InvalidExtension("basic constraints"))?
            .map(|ext| BasicConstraints {
                ca: ext.value.ca,
                path_len: ext.value.path_len_constraint,
            });

        let key_usage = cert
            .key_usage()
            .map_err(|_| CertificateError::InvalidExtension("key usage"))?
            .map(|ext| KeyUsage {
                digital_signature: ext.value.digital_signature(),
                non_repudiation: ext.value.non_repudiation(),
                key_cert_sign: ext.value.key_cert_sign(),
                crl_sign: ext.value.crl_sign(),
            });

        let extended_key_usage = cert
            .extended_key_usage()
            .map_err(|_| CertificateError::InvalidExtension("extended key usage"))?
            .map(|ext| ExtendedKeyUsage {
                any: ext.value.any,
                time_stamping: ext.value.time_stamping,
                ocsp_signing: ext.value.ocsp_signing,
                other: ext.value.other.iter().map(|oid| oid.to_id_string()).collect(),
            });

        let mut subject_key_id = None;
        let mut authority_key_id = None;
        let mut crl_distribution_points = Vec::new();
        let mut ocsp_responders = Vec::new();

        for ext in cert.iter_extensions() {
            match ext.parsed_extension() {
                ParsedExtension::SubjectKeyIdentifier(kid) => {
                    subject_key_id = Some(kid.0.to_vec());
                }
                ParsedExtension::AuthorityKeyIdentifier(aki) => {
                    authority_key_id = aki.key_identifier.as_ref().map(|kid| kid.0.to_vec());
                }
                ParsedExtension::CRLDistributionPoints(points) => {
                    for point in points.iter() {
                        if let Some(DistributionPointName::FullName(names)) =
                            &point.distribution_point
                        {
                            crl_distribution_points.extend(uris(names));
                        }
                    }
                }
                ParsedExtension::AuthorityInfoAccess(aia) => {
                    for desc in &aia.accessdescs {
                        if desc.access_method == OID_PKIX_ACCESS_DESCRIPTOR_OCSP {
                            ocsp_responders
                                .extend(uris(std::slice::from_ref(&desc.access_location)));
                        }
                    }
                }
                _ => (),
            }
        }

        let validity = cert.validity();

        Ok(Self {
            der: der.to_vec(),
            tbs: cert.tbs_certificate.as_ref().to_vec(),
            serial: strip_leading_zeros(cert.raw_serial()).to_vec(),
            subject: cert.subject().to_string(),
            subject_der: cert.subject().as_raw().to_vec(),
            issuer: cert.issuer().to_string(),
            issuer_der: cert.issuer().as_raw().to_vec(),
            not_before: asn1_time(validity.not_before).ok_or(CertificateError::InvalidTime)?,
            not_after: asn1_time(validity.not_after).ok_or(CertificateError::InvalidTime)?,
            spki: cert.public_key().raw.to_vec(),
            public_key: cert.public_key().subject_public_key.data.to_vec(),
            signature_algorithm: cert.signature_algorithm.algorithm.to_id_string(),
            signature: cert.signature_value.data.to_vec(),
            version: cert.version().0,
            basic_constraints,
            key_usage,
            extended_key_usage,
            subject_key_id,
            authority_key_id,
            crl_distribution_points,
            ocsp_responders,
        })
    }

    /// SHA-256 of the DER encoding, or of the TBS bytes followed by the
    /// signature for synthetic certificates without DER.
    pub fn fingerprint(&self) -> Fingerprint {
        if self.der.is_empty() {
            let mut data = self.tbs.clone();
            data.extend_from_slice(&self.signature);
            Fingerprint::of(&data)
        } else {
            Fingerprint::of(&self.der)
        }
    }

    /// Human-readable reference used in report items.
    pub fn reference(&self) -> String {
        let subject = if self.subject.is_empty() {
            "<no subject>"
        } else {
            &self.subject
        };
        format!("{subject} [serial {}]", hex::encode(&self.serial))
    }

    /// Returns `true` if subject and issuer names are identical.
    pub fn is_self_issued(&self) -> bool {
        self.subject_der == self.issuer_der
    }

    /// Returns `true` if `time` is inside the validity period widened by
    /// `skew` on both ends.
    pub fn is_valid_at(&self, time: DateTime<Utc>, skew: Duration) -> bool {
        let start = self
            .not_before
            .checked_sub_signed(skew)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let end = self
            .not_after
            .checked_add_signed(skew)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        start <= time && time <= end
    }

    /// Returns `true` if `issuer` could have issued this certificate by name
    /// and, when both are present, by key identifier.
    ///
    /// The signature is not checked.
    pub fn could_be_issued_by(&self, issuer: &Certificate) -> bool {
        if self.issuer_der != issuer.subject_der {
            return false;
        }

        match (&self.authority_key_id, &issuer.subject_key_id) {
            (Some(aki), Some(ski)) => aki == ski,
            _ => true,
        }
    }

    /// Returns `true` if the basic constraints mark the subject as a CA.
    pub fn is_ca(&self) -> bool {
        self.basic_constraints.is_some_and(|bc| bc.ca)
    }

    /// Names the required fields that are missing or inconsistent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.subject.is_empty() {
            missing.push("subject");
        }
        if self.issuer.is_empty() {
            missing.push("issuer");
        }
        if self.public_key.is_empty() || self.spki.is_empty() {
            missing.push("public key");
        }
        if self.signature.is_empty() {
            missing.push("signature");
        }
        if self.tbs.is_empty() {
            missing.push("tbs");
        }
        if self.not_before > self.not_after {
            missing.push("validity period");
        }

        missing
    }
}

/// A certificate at a position in a path, with the role it was assigned.
#[derive(Clone, Debug)]
pub struct CertificateNode {
    /// The certificate.
    pub certificate: Arc<Certificate>,

    /// Role assigned by [`CertificateRole::classify`].
    pub role: CertificateRole,

    /// Distance from the leaf (0 is the leaf).
    pub position: usize,
}

pub(crate) fn asn1_time(time: ASN1Time) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.timestamp(), 0)
}

/// Removes redundant leading zero octets from an unsigned big-endian value.
pub(crate) fn strip_leading_zeros(data: &[u8]) -> &[u8] {
    let first = data
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(data.len().saturating_sub(1));
    &data[first..]
}

fn uris<'a>(names: &'a [GeneralName<'a>]) -> impl Iterator<Item = String> + 'a {
    names.iter().filter_map(|name| match name {
        GeneralName::URI(uri) => Some(uri.to_string()),
        _ => None,
    })
}
