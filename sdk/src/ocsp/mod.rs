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

//! OCSP responses (RFC 6960) and the requests used to obtain them.

use std::sync::Arc;

use asn1_rs::{Any, Class, FromDer, TaggedImplicit, ToDer};
use chrono::{DateTime, Utc};
use sigtrust_crypto::{
    hash::{sha1, sha256, sha384, sha512},
    raw_signature::oids::{SHA1_OID, SHA256_OID, SHA384_OID, SHA512_OID},
};
use thiserror::Error;
use x509_parser::{der_parser::oid, oid_registry::Oid, prelude::X509Name};

use crate::{
    certificate::{strip_leading_zeros, Certificate, CertificateError, Fingerprint},
    crl::RevocationReason,
};

mod syntax;
use syntax::{
    BasicOcspResponseDer, CertIdDer, OcspResponseDer, ResponseDataDer, RevokedInfoDer,
    SingleResponseDer,
};

mod request;
pub use request::OcspRequest;

pub(crate) const OCSP_BASIC_OID: Oid<'static> = oid!(1.3.6 .1 .5 .5 .7 .48 .1 .1);
pub(crate) const OCSP_NONCE_OID: Oid<'static> = oid!(1.3.6 .1 .5 .5 .7 .48 .1 .2);

/// Describes errors that can occur when parsing or encoding OCSP messages.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum OcspError {
    /// The DER structure did not match the OCSP syntax.
    #[error("invalid OCSP DER: {0}")]
    InvalidDer(#[from] asn1_rs::Error),

    /// The response was followed by unexpected bytes.
    #[error("trailing data after OCSP response")]
    TrailingData,

    /// The responder answered with an error status instead of a response.
    #[error("OCSP response status {0} is not successful")]
    Unsuccessful(u32),

    /// A successful response carried no `responseBytes`.
    #[error("successful OCSP response without responseBytes")]
    MissingResponseBytes,

    /// The response is not a basic OCSP response.
    #[error("unsupported OCSP response type {0}")]
    UnsupportedResponseType(String),

    /// The response data has a version other than v1.
    #[error("unsupported OCSP response version {0}")]
    UnsupportedVersion(u32),

    /// A CHOICE had an alternative RFC 6960 does not define.
    #[error("invalid OCSP {0}")]
    InvalidChoice(&'static str),

    /// A time is not a UTC GeneralizedTime or is out of range.
    #[error("invalid OCSP time")]
    InvalidTime,

    /// An embedded responder certificate could not be parsed.
    #[error("invalid embedded certificate: {0}")]
    InvalidCertificate(#[from] CertificateError),

    /// The response does not contain any single response.
    #[error("OCSP response has no single responses")]
    NoResponses,

    /// A request could not be encoded.
    #[error("could not encode OCSP request: {0}")]
    Encoding(String),
}

impl From<asn1_rs::Err<asn1_rs::Error>> for OcspError {
    fn from(err: asn1_rs::Err<asn1_rs::Error>) -> Self {
        Self::InvalidDer(err.into())
    }
}

/// Identifies the key that signed an OCSP response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResponderId {
    /// Subject name of the responder certificate.
    ByName {
        /// RFC 4514 form.
        name: String,

        /// DER encoding.
        der: Vec<u8>,
    },

    /// SHA-1 hash of the responder's public key bits.
    ByKey(Vec<u8>),
}

impl ResponderId {
    /// Returns `true` if `cert` is the certificate identified here.
    pub fn matches(&self, cert: &Certificate) -> bool {
        match self {
            Self::ByName { der, .. } => *der == cert.subject_der,
            Self::ByKey(hash) => *hash == sha1(&cert.public_key),
        }
    }

    fn from_syntax(responder: &Any<'_>) -> Result<Self, OcspError> {
        if responder.class() != Class::ContextSpecific {
            return Err(OcspError::InvalidChoice("ResponderID"));
        }

        match responder.tag().0 {
            1 => {
                let (_, name) = X509Name::from_der(responder.data)
                    .map_err(|_| OcspError::InvalidChoice("ResponderID"))?;
                Ok(Self::ByName {
                    name: name.to_string(),
                    der: name.as_raw().to_vec(),
                })
            }
            2 => {
                let (_, hash) = <&[u8] as FromDer<'_, asn1_rs::Error>>::from_der(responder.data)?;
                Ok(Self::ByKey(hash.to_vec()))
            }
            _ => Err(OcspError::InvalidChoice("ResponderID")),
        }
    }
}

/// Identifies the certificate a single response is about.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertId {
    /// Hash algorithm as a dotted-decimal OID.
    pub hash_algorithm: String,

    /// Hash of the issuer's distinguished name.
    pub issuer_name_hash: Vec<u8>,

    /// Hash of the issuer's public key bits.
    pub issuer_key_hash: Vec<u8>,

    /// Serial number without leading zeros.
    pub serial: Vec<u8>,
}

impl CertId {
    /// Builds the SHA-1 `CertID` for `cert` as issued by `issuer`.
    pub fn for_certificate(cert: &Certificate, issuer: &Certificate) -> Self {
        Self {
            hash_algorithm: SHA1_OID.to_id_string(),
            issuer_name_hash: sha1(&issuer.subject_der),
            issuer_key_hash: sha1(&issuer.public_key),
            serial: cert.serial.clone(),
        }
    }

    /// Returns `true` if this identifies `cert` as issued by `issuer`.
    ///
    /// Identifiers that use an unsupported hash algorithm never match.
    pub fn matches(&self, cert: &Certificate, issuer: &Certificate) -> bool {
        let Some(name_hash) = digest(&self.hash_algorithm, &issuer.subject_der) else {
            return false;
        };
        let Some(key_hash) = digest(&self.hash_algorithm, &issuer.public_key) else {
            return false;
        };

        self.serial == cert.serial
            && self.issuer_name_hash == name_hash
            && self.issuer_key_hash == key_hash
    }

    fn from_syntax(cert_id: &CertIdDer<'_>) -> Self {
        Self {
            hash_algorithm: cert_id.hash_algorithm.algorithm.to_id_string(),
            issuer_name_hash: cert_id.issuer_name_hash.to_vec(),
            issuer_key_hash: cert_id.issuer_key_hash.to_vec(),
            serial: strip_leading_zeros(cert_id.serial_number.any().data).to_vec(),
        }
    }
}

/// Revocation status reported for one certificate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CertStatus {
    /// Not revoked.
    Good,

    /// Revoked at `time`.
    Revoked {
        /// Revocation time.
        time: DateTime<Utc>,

        /// Revocation reason, if given.
        reason: Option<RevocationReason>,
    },

    /// The responder does not know the certificate.
    Unknown,
}

/// Status of one certificate inside an OCSP response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SingleResponse {
    /// Which certificate this is about.
    pub cert_id: CertId,

    /// The reported status.
    pub status: CertStatus,

    /// Time at which the status was known to be correct.
    pub this_update: DateTime<Utc>,

    /// Time at or before which newer information will be available.
    pub next_update: Option<DateTime<Utc>>,
}

impl SingleResponse {
    fn from_syntax(single: SingleResponseDer<'_>) -> Result<Self, OcspError> {
        let next_update = match &single.next_update {
            Some(time) => Some(syntax::utc(time).ok_or(OcspError::InvalidTime)?),
            None => None,
        };

        Ok(Self {
            cert_id: CertId::from_syntax(&single.cert_id),
            status: cert_status(single.cert_status)?,
            this_update: syntax::utc(&single.this_update).ok_or(OcspError::InvalidTime)?,
            next_update,
        })
    }
}

fn cert_status(status: Any<'_>) -> Result<CertStatus, OcspError> {
    if status.class() != Class::ContextSpecific {
        return Err(OcspError::InvalidChoice("CertStatus"));
    }

    match status.tag().0 {
        0 => Ok(CertStatus::Good),
        1 => {
            let info = TaggedImplicit::<RevokedInfoDer, asn1_rs::Error, 1>::try_from(status)?
                .into_inner();
            let reason = info
                .revocation_reason
                .and_then(|code| u8::try_from(code.0).ok())
                .and_then(RevocationReason::from_code);

            Ok(CertStatus::Revoked {
                time: syntax::utc(&info.revocation_time).ok_or(OcspError::InvalidTime)?,
                reason,
            })
        }
        2 => Ok(CertStatus::Unknown),
        _ => Err(OcspError::InvalidChoice("CertStatus")),
    }
}

/// A parsed, immutable basic OCSP response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OcspResponse {
    /// Complete DER encoding of the `OCSPResponse`.
    pub der: Vec<u8>,

    /// DER encoding of the `ResponseData`, the data covered by the
    /// signature.
    pub tbs: Vec<u8>,

    /// Identifies the signer.
    pub responder_id: ResponderId,

    /// When the response was signed.
    pub produced_at: DateTime<Utc>,

    /// Status of each certificate the response covers.
    pub responses: Vec<SingleResponse>,

    /// Signature algorithm as a dotted-decimal OID.
    pub signature_algorithm: String,

    /// Signature value.
    pub signature: Vec<u8>,

    /// Certificates embedded to help validate the responder.
    pub certificates: Vec<Arc<Certificate>>,
}

impl OcspResponse {
    /// Parses a DER-encoded `OCSPResponse`.
    ///
    /// Only successful responses of type `id-pkix-ocsp-basic` are accepted.
    pub fn from_der(der: &[u8]) -> Result<Self, OcspError> {
        let (rest, response) = OcspResponseDer::from_der(der)?;
        if !rest.is_empty() {
            return Err(OcspError::TrailingData);
        }

        if response.response_status.0 != 0 {
            return Err(OcspError::Unsuccessful(response.response_status.0));
        }

        let response_bytes = response
            .response_bytes
            .ok_or(OcspError::MissingResponseBytes)?;
        if response_bytes.response_type != OCSP_BASIC_OID {
            return Err(OcspError::UnsupportedResponseType(
                response_bytes.response_type.to_id_string(),
            ));
        }

        let (_, basic) = BasicOcspResponseDer::from_der(response_bytes.response)?;

        let tbs = basic
            .tbs_response_data
            .to_der_vec()
            .map_err(|_| OcspError::InvalidDer(asn1_rs::Error::InvalidLength))?;
        let (_, data) = ResponseDataDer::from_der(&tbs)?;

        if let Some(version) = data.version.filter(|version| *version != 0) {
            return Err(OcspError::UnsupportedVersion(version));
        }

        let responder_id = ResponderId::from_syntax(&data.responder_id)?;
        let produced_at = syntax::utc(&data.produced_at).ok_or(OcspError::InvalidTime)?;

        let responses = data
            .responses
            .into_iter()
            .map(SingleResponse::from_syntax)
            .collect::<Result<Vec<_>, _>>()?;
        if responses.is_empty() {
            return Err(OcspError::NoResponses);
        }

        let certificates = basic
            .certs
            .unwrap_or_default()
            .iter()
            .map(|cert| -> Result<_, OcspError> {
                let der = cert
                    .to_der_vec()
                    .map_err(|_| OcspError::InvalidDer(asn1_rs::Error::InvalidLength))?;
                Ok(Arc::new(Certificate::from_der(&der)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            der: der.to_vec(),
            tbs,
            responder_id,
            produced_at,
            responses,
            signature_algorithm: basic.signature_algorithm.algorithm.to_id_string(),
            signature: basic.signature.data.to_vec(),
            certificates,
        })
    }

    /// Returns the single response about `cert` as issued by `issuer`.
    pub fn find_response(
        &self,
        cert: &Certificate,
        issuer: &Certificate,
    ) -> Option<&SingleResponse> {
        self.responses
            .iter()
            .find(|response| response.cert_id.matches(cert, issuer))
    }

    /// SHA-256 of the DER encoding.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.der)
    }
}

fn digest(hash_algorithm: &str, data: &[u8]) -> Option<Vec<u8>> {
    let oid: Oid = hash_algorithm.parse().ok()?;

    if oid == SHA1_OID {
        Some(sha1(data))
    } else if oid == SHA256_OID {
        Some(sha256(data))
    } else if oid == SHA384_OID {
        Some(sha384(data))
    } else if oid == SHA512_OID {
        Some(sha512(data))
    } else {
        None
    }
}
