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

use asn1_rs::{Any, Integer, OctetString, SerializeResult, Tag, TaggedExplicit, ToDer};
use x509_parser::oid_registry::Oid;

use super::syntax::{sequence, AlgorithmIdentifierDer, CertIdDer};
use crate::{
    certificate::{strip_leading_zeros, Certificate},
    ocsp::{CertId, OcspError, OCSP_NONCE_OID},
};

/// An unsigned OCSP request for a single certificate.
///
/// The crate never sends requests itself. Online [`CertificateSource`]
/// implementations use this to build the body they POST to the URIs in
/// [`Certificate::ocsp_responders`].
///
/// [`CertificateSource`]: crate::CertificateSource
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OcspRequest {
    /// The certificate being asked about.
    pub cert_id: CertId,

    /// Value of the nonce extension, if any.
    pub nonce: Option<Vec<u8>>,
}

impl OcspRequest {
    /// Creates a request for `cert` as issued by `issuer`, using SHA-1
    /// hashes as RFC 5019 requires.
    pub fn for_certificate(cert: &Certificate, issuer: &Certificate) -> Self {
        Self {
            cert_id: CertId::for_certificate(cert, issuer),
            nonce: None,
        }
    }

    /// Adds a nonce extension.
    pub fn with_nonce(self, nonce: Vec<u8>) -> Self {
        Self {
            nonce: Some(nonce),
            ..self
        }
    }

    /// Encodes the request as DER.
    pub fn to_der(&self) -> Result<Vec<u8>, OcspError> {
        let hash_algorithm: Oid = self.cert_id.hash_algorithm.parse().map_err(|_| {
            OcspError::Encoding(format!(
                "invalid hash algorithm {}",
                self.cert_id.hash_algorithm
            ))
        })?;

        self.encode(hash_algorithm)
            .map_err(|e| OcspError::Encoding(e.to_string()))
    }

    fn encode(&self, hash_algorithm: Oid<'_>) -> SerializeResult<Vec<u8>> {
        let serial = integer_content(&self.cert_id.serial);
        let cert_id = CertIdDer {
            hash_algorithm: AlgorithmIdentifierDer {
                algorithm: hash_algorithm,
                parameters: Some(Any::from_tag_and_data(Tag::Null, &[])),
            },
            issuer_name_hash: &self.cert_id.issuer_name_hash,
            issuer_key_hash: &self.cert_id.issuer_key_hash,
            serial_number: Integer::new(&serial),
        };

        // Request ::= SEQUENCE { reqCert CertID }
        let request_list = sequence(&[&sequence(&[&cert_id.to_sequence()?])?])?;

        let tbs_request = match &self.nonce {
            Some(nonce) => {
                let value = OctetString::new(nonce).to_der_vec()?;
                let extension = sequence(&[&OCSP_NONCE_OID, &OctetString::new(&value)])?;
                let extensions =
                    TaggedExplicit::<_, asn1_rs::Error, 2>::explicit(sequence(&[&extension])?);
                sequence(&[&request_list, &extensions])?
            }
            None => sequence(&[&request_list])?,
        };

        sequence(&[&tbs_request])?.to_der_vec()
    }
}

/// INTEGER content octets for an unsigned big-endian magnitude.
fn integer_content(magnitude: &[u8]) -> Vec<u8> {
    let magnitude = strip_leading_zeros(magnitude);
    let mut content = Vec::with_capacity(magnitude.len() + 1);
    if magnitude.first().map_or(true, |b| b & 0x80 != 0) {
        content.push(0);
    }
    content.extend_from_slice(magnitude);
    content
}
