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

//! ASN.1 syntax of the RFC 6960 structures, decoded with `asn1-rs` derives.

use asn1_rs::{
    ASN1TimeZone, Any, BitString, DerSequence, Enumerated, GeneralizedTime, Integer, Oid,
    SerializeResult, Sequence, ToDer,
};
use chrono::{DateTime, NaiveDate, Utc};

/// `OCSPResponse`
#[derive(Debug, DerSequence)]
pub(super) struct OcspResponseDer<'a> {
    pub(super) response_status: Enumerated,

    #[tag_explicit(0)]
    #[optional]
    pub(super) response_bytes: Option<ResponseBytesDer<'a>>,
}

/// `ResponseBytes`
#[derive(Debug, DerSequence)]
pub(super) struct ResponseBytesDer<'a> {
    pub(super) response_type: Oid<'a>,
    pub(super) response: &'a [u8],
}

/// `BasicOCSPResponse`
///
/// `tbsResponseData` stays undecoded so the signed bytes can be kept.
#[derive(Debug, DerSequence)]
pub(super) struct BasicOcspResponseDer<'a> {
    pub(super) tbs_response_data: Any<'a>,
    pub(super) signature_algorithm: AlgorithmIdentifierDer<'a>,
    pub(super) signature: BitString<'a>,

    #[tag_explicit(0)]
    #[optional]
    pub(super) certs: Option<Vec<Any<'a>>>,
}

/// `ResponseData`, without `responseExtensions`.
#[derive(Debug, DerSequence)]
pub(super) struct ResponseDataDer<'a> {
    #[tag_explicit(0)]
    #[optional]
    pub(super) version: Option<u32>,

    /// `ResponderID` CHOICE, `[1]` by name or `[2]` by key.
    pub(super) responder_id: Any<'a>,

    pub(super) produced_at: GeneralizedTime,
    pub(super) responses: Vec<SingleResponseDer<'a>>,
}

/// `SingleResponse`, without `singleExtensions`.
#[derive(Debug, DerSequence)]
pub(super) struct SingleResponseDer<'a> {
    pub(super) cert_id: CertIdDer<'a>,

    /// `CertStatus` CHOICE of `[0]` good, `[1]` revoked, `[2]` unknown.
    pub(super) cert_status: Any<'a>,

    pub(super) this_update: GeneralizedTime,

    #[tag_explicit(0)]
    #[optional]
    pub(super) next_update: Option<GeneralizedTime>,
}

/// `RevokedInfo`
#[derive(Debug, DerSequence)]
pub(super) struct RevokedInfoDer {
    pub(super) revocation_time: GeneralizedTime,

    #[tag_explicit(0)]
    #[optional]
    pub(super) revocation_reason: Option<Enumerated>,
}

/// `CertID`
#[derive(Debug, DerSequence)]
pub(super) struct CertIdDer<'a> {
    pub(super) hash_algorithm: AlgorithmIdentifierDer<'a>,
    pub(super) issuer_name_hash: &'a [u8],
    pub(super) issuer_key_hash: &'a [u8],
    pub(super) serial_number: Integer<'a>,
}

impl CertIdDer<'_> {
    pub(super) fn to_sequence(&self) -> SerializeResult<Sequence<'static>> {
        sequence(&[
            &self.hash_algorithm.to_sequence()?,
            &self.issuer_name_hash,
            &self.issuer_key_hash,
            &self.serial_number,
        ])
    }
}

/// `AlgorithmIdentifier`
#[derive(Debug, DerSequence)]
pub(super) struct AlgorithmIdentifierDer<'a> {
    pub(super) algorithm: Oid<'a>,

    #[optional]
    pub(super) parameters: Option<Any<'a>>,
}

impl AlgorithmIdentifierDer<'_> {
    pub(super) fn to_sequence(&self) -> SerializeResult<Sequence<'static>> {
        match &self.parameters {
            Some(parameters) => sequence(&[&self.algorithm, parameters]),
            None => sequence(&[&self.algorithm]),
        }
    }
}

/// Concatenates the DER encodings of `fields` into a SEQUENCE.
pub(super) fn sequence(fields: &[&dyn ToDer]) -> SerializeResult<Sequence<'static>> {
    let mut content = Vec::new();
    for field in fields {
        field.write_der(&mut content)?;
    }
    Ok(Sequence::new(content.into()))
}

/// Converts a DER GeneralizedTime, which is always in UTC.
///
/// Fractional seconds are dropped.
pub(super) fn utc(time: &GeneralizedTime) -> Option<DateTime<Utc>> {
    let time = &time.0;
    if time.tz != ASN1TimeZone::Z {
        return None;
    }

    let year = i32::try_from(time.year).ok()?;
    NaiveDate::from_ymd_opt(year, time.month.into(), time.day.into())?
        .and_hms_opt(time.hour.into(), time.minute.into(), time.second.into())
        .map(|naive| naive.and_utc())
}
