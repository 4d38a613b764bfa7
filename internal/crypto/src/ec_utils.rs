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

//! Helpers for the ECDSA signatures found on certificates, CRLs and OCSP
//! responses.

use x509_parser::{
    der_parser::{
        der::{parse_der_integer, parse_der_sequence_defined_g},
        error::BerResult,
    },
    prelude::FromDer,
    x509::SubjectPublicKeyInfo,
};

use crate::raw_signature::{
    oids::{EC_PUBLICKEY_OID, PRIME256V1_OID, SECP384R1_OID},
    RawSignatureValidationError,
};

/// NIST curves supported by `EcdsaValidator`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EcdsaCurve {
    /// NIST curve P-256
    P256,

    /// NIST curve P-384
    P384,
}

impl EcdsaCurve {
    /// Length in bytes of one signature component (`r` or `s`).
    pub(crate) fn component_len(self) -> usize {
        match self {
            EcdsaCurve::P256 => 32,
            EcdsaCurve::P384 => 48,
        }
    }
}

struct EcSigComps<'a> {
    r: &'a [u8],
    s: &'a [u8],
}

fn parse_ec_der_sig(data: &[u8]) -> BerResult<'_, EcSigComps<'_>> {
    parse_der_sequence_defined_g(|content: &[u8], _| {
        let (rem1, r) = parse_der_integer(content)?;
        let (_rem2, s) = parse_der_integer(rem1)?;

        Ok((
            data,
            EcSigComps {
                r: r.as_slice()?,
                s: s.as_slice()?,
            },
        ))
    })(data)
}

/// Converts an X.509 `ECDSA-Sig-Value` (DER `SEQUENCE { r, s }`) into the
/// fixed-size `r | s` form expected by the RustCrypto verifiers.
pub(crate) fn der_to_p1363(
    data: &[u8],
    curve: EcdsaCurve,
) -> Result<Vec<u8>, RawSignatureValidationError> {
    let (_, comps) =
        parse_ec_der_sig(data).map_err(|_| RawSignatureValidationError::InvalidSignature)?;

    let len = curve.component_len();
    let mut out = Vec::with_capacity(len * 2);

    for component in [comps.r, comps.s] {
        // DER integers carry a leading zero when the high bit is set.
        let trimmed = match component.iter().position(|b| *b != 0) {
            Some(first) => &component[first..],
            None => &[][..],
        };

        if trimmed.len() > len {
            return Err(RawSignatureValidationError::InvalidSignature);
        }

        out.resize(out.len() + len - trimmed.len(), 0);
        out.extend_from_slice(trimmed);
    }

    Ok(out)
}

/// Returns the curve and the SEC1-encoded point of an EC
/// `SubjectPublicKeyInfo`.
pub(crate) fn ec_public_key_from_spki(
    public_key: &[u8],
) -> Result<(EcdsaCurve, Vec<u8>), RawSignatureValidationError> {
    let (_, spki) = SubjectPublicKeyInfo::from_der(public_key)
        .map_err(|_| RawSignatureValidationError::InvalidPublicKey)?;

    let alg = &spki.algorithm;
    if alg.algorithm != EC_PUBLICKEY_OID {
        return Err(RawSignatureValidationError::InvalidPublicKey);
    }

    let named_curve = alg
        .parameters
        .as_ref()
        .and_then(|p| p.as_oid().ok())
        .ok_or(RawSignatureValidationError::InvalidPublicKey)?;

    let curve = if named_curve == PRIME256V1_OID {
        EcdsaCurve::P256
    } else if named_curve == SECP384R1_OID {
        EcdsaCurve::P384
    } else {
        return Err(RawSignatureValidationError::UnsupportedAlgorithm);
    };

    Ok((curve, spki.subject_public_key.data.to_vec()))
}
