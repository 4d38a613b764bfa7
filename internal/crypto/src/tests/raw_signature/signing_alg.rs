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

use std::str::FromStr;

use crate::raw_signature::{oids::*, SigningAlg, UnknownAlgorithmError};

#[test]
fn from_oid() {
    assert_eq!(SigningAlg::from_oid(&ED25519_OID), Some(SigningAlg::Ed25519));
    assert_eq!(
        SigningAlg::from_oid(&ECDSA_WITH_SHA384_OID),
        Some(SigningAlg::Es384)
    );
    assert_eq!(
        SigningAlg::from_oid(&SHA512_WITH_RSAENCRYPTION_OID),
        Some(SigningAlg::Rs512)
    );

    // Hash and key OIDs are not signature algorithms.
    assert_eq!(SigningAlg::from_oid(&SHA256_OID), None);
    assert_eq!(SigningAlg::from_oid(&RSA_OID), None);
}

#[test]
fn from_oid_str() {
    assert_eq!(
        SigningAlg::from_oid_str("1.2.840.10045.4.3.2"),
        Some(SigningAlg::Es256)
    );
    assert_eq!(
        SigningAlg::from_oid_str("1.2.840.113549.1.1.11"),
        Some(SigningAlg::Rs256)
    );
    assert_eq!(SigningAlg::from_oid_str("1.2.3"), None);
    assert_eq!(SigningAlg::from_oid_str("not an oid"), None);
}

#[test]
fn alg_from_str() {
    assert_eq!(SigningAlg::from_str("es256"), Ok(SigningAlg::Es256));
    assert_eq!(SigningAlg::from_str("rs384"), Ok(SigningAlg::Rs384));
    assert_eq!(SigningAlg::from_str("ed25519"), Ok(SigningAlg::Ed25519));

    assert_eq!(
        SigningAlg::from_str("ps256"),
        Err(UnknownAlgorithmError("ps256".to_string()))
    );
}

#[test]
fn display() {
    assert_eq!(SigningAlg::Es384.to_string(), "es384");
    assert_eq!(SigningAlg::Rs512.to_string(), "rs512");
    assert_eq!(SigningAlg::Ed25519.to_string(), "ed25519");
}
