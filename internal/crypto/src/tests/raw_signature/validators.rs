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

use ed25519_dalek::{pkcs8::EncodePublicKey as _, Signer as _};
use p256::ecdsa::{Signature as P256Signature, SigningKey as P256SigningKey};
use p384::ecdsa::{Signature as P384Signature, SigningKey as P384SigningKey};

use crate::raw_signature::{
    validator_for_sig_alg_oid, validator_for_signing_alg, RawSignatureValidationError,
    SigningAlg,
};

const SAMPLE_DATA: &[u8] = b"some sample content to sign";

fn ed25519_key() -> ed25519_dalek::SigningKey {
    ed25519_dalek::SigningKey::from_bytes(&[7u8; 32])
}

fn p256_key() -> P256SigningKey {
    P256SigningKey::from_slice(&[0x11; 32]).unwrap()
}

fn p256_spki(key: &P256SigningKey) -> Vec<u8> {
    use p256::pkcs8::EncodePublicKey;
    key.verifying_key()
        .to_public_key_der()
        .unwrap()
        .as_bytes()
        .to_vec()
}

#[test]
fn ed25519_raw_key() {
    let key = ed25519_key();
    let signature = key.sign(SAMPLE_DATA).to_bytes();
    let pub_key = key.verifying_key().to_bytes();

    let validator = validator_for_signing_alg(SigningAlg::Ed25519).unwrap();

    validator.validate(&signature, SAMPLE_DATA, &pub_key).unwrap();
}

#[test]
fn ed25519_spki_key() {
    let key = ed25519_key();
    let signature = key.sign(SAMPLE_DATA).to_bytes();
    let spki = key.verifying_key().to_public_key_der().unwrap();

    let validator = validator_for_sig_alg_oid("1.3.101.112").unwrap();

    validator
        .validate(&signature, SAMPLE_DATA, spki.as_bytes())
        .unwrap();
}

#[test]
fn ed25519_bad_data() {
    let key = ed25519_key();
    let signature = key.sign(SAMPLE_DATA).to_bytes();
    let pub_key = key.verifying_key().to_bytes();

    let mut data = SAMPLE_DATA.to_vec();
    data[10] = 0;

    let validator = validator_for_signing_alg(SigningAlg::Ed25519).unwrap();

    assert_eq!(
        validator.validate(&signature, &data, &pub_key).unwrap_err(),
        RawSignatureValidationError::SignatureMismatch
    );
}

#[test]
fn ed25519_wrong_key() {
    let key = ed25519_key();
    let other = ed25519_dalek::SigningKey::from_bytes(&[8u8; 32]);
    let signature = key.sign(SAMPLE_DATA).to_bytes();

    let validator = validator_for_signing_alg(SigningAlg::Ed25519).unwrap();

    assert_eq!(
        validator
            .validate(&signature, SAMPLE_DATA, &other.verifying_key().to_bytes())
            .unwrap_err(),
        RawSignatureValidationError::SignatureMismatch
    );
}

#[test]
fn ed25519_truncated_signature() {
    let key = ed25519_key();
    let signature = key.sign(SAMPLE_DATA).to_bytes();

    let validator = validator_for_signing_alg(SigningAlg::Ed25519).unwrap();

    assert_eq!(
        validator
            .validate(
                &signature[..40],
                SAMPLE_DATA,
                &key.verifying_key().to_bytes()
            )
            .unwrap_err(),
        RawSignatureValidationError::InvalidSignature
    );
}

#[test]
fn es256_der_signature() {
    let key = p256_key();
    let signature: P256Signature = key.sign(SAMPLE_DATA);
    let der = signature.to_der();

    let validator = validator_for_signing_alg(SigningAlg::Es256).unwrap();

    validator
        .validate(der.as_bytes(), SAMPLE_DATA, &p256_spki(&key))
        .unwrap();
}

#[test]
fn es256_p1363_signature() {
    let key = p256_key();
    let signature: P256Signature = key.sign(SAMPLE_DATA);

    let validator = validator_for_sig_alg_oid("1.2.840.10045.4.3.2").unwrap();

    validator
        .validate(&signature.to_bytes(), SAMPLE_DATA, &p256_spki(&key))
        .unwrap();
}

#[test]
fn es256_bad_signature() {
    let key = p256_key();
    let signature: P256Signature = key.sign(SAMPLE_DATA);
    let mut raw = signature.to_bytes().to_vec();
    raw[10] ^= 0x5a;

    let validator = validator_for_signing_alg(SigningAlg::Es256).unwrap();

    assert_eq!(
        validator
            .validate(&raw, SAMPLE_DATA, &p256_spki(&key))
            .unwrap_err(),
        RawSignatureValidationError::SignatureMismatch
    );
}

#[test]
fn es256_not_an_ec_key() {
    let key = ed25519_key();
    let spki = key.verifying_key().to_public_key_der().unwrap();

    let validator = validator_for_signing_alg(SigningAlg::Es256).unwrap();

    assert_eq!(
        validator
            .validate(&[0u8; 64], SAMPLE_DATA, spki.as_bytes())
            .unwrap_err(),
        RawSignatureValidationError::InvalidPublicKey
    );
}

#[test]
fn es384() {
    use p384::pkcs8::EncodePublicKey;

    let key = P384SigningKey::from_slice(&[0x22; 48]).unwrap();
    let signature: P384Signature = key.sign(SAMPLE_DATA);
    let spki = key.verifying_key().to_public_key_der().unwrap();

    let validator = validator_for_signing_alg(SigningAlg::Es384).unwrap();

    validator
        .validate(signature.to_der().as_bytes(), SAMPLE_DATA, spki.as_bytes())
        .unwrap();
}

#[test]
fn rs256_bad_key() {
    let validator = validator_for_signing_alg(SigningAlg::Rs256).unwrap();

    assert_eq!(
        validator
            .validate(&[0u8; 256], SAMPLE_DATA, b"not a key")
            .unwrap_err(),
        RawSignatureValidationError::InvalidPublicKey
    );
}

#[test]
fn unknown_oid() {
    assert!(validator_for_sig_alg_oid("1.2.840.113549.1.1.10").is_none());
}
