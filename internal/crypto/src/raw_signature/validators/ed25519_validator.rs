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

use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH};
use x509_parser::{prelude::FromDer, x509::SubjectPublicKeyInfo};

use crate::raw_signature::{oids::ED25519_OID, RawSignatureValidationError, RawSignatureValidator};

/// An `Ed25519Validator` can validate raw signatures with the Ed25519
/// signature algorithm.
pub struct Ed25519Validator {}

impl RawSignatureValidator for Ed25519Validator {
    fn validate(
        &self,
        sig: &[u8],
        data: &[u8],
        public_key: &[u8],
    ) -> Result<(), RawSignatureValidationError> {
        let signature =
            Signature::from_slice(sig).map_err(|_| RawSignatureValidationError::InvalidSignature)?;

        let key_bytes = raw_key_bytes(public_key)?;
        let vk = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|_| RawSignatureValidationError::InvalidPublicKey)?;

        vk.verify_strict(data, &signature)
            .map_err(|_| RawSignatureValidationError::SignatureMismatch)
    }
}

// Accepts either the bare 32-byte key or a `SubjectPublicKeyInfo`.
fn raw_key_bytes(
    public_key: &[u8],
) -> Result<[u8; PUBLIC_KEY_LENGTH], RawSignatureValidationError> {
    if let Ok(bytes) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(public_key) {
        return Ok(bytes);
    }

    let (_, spki) = SubjectPublicKeyInfo::from_der(public_key)
        .map_err(|_| RawSignatureValidationError::InvalidPublicKey)?;

    if spki.algorithm.algorithm != ED25519_OID {
        return Err(RawSignatureValidationError::InvalidPublicKey);
    }

    <[u8; PUBLIC_KEY_LENGTH]>::try_from(spki.subject_public_key.data.as_ref())
        .map_err(|_| RawSignatureValidationError::InvalidPublicKey)
}
