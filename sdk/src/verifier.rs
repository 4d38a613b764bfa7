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

use sigtrust_crypto::raw_signature::validator_for_sig_alg_oid;

/// Checks raw signatures on certificates, CRLs and OCSP responses.
pub trait SignatureVerifier: Send + Sync {
    /// Returns `true` if `signature` over `signed` verifies with
    /// `public_key` (a DER `SubjectPublicKeyInfo`) under the algorithm
    /// identified by the dotted-decimal `alg_oid`.
    fn verify(&self, alg_oid: &str, signed: &[u8], signature: &[u8], public_key: &[u8]) -> bool;
}

/// [`SignatureVerifier`] backed by the validators in `sigtrust-crypto`.
///
/// Unsupported algorithms never verify.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeSignatureVerifier;

impl SignatureVerifier for NativeSignatureVerifier {
    fn verify(&self, alg_oid: &str, signed: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let Some(validator) = validator_for_sig_alg_oid(alg_oid) else {
            log::debug!("no signature validator for algorithm {alg_oid}");
            return false;
        };

        match validator.validate(signature, signed, public_key) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("signature did not verify: {e}");
                false
            }
        }
    }
}
