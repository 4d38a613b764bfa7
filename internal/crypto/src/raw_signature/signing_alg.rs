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

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use x509_parser::oid_registry::Oid;

use crate::raw_signature::oids::*;

/// Describes the certificate and revocation-data signature algorithms that
/// can be verified.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SigningAlg {
    /// ECDSA with SHA-256
    Es256,

    /// ECDSA with SHA-384
    Es384,

    /// RSASSA-PKCS1-v1_5 using SHA-256
    Rs256,

    /// RSASSA-PKCS1-v1_5 using SHA-384
    Rs384,

    /// RSASSA-PKCS1-v1_5 using SHA-512
    Rs512,

    /// Edwards-Curve DSA (Ed25519 instance only)
    Ed25519,
}

impl SigningAlg {
    /// Maps an X.509 `AlgorithmIdentifier` OID to a signing algorithm.
    pub fn from_oid(oid: &Oid) -> Option<Self> {
        if *oid == ED25519_OID {
            Some(Self::Ed25519)
        } else if *oid == ECDSA_WITH_SHA256_OID {
            Some(Self::Es256)
        } else if *oid == ECDSA_WITH_SHA384_OID {
            Some(Self::Es384)
        } else if *oid == SHA256_WITH_RSAENCRYPTION_OID {
            Some(Self::Rs256)
        } else if *oid == SHA384_WITH_RSAENCRYPTION_OID {
            Some(Self::Rs384)
        } else if *oid == SHA512_WITH_RSAENCRYPTION_OID {
            Some(Self::Rs512)
        } else {
            None
        }
    }

    /// Same as [`from_oid`](Self::from_oid), taking the dotted-decimal form
    /// (for example `"1.3.101.112"`).
    pub fn from_oid_str(oid: &str) -> Option<Self> {
        let oid = Oid::from_str(oid).ok()?;
        Self::from_oid(&oid)
    }
}

impl FromStr for SigningAlg {
    type Err = UnknownAlgorithmError;

    fn from_str(alg: &str) -> Result<Self, Self::Err> {
        match alg {
            "es256" => Ok(Self::Es256),
            "es384" => Ok(Self::Es384),
            "rs256" => Ok(Self::Rs256),
            "rs384" => Ok(Self::Rs384),
            "rs512" => Ok(Self::Rs512),
            "ed25519" => Ok(Self::Ed25519),
            _ => Err(UnknownAlgorithmError(alg.to_owned())),
        }
    }
}

impl fmt::Display for SigningAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Self::Es256 => "es256",
                Self::Es384 => "es384",
                Self::Rs256 => "rs256",
                Self::Rs384 => "rs384",
                Self::Rs512 => "rs512",
                Self::Ed25519 => "ed25519",
            }
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
/// This error is thrown when converting from a string to [`SigningAlg`]
/// if the algorithm string is unrecognized.
///
/// The string must be one of "es256", "es384", "rs256", "rs384", "rs512",
/// or "ed25519".
pub struct UnknownAlgorithmError(pub String);

impl fmt::Display for UnknownAlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "UnknownAlgorithmError({})", self.0)
    }
}

impl std::error::Error for UnknownAlgorithmError {}
