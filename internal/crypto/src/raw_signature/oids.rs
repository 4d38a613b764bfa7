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

//! Object identifiers for the signature, hash and key algorithms found in
//! certificates, CRLs and OCSP responses.

use x509_parser::{der_parser::oid, oid_registry::Oid};

/// `rsaEncryption`
pub const RSA_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .1);

/// `sha256WithRSAEncryption`
pub const SHA256_WITH_RSAENCRYPTION_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .11);
/// `sha384WithRSAEncryption`
pub const SHA384_WITH_RSAENCRYPTION_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .12);
/// `sha512WithRSAEncryption`
pub const SHA512_WITH_RSAENCRYPTION_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .13);

/// SHA-1, used for OCSP `CertID` hashes.
pub const SHA1_OID: Oid<'static> = oid!(1.3.14 .3 .2 .26);
/// SHA-256
pub const SHA256_OID: Oid<'static> = oid!(2.16.840 .1 .101 .3 .4 .2 .1);
/// SHA-384
pub const SHA384_OID: Oid<'static> = oid!(2.16.840 .1 .101 .3 .4 .2 .2);
/// SHA-512
pub const SHA512_OID: Oid<'static> = oid!(2.16.840 .1 .101 .3 .4 .2 .3);

/// `id-ecPublicKey`
pub const EC_PUBLICKEY_OID: Oid<'static> = oid!(1.2.840 .10045 .2 .1);
/// `ecdsa-with-SHA256`
pub const ECDSA_WITH_SHA256_OID: Oid<'static> = oid!(1.2.840 .10045 .4 .3 .2);
/// `ecdsa-with-SHA384`
pub const ECDSA_WITH_SHA384_OID: Oid<'static> = oid!(1.2.840 .10045 .4 .3 .3);

/// `secp384r1`
pub const SECP384R1_OID: Oid<'static> = oid!(1.3.132 .0 .34);
/// `prime256v1`
pub const PRIME256V1_OID: Oid<'static> = oid!(1.2.840 .10045 .3 .1 .7);

/// `id-Ed25519`
pub const ED25519_OID: Oid<'static> = oid!(1.3.101 .112);
