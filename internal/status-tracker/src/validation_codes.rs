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

//! Reason codes attached to [`ReportItem`]s.
//!
//! [`ReportItem`]: crate::ReportItem

// -- success codes --

/// The certificate is one of the configured trust anchors.
pub const CERTIFICATE_TRUSTED: &str = "certificate.trusted";

/// The certificate passed the structural, signature, validity window and
/// constraint checks for its hop.
pub const CERTIFICATE_VALIDATED: &str = "certificate.validated";

/// A revocation source confirmed that the certificate was not revoked at the
/// reference time.
pub const CERTIFICATE_NOT_REVOKED: &str = "revocation.notRevoked";

// -- chain failure codes --

/// The certificate could not be parsed or lacks a required field.
pub const MALFORMED_CERTIFICATE: &str = "certificate.malformed";

/// No issuer certificate could be found in the supplied chain, the document
/// store or the trust anchors.
pub const ISSUER_UNRESOLVED: &str = "certificate.issuerUnresolved";

/// The certificate's signature does not verify against any candidate issuer.
pub const SIGNATURE_INVALID: &str = "certificate.signatureInvalid";

/// The reference time is outside the certificate's period of validity.
pub const CERTIFICATE_EXPIRED_OR_NOT_YET_VALID: &str = "certificate.outsideValidity";

/// Basic constraints, path length, key usage or extended key usage forbid
/// the role the certificate was exercised in.
pub const CONSTRAINT_VIOLATION: &str = "certificate.constraintViolation";

/// The chain exceeded the configured maximum depth.
pub const CHAIN_TOO_LONG: &str = "chain.tooLong";

// -- revocation codes --

/// The certificate was revoked at or before the reference time.
pub const CERTIFICATE_REVOKED: &str = "revocation.revoked";

/// No revocation source produced a conclusive answer.
pub const REVOCATION_STATUS_UNKNOWN: &str = "revocation.statusUnknown";

/// The signature on a CRL or OCSP response did not verify.
pub const REVOCATION_SIGNATURE_INVALID: &str = "revocation.signatureInvalid";

/// The reference time is outside the validity window of the revocation data.
pub const REVOCATION_DATA_STALE: &str = "revocation.stale";

/// The revocation data could not be parsed.
pub const REVOCATION_DATA_MALFORMED: &str = "revocation.malformed";

/// The certificate chain of the CRL issuer or OCSP responder could not be
/// validated.
pub const REVOCATION_ISSUER_UNTRUSTED: &str = "revocation.issuerUntrusted";

/// Fetching revocation data took longer than the configured timeout.
pub const REVOCATION_FETCH_TIMEOUT: &str = "revocation.fetchTimeout";

/// No revocation data was available from any source.
pub const REVOCATION_DATA_UNAVAILABLE: &str = "revocation.unavailable";
