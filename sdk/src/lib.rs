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

#![deny(warnings)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

//! This library validates the X.509 certificate chain of a document signer
//! up to a trust anchor, checks revocation through CRLs and OCSP responses,
//! and explains the result in a [`ValidationReport`].
//!
//! # Example: Validating a signer
//!
//! ```no_run
//! # use std::sync::Arc;
//! use sigtrust::{settings::Settings, MemorySource, SignatureValidator, Status};
//!
//! # async fn run(signer_der: &[u8], chain_der: &[&[u8]], crl_der: &[u8]) -> sigtrust::Result<()> {
//! let settings = Settings::new().with_file("sigtrust.toml")?;
//!
//! let validator = SignatureValidator::new()
//!     .with_document_store(Arc::new(MemorySource::new().with_crl_der(crl_der)));
//!
//! let report = validator
//!     .validate_der(
//!         signer_der,
//!         chain_der,
//!         chrono::Utc::now(),
//!         &settings.trust_anchors()?,
//!         &settings.policy(),
//!     )
//!     .await;
//!
//! if report.status() != Status::Valid {
//!     for item in report.failures() {
//!         println!("{}: {}", item.certificate, item.message);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod certificate;
pub use certificate::{Certificate, CertificateError, CertificateNode, Fingerprint};

mod chain;

mod context;
pub use context::{CheckKind, ValidationContext};

pub mod crl;
pub use crl::{Crl, CrlError, RevocationReason};

mod error;
pub use error::{Error, Result};

pub mod ocsp;
pub use ocsp::{OcspError, OcspRequest, OcspResponse};

mod policy;
pub use policy::{
    OnlineFetching, PolicyOverrides, PolicyRule, RevocationFailureMode, RevocationSettings,
    ValidationPolicy,
};

mod revocation;

mod role;
pub use role::{CertificatePurpose, CertificateRole, RoleSet, RoleSetError};

pub mod settings;

mod source;
pub use source::{CertRef, CertificateSource, FetchError, IssuerRef, MemorySource};

mod trust_anchors;
pub use trust_anchors::TrustAnchorSet;

mod validator;
pub use validator::{SignatureRequest, SignatureValidator, ValidationRun};

mod verifier;
pub use verifier::{NativeSignatureVerifier, SignatureVerifier};

pub use sigtrust_status_tracker::{
    validation_codes, FailureKind, ReportItem, Status, ValidationReport,
};

#[cfg(test)]
pub(crate) mod tests;
