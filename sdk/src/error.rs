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

use thiserror::Error;

use crate::{
    certificate::CertificateError, crl::CrlError, ocsp::OcspError, role::RoleSetError,
    CertificateRole,
};

/// `Error` enumerates the configuration errors returned by this crate.
///
/// Problems with the certificates being validated are never returned as
/// errors. They are recorded in the [`ValidationReport`] instead.
///
/// [`ValidationReport`]: crate::ValidationReport
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A role set could not be constructed.
    #[error(transparent)]
    RoleSet(#[from] RoleSetError),

    /// A certificate could not be parsed.
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// A CRL could not be parsed.
    #[error(transparent)]
    Crl(#[from] CrlError),

    /// An OCSP response could not be parsed.
    #[error(transparent)]
    Ocsp(#[from] OcspError),

    /// The role cannot be used as the starting point of a validation.
    #[error("a chain cannot be validated for the {0} role")]
    UnsupportedRole(CertificateRole),

    /// The trust anchor bundle could not be read.
    #[error("invalid trust anchors: {0}")]
    InvalidTrustAnchors(String),

    #[error("bad parameter: {0}")]
    BadParam(String),

    /// The settings format is not JSON or TOML.
    #[error("type is unsupported")]
    UnsupportedType,

    #[error("version incompatible: {0}")]
    VersionCompatibility(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    TomlSerializationError(#[from] toml::ser::Error),

    #[error(transparent)]
    OtherError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// A specialized `Result` type for sigtrust operations.
pub type Result<T> = std::result::Result<T, Error>;
