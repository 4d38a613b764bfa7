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

//! Settings loaded from TOML or JSON that produce a [`ValidationPolicy`] and a
//! [`TrustAnchorSet`].

#[cfg(feature = "file_io")]
use std::path::Path;
use std::{sync::Arc, time::Duration as StdDuration};

use chrono::Duration;
use config::{Config, FileFormat};
use serde::{Deserialize, Serialize};

use crate::{
    certificate::Certificate,
    policy::{OnlineFetching, RevocationFailureMode, ValidationPolicy},
    trust_anchors::TrustAnchorSet,
    Error, Result,
};

const VERSION: u32 = 1;

const MAX_CLOCK_SKEW_SECS: u64 = 365 * 24 * 60 * 60;
const MAX_FRESHNESS_SECS: u64 = 100 * 365 * 24 * 60 * 60;

// trait used to validate user input to make sure user supplied configurations are valid
pub(crate) trait SettingsValidate {
    // returns error if settings are invalid
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Settings to configure the trust anchors.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Trust {
    /// Default trust anchor root certificates as a PEM bundle.
    pub trust_anchors: Option<String>,

    /// Additional user-provided trust anchor root certificates as a PEM
    /// bundle.
    pub user_anchors: Option<String>,
}

impl Trust {
    // load PEMs
    fn load_trust_from_data(&self, trust_data: &[u8]) -> Result<Vec<Arc<Certificate>>> {
        let mut certs = Vec::new();

        // allow for JSON-encoded PEMs with \n
        let trust_data = String::from_utf8_lossy(trust_data)
            .replace("\\n", "\n")
            .into_bytes();
        for pem_result in x509_parser::pem::Pem::iter_from_buffer(&trust_data) {
            let pem = pem_result.map_err(|e| Error::InvalidTrustAnchors(e.to_string()))?;
            let cert = Certificate::from_der(&pem.contents)
                .map_err(|e| Error::InvalidTrustAnchors(e.to_string()))?;
            certs.push(Arc::new(cert));
        }

        if certs.is_empty() {
            return Err(Error::InvalidTrustAnchors(
                "no certificates found in PEM bundle".into(),
            ));
        }

        Ok(certs)
    }

    /// Builds the anchor set from both bundles.
    pub fn anchors(&self) -> Result<TrustAnchorSet> {
        let mut anchors = Vec::new();

        for bundle in [&self.trust_anchors, &self.user_anchors].into_iter().flatten() {
            anchors.extend(self.load_trust_from_data(bundle.as_bytes())?);
        }

        Ok(TrustAnchorSet::new(anchors))
    }
}

impl SettingsValidate for Trust {
    fn validate(&self) -> Result<()> {
        if let Some(ta) = &self.trust_anchors {
            self.load_trust_from_data(ta.as_bytes())?;
        }

        if let Some(ua) = &self.user_anchors {
            self.load_trust_from_data(ua.as_bytes())?;
        }

        Ok(())
    }
}

/// Settings to configure path building.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Maximum number of certificates in a path, leaf and anchor included.
    ///
    /// The default value is 10.
    pub max_chain_depth: usize,

    /// Tolerance in seconds applied to every time comparison.
    ///
    /// The default value is 0.
    pub allowed_clock_skew_secs: u64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            max_chain_depth: 10,
            allowed_clock_skew_secs: 0,
        }
    }
}

impl SettingsValidate for ChainSettings {
    fn validate(&self) -> Result<()> {
        if self.max_chain_depth == 0 {
            return Err(Error::BadParam("chain.max_chain_depth must be at least 1".into()));
        }

        if self.allowed_clock_skew_secs > MAX_CLOCK_SKEW_SECS {
            return Err(Error::BadParam(format!(
                "chain.allowed_clock_skew_secs must not exceed {MAX_CLOCK_SKEW_SECS}"
            )));
        }

        Ok(())
    }
}

/// Settings to configure revocation checking.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct RevocationConfig {
    /// How unknown revocation status is reported.
    ///
    /// The default value is `soft`.
    pub failure_mode: RevocationFailureMode,

    /// When the online source is consulted.
    ///
    /// The default value is `fetch_if_no_other_data_available`.
    pub online_fetching: OnlineFetching,

    /// Whether CRLs are consulted.
    pub check_crl: bool,

    /// Whether OCSP responses are consulted.
    pub check_ocsp: bool,

    /// Limit on each individual fetch, in milliseconds.
    ///
    /// The default value is 10000.
    pub fetch_timeout_ms: u64,

    /// Limit on fetches in flight at the same time within one run.
    ///
    /// The default value is 4.
    pub max_concurrent_fetches: usize,

    /// Validity in seconds assumed for revocation data without `nextUpdate`.
    ///
    /// The default value is 30 days.
    pub freshness_secs: u64,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            failure_mode: RevocationFailureMode::Soft,
            online_fetching: OnlineFetching::FetchIfNoOtherDataAvailable,
            check_crl: true,
            check_ocsp: true,
            fetch_timeout_ms: 10_000,
            max_concurrent_fetches: 4,
            freshness_secs: 30 * 24 * 60 * 60,
        }
    }
}

impl SettingsValidate for RevocationConfig {
    fn validate(&self) -> Result<()> {
        if self.fetch_timeout_ms == 0 {
            return Err(Error::BadParam(
                "revocation.fetch_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.max_concurrent_fetches == 0 {
            return Err(Error::BadParam(
                "revocation.max_concurrent_fetches must be at least 1".into(),
            ));
        }

        if self.freshness_secs > MAX_FRESHNESS_SECS {
            return Err(Error::BadParam(format!(
                "revocation.freshness_secs must not exceed {MAX_FRESHNESS_SECS}"
            )));
        }

        Ok(())
    }
}

/// Settings for configuring all aspects of sigtrust.
///
/// Use [`Settings::policy`] and [`Settings::trust_anchors`] to obtain the
/// inputs of [`SignatureValidator::validate`].
///
/// [`SignatureValidator::validate`]: crate::SignatureValidator::validate
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Version of the configuration.
    pub version: u32,

    /// Settings for configuring the trust anchors.
    pub trust: Trust,

    /// Settings for configuring path building.
    pub chain: ChainSettings,

    /// Settings for configuring revocation checking.
    pub revocation: RevocationConfig,
}

impl Settings {
    /// Creates default settings.
    ///
    /// This is the starting point for the builder pattern. Use with
    /// `.with_json()`, `.with_toml()`, or `.with_value()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sigtrust::settings::Settings;
    /// # fn main() -> sigtrust::Result<()> {
    /// let settings = Settings::new().with_json(r#"{"chain": {"max_chain_depth": 5}}"#)?;
    /// assert_eq!(settings.policy().max_chain_depth, 5);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays a JSON configuration on top of these settings.
    pub fn with_json(self, json: &str) -> Result<Self> {
        self.with_string(json, "json")
    }

    /// Overlays a TOML configuration on top of these settings.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sigtrust::settings::Settings;
    /// # use sigtrust::RevocationFailureMode;
    /// # fn main() -> sigtrust::Result<()> {
    /// let settings = Settings::new().with_toml(
    ///     r#"
    ///         [revocation]
    ///         failure_mode = "hard"
    ///     "#,
    /// )?;
    /// assert_eq!(
    ///     settings.policy().revocation_failure_mode,
    ///     RevocationFailureMode::Hard
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_toml(self, toml: &str) -> Result<Self> {
        self.with_string(toml, "toml")
    }

    /// Overlays a settings file. The format (JSON or TOML) is inferred from
    /// the file extension.
    #[cfg(feature = "file_io")]
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .ok_or(Error::BadParam(
                "settings file must have json or toml extension".into(),
            ))?
            .to_str()
            .ok_or(Error::BadParam("invalid settings file name".into()))?;
        let setting_buf = std::fs::read(path).map_err(Error::IoError)?;
        self.with_string(&String::from_utf8_lossy(&setting_buf), ext)
    }

    fn with_string(self, settings_str: &str, format: &str) -> Result<Self> {
        let f = match format.to_lowercase().as_str() {
            "json" => FileFormat::Json,
            "toml" => FileFormat::Toml,
            _ => return Err(Error::UnsupportedType),
        };

        let current_config = Config::try_from(&self).map_err(|e| Error::OtherError(Box::new(e)))?;

        let updated_config = Config::builder()
            .add_source(current_config)
            .add_source(config::File::from_str(settings_str, f))
            .build()
            .map_err(|_e| Error::BadParam("could not parse configuration".into()))?;

        let settings = updated_config
            .try_deserialize::<Settings>()
            .map_err(|e| Error::BadParam(e.to_string()))?;

        settings.validate()?;

        Ok(settings)
    }

    /// Sets a value at a dot-separated path, such as
    /// `"revocation.check_ocsp"`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sigtrust::settings::Settings;
    /// # fn main() -> sigtrust::Result<()> {
    /// let settings = Settings::default()
    ///     .with_value("revocation.check_ocsp", false)?
    ///     .with_value("chain.allowed_clock_skew_secs", 30)?;
    /// assert!(!settings.policy().check_ocsp);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_value<T: Into<config::Value>>(self, path: &str, value: T) -> Result<Self> {
        let config = Config::try_from(&self).map_err(|e| Error::OtherError(Box::new(e)))?;

        let updated_config = Config::builder()
            .add_source(config)
            .set_override(path, value)
            .map_err(|e| Error::BadParam(format!("Invalid path '{path}': {e}")))?
            .build()
            .map_err(|e| Error::OtherError(Box::new(e)))?;

        let updated_settings = updated_config
            .try_deserialize::<Settings>()
            .map_err(|e| Error::BadParam(format!("Invalid value for '{path}': {e}")))?;

        updated_settings.validate()?;

        Ok(updated_settings)
    }

    /// Gets the value at a dot-separated path.
    pub fn get_value<'de, T: serde::de::Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let config = Config::try_from(self).map_err(|e| Error::OtherError(Box::new(e)))?;

        config
            .get::<T>(path)
            .map_err(|e| Error::BadParam(format!("Failed to get value at '{path}': {e}")))
    }

    /// Serializes the settings into a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Serializes the settings into a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::OtherError(Box::new(e)))
    }

    /// The validation policy described by these settings.
    pub fn policy(&self) -> ValidationPolicy {
        let freshness = i64::try_from(self.revocation.freshness_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| ValidationPolicy::default().freshness);

        let skew = i64::try_from(self.chain.allowed_clock_skew_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(Duration::zero);

        ValidationPolicy::default()
            .with_revocation_failure_mode(self.revocation.failure_mode)
            .with_max_chain_depth(self.chain.max_chain_depth)
            .with_allowed_clock_skew(skew)
            .with_online_fetching(self.revocation.online_fetching)
            .with_crl_checks(self.revocation.check_crl)
            .with_ocsp_checks(self.revocation.check_ocsp)
            .with_fetch_timeout(StdDuration::from_millis(self.revocation.fetch_timeout_ms))
            .with_max_concurrent_fetches(self.revocation.max_concurrent_fetches)
            .with_freshness(freshness)
    }

    /// The trust anchors described by these settings.
    pub fn trust_anchors(&self) -> Result<TrustAnchorSet> {
        self.trust.anchors()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: VERSION,
            trust: Default::default(),
            chain: Default::default(),
            revocation: Default::default(),
        }
    }
}

impl SettingsValidate for Settings {
    fn validate(&self) -> Result<()> {
        if self.version > VERSION {
            return Err(Error::VersionCompatibility(
                "settings version too new".into(),
            ));
        }
        self.trust.validate()?;
        self.chain.validate()?;
        self.revocation.validate()
    }
}

#[cfg(test)]
pub mod tests {
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tests::fixtures::{to_pem, TestPki};

    #[test]
    fn test_get_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.version, VERSION);
        assert_eq!(settings.trust, Trust::default());
        assert_eq!(settings.chain, ChainSettings::default());
        assert_eq!(settings.revocation, RevocationConfig::default());

        assert_eq!(settings.policy(), ValidationPolicy::default());
    }

    #[test]
    fn test_toml_overlay() {
        let settings = Settings::new()
            .with_toml(
                r#"
                    [chain]
                    max_chain_depth = 4
                    allowed_clock_skew_secs = 60

                    [revocation]
                    failure_mode = "hard"
                    online_fetching = "never_fetch"
                    fetch_timeout_ms = 2500
                "#,
            )
            .unwrap();

        let policy = settings.policy();
        assert_eq!(policy.max_chain_depth, 4);
        assert_eq!(policy.allowed_clock_skew, Duration::seconds(60));
        assert_eq!(policy.revocation_failure_mode, RevocationFailureMode::Hard);
        assert_eq!(policy.online_fetching, OnlineFetching::NeverFetch);
        assert_eq!(policy.fetch_timeout, StdDuration::from_millis(2500));

        // untouched values keep their defaults
        assert!(policy.check_crl);
        assert_eq!(policy.max_concurrent_fetches, 4);
    }

    #[test]
    fn test_json_overlay_keeps_earlier_values() {
        let settings = Settings::new()
            .with_json(r#"{"revocation": {"check_ocsp": false}}"#)
            .unwrap()
            .with_json(r#"{"revocation": {"max_concurrent_fetches": 8}}"#)
            .unwrap();

        assert!(!settings.revocation.check_ocsp);
        assert_eq!(settings.revocation.max_concurrent_fetches, 8);
    }

    #[test]
    fn test_set_and_get_value() {
        let settings = Settings::new()
            .with_value("revocation.check_crl", false)
            .unwrap()
            .with_value("revocation.freshness_secs", 3600)
            .unwrap();

        assert!(!settings.get_value::<bool>("revocation.check_crl").unwrap());
        assert_eq!(settings.get_value::<u64>("revocation.freshness_secs").unwrap(), 3600);
        assert_eq!(settings.policy().freshness, Duration::hours(1));

        assert!(settings.get_value::<bool>("revocation.no_such_key").is_err());
    }

    #[test]
    fn test_bad_values() {
        assert!(matches!(
            Settings::new().with_value("chain.max_chain_depth", 0),
            Err(Error::BadParam(_))
        ));
        assert!(matches!(
            Settings::new().with_json(r#"{"revocation": {"fetch_timeout_ms": 0}}"#),
            Err(Error::BadParam(_))
        ));
        assert!(matches!(
            Settings::new().with_toml("[revocation]\nfailure_mode = \"sometimes\"\n"),
            Err(Error::BadParam(_))
        ));
        assert!(matches!(
            Settings::new().with_json("{not json"),
            Err(Error::BadParam(_))
        ));
    }

    #[test]
    fn test_out_of_range_durations() {
        assert!(matches!(
            Settings::new().with_toml("[chain]\nallowed_clock_skew_secs = 10000000000000\n"),
            Err(Error::BadParam(_))
        ));
        assert!(matches!(
            Settings::new().with_value("revocation.freshness_secs", 9_000_000_000_000_i64),
            Err(Error::BadParam(_))
        ));

        let settings = Settings::new()
            .with_value("chain.allowed_clock_skew_secs", 31_536_000_i64)
            .unwrap();
        assert_eq!(settings.policy().allowed_clock_skew, Duration::days(365));
    }

    #[test]
    fn test_version_too_new() {
        assert!(matches!(
            Settings::new().with_json(r#"{"version": 2}"#),
            Err(Error::VersionCompatibility(_))
        ));
    }

    #[test]
    fn test_trust_anchors_from_pem() {
        let pki = TestPki::new();
        let settings = Settings::new()
            .with_value("trust.trust_anchors", to_pem(&[pki.root.der.clone()]))
            .unwrap()
            .with_value("trust.user_anchors", to_pem(&[pki.intermediate.der.clone()]))
            .unwrap();

        let anchors = settings.trust_anchors().unwrap();
        assert_eq!(anchors.len(), 2);
        assert!(anchors.contains(&pki.root));
        assert!(anchors.contains(&pki.intermediate));
    }

    #[test]
    fn test_json_escaped_pem() {
        let pki = TestPki::new();
        let escaped = to_pem(&[pki.root.der.clone()]).replace('\n', "\\n");

        let anchors = Trust {
            trust_anchors: Some(escaped),
            user_anchors: None,
        }
        .anchors()
        .unwrap();

        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn test_invalid_trust_anchors() {
        let result = Settings::new().with_value("trust.trust_anchors", "not a pem bundle");

        assert!(matches!(result, Err(Error::InvalidTrustAnchors(_))));
        assert!(Settings::new().trust_anchors().unwrap().is_empty());
    }

    #[test]
    fn test_serialize_round_trip() {
        let settings = Settings::new()
            .with_value("revocation.failure_mode", "hard")
            .unwrap();

        let toml = settings.to_toml().unwrap();
        assert!(toml.contains("failure_mode = \"hard\""));
        assert_eq!(Settings::new().with_toml(&toml).unwrap(), settings);

        let json = settings.to_json().unwrap();
        assert_eq!(Settings::new().with_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_unsupported_type() {
        assert!(matches!(
            Settings::new().with_string("", "yaml"),
            Err(Error::UnsupportedType)
        ));
    }

    #[cfg(feature = "file_io")]
    #[test]
    fn test_with_file() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("sigtrust.toml");
        std::fs::write(&path, "[chain]\nmax_chain_depth = 3\n").unwrap();
        let settings = Settings::new().with_file(&path).unwrap();
        assert_eq!(settings.chain.max_chain_depth, 3);

        let path = dir.path().join("sigtrust.json");
        std::fs::write(&path, r#"{"revocation": {"check_crl": false}}"#).unwrap();
        let settings = settings.with_file(&path).unwrap();
        assert_eq!(settings.chain.max_chain_depth, 3);
        assert!(!settings.revocation.check_crl);

        assert!(matches!(
            Settings::new().with_file(dir.path().join("no_extension")),
            Err(Error::BadParam(_))
        ));
        assert!(matches!(
            Settings::new().with_file(dir.path().join("missing.toml")),
            Err(Error::IoError(_))
        ));
    }
}
