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

use std::borrow::Cow;

use serde::Serialize;

use crate::{FailureKind, Status, StatusTracker};

/// Outcome of one check against one certificate.
///
/// Use the [`report_item`](crate::report_item) macro to create a `ReportItem`,
/// then finish it with [`success`], [`indeterminate`] or [`failure`], which
/// set the status and append the item to a [`StatusTracker`].
///
/// [`success`]: Self::success
/// [`indeterminate`]: Self::indeterminate
/// [`failure`]: Self::failure
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ReportItem {
    /// Reference to the certificate this item describes (subject and serial
    /// number).
    pub certificate: Cow<'static, str>,

    /// Role the certificate was exercised in, if known.
    pub role: Option<Cow<'static, str>>,

    /// Status of this check.
    pub status: Status,

    /// Classification of the failure, if any.
    pub kind: Option<FailureKind>,

    /// Reason code (see [`validation_codes`](crate::validation_codes)).
    pub reason: Option<Cow<'static, str>>,

    /// Human-readable description.
    pub message: Cow<'static, str>,

    /// Source file where the condition was detected.
    pub file: Cow<'static, str>,

    /// Function where the condition was detected.
    pub function: Cow<'static, str>,

    /// Source line number where the condition was detected.
    pub line: u32,
}

impl ReportItem {
    /// Creates a `ReportItem` with an explicit source location.
    ///
    /// Prefer the [`report_item`](crate::report_item) macro, which captures
    /// the location automatically.
    pub fn new<C, M, F>(
        certificate: C,
        message: M,
        function: F,
        file: &'static str,
        line: u32,
    ) -> Self
    where
        C: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
    {
        Self {
            certificate: certificate.into(),
            role: None,
            status: Status::Valid,
            kind: None,
            reason: None,
            message: message.into(),
            file: file.into(),
            function: function.into(),
            line,
        }
    }

    /// Records the role the certificate was exercised in.
    pub fn role<R: Into<Cow<'static, str>>>(self, role: R) -> Self {
        ReportItem {
            role: Some(role.into()),
            ..self
        }
    }

    /// Adds a reason code.
    ///
    /// ## Example
    ///
    /// ```
    /// # use sigtrust_status_tracker::{report_item, validation_codes, Status};
    /// let item = report_item!("CN=leaf", "chain checked", "test func")
    ///     .reason(validation_codes::CERTIFICATE_VALIDATED);
    ///
    /// assert_eq!(item.reason.as_deref(), Some("certificate.validated"));
    /// assert_eq!(item.status, Status::Valid);
    /// ```
    pub fn reason(self, reason: &'static str) -> Self {
        ReportItem {
            reason: Some(reason.into()),
            ..self
        }
    }

    /// Marks the item as [`Status::Valid`] and appends it to `tracker`.
    pub fn success(self, tracker: &mut StatusTracker) {
        tracker.add(ReportItem {
            status: Status::Valid,
            kind: None,
            ..self
        });
    }

    /// Marks the item as [`Status::Indeterminate`] and appends it to
    /// `tracker`.
    pub fn indeterminate(self, tracker: &mut StatusTracker) {
        tracker.add(ReportItem {
            status: Status::Indeterminate,
            kind: Some(FailureKind::Indeterminate),
            ..self
        });
    }

    /// Marks the item as a failure of the given kind and appends it to
    /// `tracker`.
    ///
    /// A failure of kind [`FailureKind::Indeterminate`] is recorded as
    /// [`Status::Indeterminate`]; every other kind is [`Status::Invalid`].
    pub fn failure(self, tracker: &mut StatusTracker, kind: FailureKind) {
        let status = if kind.is_fatal() {
            Status::Invalid
        } else {
            Status::Indeterminate
        };

        tracker.add(ReportItem {
            status,
            kind: Some(kind),
            ..self
        });
    }

    /// Returns `true` if this item is not [`Status::Valid`].
    pub fn is_failure(&self) -> bool {
        self.status != Status::Valid
    }
}

/// Creates a [`ReportItem`] that is annotated with the source file and line
/// number where the condition was discovered.
///
/// Takes three parameters, each of which may be a `'static str` or `String`:
///
/// * `certificate`: reference to the certificate the item describes
/// * `message`: human-readable reason for this item to have been generated
/// * `function`: name of the function generating this item
///
/// ## Example
///
/// ```
/// # use std::borrow::Cow;
/// # use sigtrust_status_tracker::{report_item, ReportItem, Status};
/// let item = report_item!("CN=leaf", "certificate expired", "test func");
///
/// assert_eq!(
///     item,
///     ReportItem {
///         certificate: Cow::Borrowed("CN=leaf"),
///         role: None,
///         status: Status::Valid,
///         kind: None,
///         reason: None,
///         message: Cow::Borrowed("certificate expired"),
///         file: Cow::Borrowed(file!()),
///         function: Cow::Borrowed("test func"),
///         line: item.line,
///     }
/// );
/// ```
#[macro_export]
macro_rules! report_item {
    ($certificate:expr, $message:expr, $function:expr) => {{
        $crate::ReportItem::new($certificate, $message, $function, file!(), line!())
    }};
}
