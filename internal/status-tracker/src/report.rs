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

use std::fmt;

use serde::Serialize;

use crate::{FailureKind, ReportItem, Status};

/// The result of validating one certificate chain.
///
/// Items appear in the order the checks were performed, leaf first. The
/// overall [`status`] is the most severe item status. A report without any
/// items is [`Status::Indeterminate`] because nothing was established.
///
/// [`status`]: Self::status
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationReport {
    status: Status,
    items: Vec<ReportItem>,
}

impl ValidationReport {
    pub(crate) fn new(items: Vec<ReportItem>) -> Self {
        let status = items
            .iter()
            .map(|item| item.status)
            .max()
            .unwrap_or(Status::Indeterminate);

        Self { status, items }
    }

    /// Overall status of the run.
    pub fn status(&self) -> Status {
        self.status
    }

    /// All items, in the order they were recorded.
    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }

    /// Items that describe the given certificate reference.
    pub fn items_for(&self, certificate: &str) -> impl Iterator<Item = &ReportItem> {
        let certificate = certificate.to_owned();
        self.items
            .iter()
            .filter(move |item| item.certificate == certificate)
    }

    /// Items that are not [`Status::Valid`].
    pub fn failures(&self) -> impl Iterator<Item = &ReportItem> {
        self.items.iter().filter(|item| item.is_failure())
    }

    /// Returns `true` if any item carries the given reason code.
    pub fn has_reason(&self, reason: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.reason.as_deref() == Some(reason))
    }

    /// Returns `true` if any item has the given failure kind.
    pub fn has_kind(&self, kind: FailureKind) -> bool {
        self.items.iter().any(|item| item.kind == Some(kind))
    }

    /// Returns the first item with [`Status::Invalid`], if any.
    pub fn first_invalid(&self) -> Option<&ReportItem> {
        self.items
            .iter()
            .find(|item| item.status == Status::Invalid)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status)?;

        for item in &self.items {
            write!(f, "  [{}] {}", item.status, item.certificate)?;
            if let Some(role) = &item.role {
                write!(f, " ({role})")?;
            }
            if let Some(reason) = &item.reason {
                write!(f, " {reason}")?;
            }
            writeln!(f, ": {}", item.message)?;
        }

        Ok(())
    }
}
