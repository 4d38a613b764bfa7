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

use crate::{ReportItem, Status, ValidationReport};

/// A `StatusTracker` accumulates [`ReportItem`]s while one certificate chain
/// is being validated.
///
/// Items can only be appended. A tracker is created fresh for each
/// validation and consumed by [`into_report`] once the validation
/// completes.
///
/// [`into_report`]: Self::into_report
#[derive(Debug, Default)]
pub struct StatusTracker {
    items: Vec<ReportItem>,
}

impl StatusTracker {
    /// Returns the items recorded so far, in the order they were added.
    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }

    /// Appends a [`ReportItem`].
    ///
    /// Primarily intended for use by [`ReportItem::success()`],
    /// [`ReportItem::indeterminate()`] and [`ReportItem::failure()`].
    pub fn add(&mut self, item: ReportItem) {
        self.items.push(item);
    }

    /// Appends copies of all items from another tracker.
    pub fn append(&mut self, other: &StatusTracker) {
        self.items.extend(other.items.iter().cloned());
    }

    /// Appends copies of the given items.
    pub fn extend<'a, I: IntoIterator<Item = &'a ReportItem>>(&mut self, items: I) {
        self.items.extend(items.into_iter().cloned());
    }

    /// Returns `true` if any item carries the given reason code.
    pub fn has_reason(&self, reason: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.reason.as_deref() == Some(reason))
    }

    /// Returns `true` if any item is [`Status::Invalid`].
    pub fn has_invalid(&self) -> bool {
        self.items.iter().any(|item| item.status == Status::Invalid)
    }

    /// Returns the items that are not [`Status::Valid`].
    pub fn failures(&self) -> impl Iterator<Item = &ReportItem> {
        self.items.iter().filter(|item| item.is_failure())
    }

    /// Returns the most severe status recorded so far, or `None` if nothing
    /// has been recorded.
    pub fn worst_status(&self) -> Option<Status> {
        self.items.iter().map(|item| item.status).max()
    }

    /// Finishes the run and produces an immutable [`ValidationReport`].
    pub fn into_report(self) -> ValidationReport {
        ValidationReport::new(self.items)
    }
}
