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

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::OnceCell;

use crate::{
    certificate::Fingerprint,
    crl::Crl,
    ocsp::OcspResponse,
    revocation::{ArtifactTrust, FetchFailure, RevocationOutcome},
    ValidationContext,
};

/// At-most-once memoization of async computations.
///
/// Concurrent requests for the same key wait for the computation already in
/// flight. A value is only published once its computation completes; if the
/// computing future is dropped the cell stays empty and the next request
/// computes it again.
pub(crate) struct MemoTable<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K, V> Default for MemoTable<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V> MemoTable<K, V> {
    pub(crate) async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            cells.entry(key).or_default().clone()
        };

        if cell.initialized() {
            log::debug!("run cache hit");
        }

        cell.get_or_init(|| async { Arc::new(compute().await) })
            .await
            .clone()
    }

    /// Number of completed entries.
    #[cfg(test)]
    pub(crate) fn completed(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}

/// Which of the run's sources a fetch went to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum SourceSlot {
    Document,
    Online,
}

type FetchKey = (Fingerprint, SourceSlot, ValidationContext);

/// Memoized results shared by every chain validated in one run.
#[derive(Default)]
pub(crate) struct RunCache {
    /// Revocation outcome per (certificate, context).
    pub(crate) outcomes: MemoTable<(Fingerprint, ValidationContext), RevocationOutcome>,

    /// CRL fetched per (CRL issuer, source, context).
    pub(crate) crl_fetches: MemoTable<FetchKey, Result<Arc<Crl>, FetchFailure>>,

    /// OCSP response fetched per (certificate, source, context).
    pub(crate) ocsp_fetches: MemoTable<FetchKey, Result<Arc<OcspResponse>, FetchFailure>>,

    /// Signature and issuer-chain result per (CRL issuer, CRL, context).
    pub(crate) crl_checks:
        MemoTable<(Fingerprint, Fingerprint, ValidationContext), ArtifactTrust>,

    /// Authorization and chain result per (OCSP responder, certificate
    /// issuer, context).
    pub(crate) responder_checks:
        MemoTable<(Fingerprint, Fingerprint, ValidationContext), ArtifactTrust>,
}
