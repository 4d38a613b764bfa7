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

use super::fixtures::*;
use crate::{CertRef, CertificateSource, FetchError, IssuerRef, MemorySource};

#[tokio::test]
async fn resolve_issuer_by_name_and_key_id() {
    let pki = TestPki::new();
    let impostor = CertBuilder::new(7, INTERMEDIATE, &key(7))
        .issued_by(ROOT, &pki.root_key)
        .ca(None)
        .build();

    let store = MemorySource::new()
        .with_certificate(pki.intermediate.clone())
        .with_certificate(impostor)
        .with_certificate_der(&pki.root.der);

    let found = store.resolve_issuer(&pki.signer).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].fingerprint(), pki.intermediate.fingerprint());

    let found = store.resolve_issuer(&pki.intermediate).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].subject, format!("CN={ROOT}"));
}

#[tokio::test]
async fn newest_crl_wins() {
    let pki = TestPki::new();
    let older = pki
        .intermediate_crl()
        .updates(at(2025, 4, 1), Some(at(2025, 5, 1)))
        .build();
    let newer = pki.intermediate_crl().build();

    let store = MemorySource::new()
        .with_crl(newer.clone())
        .with_crl(older)
        .with_crl(pki.root_crl().build());

    let issuer = IssuerRef {
        issuer: &pki.intermediate,
        distribution_points: &pki.signer.crl_distribution_points,
    };

    let crl = store.fetch_crl(&issuer).await.unwrap();
    assert_eq!(crl.fingerprint(), newer.fingerprint());
}

#[tokio::test]
async fn missing_data_is_not_available() {
    let pki = TestPki::new();
    let store = MemorySource::new().with_crl(pki.root_crl().build());

    let issuer = IssuerRef {
        issuer: &pki.intermediate,
        distribution_points: &[],
    };
    let cert = CertRef {
        certificate: &pki.signer,
        issuer: &pki.intermediate,
    };

    assert_eq!(store.fetch_crl(&issuer).await.unwrap_err(), FetchError::NotAvailable);
    assert_eq!(store.fetch_ocsp(&cert).await.unwrap_err(), FetchError::NotAvailable);
}

#[tokio::test]
async fn malformed_data_is_reported() {
    let pki = TestPki::new();
    let store = MemorySource::new()
        .with_crl_der(b"not a crl")
        .with_ocsp_der(b"not an ocsp response")
        .with_certificate_der(b"not a certificate");

    assert_eq!(store.malformed_count(), 3);

    let issuer = IssuerRef {
        issuer: &pki.intermediate,
        distribution_points: &[],
    };
    let cert = CertRef {
        certificate: &pki.signer,
        issuer: &pki.intermediate,
    };

    assert!(matches!(
        store.fetch_crl(&issuer).await,
        Err(FetchError::Malformed(_))
    ));
    assert!(matches!(
        store.fetch_ocsp(&cert).await,
        Err(FetchError::Malformed(_))
    ));
}

#[tokio::test]
async fn ocsp_lookup_matches_cert_id() {
    let pki = TestPki::new();
    let response = OcspBuilder::new(INTERMEDIATE, &pki.intermediate_key)
        .status(&pki.signer, &pki.intermediate, TestStatus::Good)
        .build();
    let store = MemorySource::new().with_ocsp_der(&response.der);

    let signer = CertRef {
        certificate: &pki.signer,
        issuer: &pki.intermediate,
    };
    let intermediate = CertRef {
        certificate: &pki.intermediate,
        issuer: &pki.root,
    };

    assert_eq!(
        store.fetch_ocsp(&signer).await.unwrap().fingerprint(),
        response.fingerprint()
    );
    assert_eq!(
        store.fetch_ocsp(&intermediate).await.unwrap_err(),
        FetchError::NotAvailable
    );
}

#[test]
fn cert_ref_builds_request() {
    let pki = TestPki::new();
    let cert = CertRef {
        certificate: &pki.signer,
        issuer: &pki.intermediate,
    };

    assert_eq!(cert.responders().to_vec(), vec!["http://ocsp.example.com".to_string()]);
    assert!(cert.request().cert_id.matches(&pki.signer, &pki.intermediate));
}
