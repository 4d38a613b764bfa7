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

use std::collections::HashMap;

use super::fixtures::{reference_time, TestPki};
use crate::{CertificateNode, CertificateRole, CheckKind, RoleSet, ValidationContext};

#[test]
fn equal_contexts_are_interchangeable_keys() {
    let t = reference_time();
    let a = ValidationContext::new(
        RoleSet::of(CertificateRole::Signer, [CertificateRole::CrlIssuer]),
        CheckKind::Chain,
        t,
    );
    let b = ValidationContext::new(
        RoleSet::of(CertificateRole::CrlIssuer, [CertificateRole::Signer]),
        CheckKind::Chain,
        t,
    );

    assert_eq!(a, b);

    let mut cache = HashMap::new();
    cache.insert(a, "first");
    assert_eq!(cache.insert(b, "second"), Some("first"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn contexts_differ_by_kind_and_time() {
    let t = reference_time();
    let roles = RoleSet::single(CertificateRole::ChainIssuer);

    let chain = ValidationContext::new(roles, CheckKind::Chain, t);

    assert_ne!(chain, ValidationContext::new(roles, CheckKind::Timestamp, t));
    assert_ne!(
        chain,
        ValidationContext::new(roles, CheckKind::Chain, t + chrono::Duration::seconds(1))
    );
}

#[test]
fn derive_from_node() {
    let pki = TestPki::new();
    let node = CertificateNode {
        certificate: pki.intermediate.clone(),
        role: CertificateRole::ChainIssuer,
        position: 1,
    };

    let ctx = ValidationContext::derive(&node, CheckKind::Chain, reference_time());

    assert_eq!(ctx.roles(), RoleSet::single(CertificateRole::ChainIssuer));
    assert_eq!(ctx.check_kind(), CheckKind::Chain);
    assert_eq!(ctx.reference_time(), reference_time());
}
