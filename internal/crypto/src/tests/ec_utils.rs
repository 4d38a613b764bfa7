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

use crate::ec_utils::{der_to_p1363, EcdsaCurve};

#[test]
fn der_to_p1363_pads_short_components() {
    // SEQUENCE { INTEGER 1, INTEGER 0x00ff (leading zero for the sign bit) }
    let der = [0x30, 0x07, 0x02, 0x01, 0x01, 0x02, 0x02, 0x00, 0xff];

    let p1363 = der_to_p1363(&der, EcdsaCurve::P256).unwrap();

    assert_eq!(p1363.len(), 64);
    assert_eq!(p1363[31], 0x01);
    assert!(p1363[..31].iter().all(|b| *b == 0));
    assert_eq!(p1363[63], 0xff);
    assert!(p1363[32..63].iter().all(|b| *b == 0));
}

#[test]
fn der_to_p1363_rejects_garbage() {
    assert!(der_to_p1363(&[1, 2, 3], EcdsaCurve::P384).is_err());
}

#[test]
fn der_to_p1363_rejects_oversized_component() {
    let mut der = vec![0x30, 0x26, 0x02, 0x21];
    der.extend([0x7f; 33]);
    der.extend([0x02, 0x01, 0x01]);

    assert!(der_to_p1363(&der, EcdsaCurve::P256).is_err());
}
