/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use predicates::prelude::*;
use rankgraph_algo::rank::Distance;
use rankgraph_algo::rank::preds::*;

fn params(iteration: usize, squared: f64) -> PredParams {
    PredParams {
        iteration,
        distance: Distance::from_squared(squared),
    }
}

#[test]
fn test_max_iter() {
    let pred = MaxIter::from(10);
    assert!(!pred.eval(&params(9, 1.0)));
    assert!(pred.eval(&params(10, 1.0)));
    assert!(pred.eval(&params(15, 1.0)));
    assert!(!MaxIter::default().eval(&params(1_000_000, 1.0)));
}

#[test]
fn test_l2_norm() {
    let pred = L2Norm::try_from(1E-3).unwrap();
    assert!(!pred.eval(&params(1, 4E-6)));
    assert!(pred.eval(&params(1, 2.5E-7)));
    assert!(pred.eval(&params(1, 0.0)));
}

#[test]
fn test_squared_l2_norm() {
    let pred = SquaredL2Norm::default();
    assert!(!pred.eval(&params(1, 3E-5)));
    assert!(pred.eval(&params(1, 2.5E-5)));
    assert!(pred.eval(&params(1, 1E-5)));
}

#[test]
fn test_defaults() {
    let pred = L2Norm::try_from(None).unwrap();
    assert!(pred.eval(&params(1, 1E-11)));
    assert!(!pred.eval(&params(1, 1E-9)));
    let pred = SquaredL2Norm::try_from(None).unwrap();
    assert!(pred.eval(&params(1, SquaredL2Norm::DEFAULT_THRESHOLD)));
}

#[test]
fn test_invalid_thresholds() {
    assert!(L2Norm::try_from(0.0).is_err());
    assert!(L2Norm::try_from(-1.0).is_err());
    assert!(L2Norm::try_from(f64::NAN).is_err());
    assert!(SquaredL2Norm::try_from(0.0).is_err());
    assert!(SquaredL2Norm::try_from(f64::NAN).is_err());
}

#[test]
fn test_combined() {
    let pred = L2Norm::try_from(1E-6)
        .unwrap()
        .boxed()
        .or(MaxIter::from(5))
        .boxed();
    assert!(!pred.eval(&params(1, 1.0)));
    assert!(pred.eval(&params(5, 1.0)));
    assert!(pred.eval(&params(1, 1E-14)));
}

#[test]
fn test_display() {
    assert_eq!(MaxIter::from(7).to_string(), "(max iter: 7)");
    assert_eq!(L2Norm::default().to_string(), "(L2 distance: 0.00001)");
    assert_eq!(
        SquaredL2Norm::default().to_string(),
        "(squared L2 distance: 0.000025)"
    );
}
