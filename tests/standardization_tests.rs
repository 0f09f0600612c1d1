use approx::assert_relative_eq;
use nalgebra::{
    DMatrix,
    DVector
};
use sigdecomp::math::standardization::constrainedstandardizer::standardize_and_gain;
use sigdecomp::math::strategy::Strategy;
use sigdecomp::verification::strategyequivalence::StrategyEquivalence;

// 固定的 uniform(0, 1) 樣本
const UNIFORM_SAMPLES: [f64; 20] = [
    0.5488135, 0.71518937, 0.60276338, 0.54488318, 0.4236548,
    0.64589411, 0.43758721, 0.891773, 0.96366276, 0.38344152,
    0.79172504, 0.52889492, 0.56804456, 0.92559664, 0.07103606,
    0.0871293, 0.0202184, 0.83261985, 0.77815675, 0.87001215,
];

fn assert_strategies_agree(a: &DVector<f64>) {
    let (b_old, g_old) = standardize_and_gain(a, Strategy::Old, true).unwrap().into_parts();
    let (b_new, g_new) = standardize_and_gain(a, Strategy::New, true).unwrap().into_parts();
    assert_eq!(b_old, b_new);
    assert_eq!(g_old, g_new);
}

#[test]
fn single_one_agrees() {
    assert_strategies_agree(&DVector::from_element(1, 1.0));
}

#[test]
fn eleven_uniform_samples_agree() {
    assert_strategies_agree(&DVector::from_row_slice(&UNIFORM_SAMPLES[..11]));
}

#[test]
fn eleven_zeros_agree() {
    assert_strategies_agree(&DVector::zeros(11));
}

#[test]
fn twenty_uniform_samples_agree() {
    assert_strategies_agree(&DVector::from_row_slice(&UNIFORM_SAMPLES));
}

#[test]
fn constant_and_signed_vectors_agree() {
    assert_strategies_agree(&DVector::from_element(7, 1.0));
    assert_strategies_agree(&DVector::from_element(3, -2.5));
    assert_strategies_agree(&DVector::from_vec(vec![0.0, -0.0, 3.0, -4.0]));
}

#[test]
fn single_zero_returns_zero_b_and_gain() {
    let a = DVector::from_vec(vec![0.0]);
    for strategy in Strategy::ALL {
        let (b, gain) = standardize_and_gain(&a, strategy, true).unwrap().into_parts();
        assert_eq!(b, DVector::from_vec(vec![0.0]));
        assert_eq!(gain, DMatrix::from_element(1, 1, 0.0));
    }
}

#[test]
fn zero_vectors_stay_finite_for_every_length() {
    for p in 1..32 {
        let a = DVector::zeros(p);
        for strategy in Strategy::ALL {
            for test_mode in [false, true] {
                let s = standardize_and_gain(&a, strategy, test_mode).unwrap();
                assert!(s.is_degenerate());
                assert!(s.b().iter().all(|v| *v == 0.0));
                let gain = s.gain();
                assert_eq!(gain.shape(), (p, p));
                assert!(gain.iter().all(|v| v.is_finite() && *v == 0.0));
                let applied = s.apply_gain(&DVector::from_element(p, 1.0)).unwrap();
                assert!(applied.iter().all(|v| *v == 0.0));
            }
        }
    }
}

#[test]
fn standardized_vector_has_unit_energy_and_gain_annihilates_it() {
    let a = DVector::from_row_slice(&UNIFORM_SAMPLES);
    let s = standardize_and_gain(&a, Strategy::New, true).unwrap();
    assert_relative_eq!(s.b().norm(), 1.0, epsilon = 1e-14);
    assert_relative_eq!(s.norm(), a.norm(), epsilon = 1e-12);

    let annihilated = s.gain() * s.b();
    assert!(annihilated.iter().all(|v| v.abs() < 1e-14));

    // G 為對稱矩陣
    let gain = s.gain();
    assert_relative_eq!(gain.clone(), gain.transpose(), epsilon = 0.0);
}

#[test]
fn gain_matches_finite_difference_jacobian() {
    let a = DVector::from_row_slice(&UNIFORM_SAMPLES[..6]);
    let gain = standardize_and_gain(&a, Strategy::Old, true).unwrap().gain();
    let h = 1e-7;
    for j in 0..a.len() {
        let mut plus = a.clone();
        let mut minus = a.clone();
        plus[j] += h;
        minus[j] -= h;
        let b_plus = standardize_and_gain(&plus, Strategy::Old, false).unwrap().b().clone();
        let b_minus = standardize_and_gain(&minus, Strategy::Old, false).unwrap().b().clone();
        let column = (b_plus - b_minus) / (2.0 * h);
        for i in 0..a.len() {
            assert_relative_eq!(gain[(i, j)], column[i], epsilon = 1e-6);
        }
    }
}

#[test]
fn apply_gain_matches_matrix_product() {
    let a = DVector::from_row_slice(&UNIFORM_SAMPLES[5..15]);
    let v = DVector::from_row_slice(&UNIFORM_SAMPLES[..10]);
    let compact = standardize_and_gain(&a, Strategy::New, false).unwrap();
    let expanded = standardize_and_gain(&a, Strategy::New, true).unwrap();
    let via_compact = compact.apply_gain(&v).unwrap();
    let via_matrix = expanded.apply_gain(&v).unwrap();
    assert_relative_eq!(via_compact, via_matrix, epsilon = 1e-12);
    assert_relative_eq!(via_matrix, compact.gain() * &v, epsilon = 1e-12);
}

#[test]
fn repeated_calls_are_bit_identical() {
    let a = DVector::from_row_slice(&UNIFORM_SAMPLES);
    for strategy in Strategy::ALL {
        let first = standardize_and_gain(&a, strategy, true).unwrap();
        let second = standardize_and_gain(&a, strategy, true).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn verification_harness_accepts_uniform_samples() {
    let a = DVector::from_row_slice(&UNIFORM_SAMPLES);
    let s = StrategyEquivalence::exact().check_standardization(&a).unwrap();
    assert_eq!(s.dimension(), 20);
}
