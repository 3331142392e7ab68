use ndarray::array;

use sbi_analysis::{eval_conditional_1d, ConditionedDensity, GridOptions};
use sbi_core::Density;
use sbi_prior::DiagNormal;

#[test]
fn restriction_splices_free_values_into_the_condition() {
    let density = DiagNormal::new(array![0.0, 1.0, -1.0], array![1.0, 0.5, 2.0]).unwrap();
    let condition = array![0.0, 1.0, -1.0];
    let restricted =
        ConditionedDensity::new(&density, condition.clone(), vec![1]).unwrap();

    let restricted_value = restricted.log_prob(array![2.0].view()).unwrap();
    let full_value = density.log_prob(array![0.0, 2.0, -1.0].view()).unwrap();
    assert!((restricted_value - full_value).abs() < 1e-12);
}

#[test]
fn duplicate_free_dims_are_rejected() {
    let density = DiagNormal::new(array![0.0, 0.0], array![1.0, 1.0]).unwrap();
    let err = ConditionedDensity::new(&density, array![0.0, 0.0], vec![1, 1]).unwrap_err();
    assert_eq!(err.info().code, "free-dims");
}

#[test]
fn conditional_grid_of_a_normal_peaks_at_its_mean() {
    let density = DiagNormal::new(array![0.5, 0.0], array![0.3, 1.0]).unwrap();
    let limits = [(-2.0, 2.0), (-2.0, 2.0)];
    let options = GridOptions {
        resolution: 81,
        eps_margin: 1e-32,
    };
    let probs =
        eval_conditional_1d(&density, array![0.5, 0.0].view(), &limits, 0, &options).unwrap();

    let max_index = probs
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(index, _)| index)
        .unwrap();
    let grid_value = -2.0 + 4.0 * max_index as f64 / 80.0;
    assert!((grid_value - 0.5).abs() < 0.06);
}
