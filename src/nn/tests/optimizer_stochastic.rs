use crate::nn::optimizer::{
    Hyperparams, Optimizer, OptimizerError, ParamState, ParamTensor, StochasticAdam,
};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_all_increasing_coords_cancelled() {
    // 两个坐标的更新都增大幅度：全部撤销，权重原样，动量照常递推
    let mut params = vec![{
        let mut p = ParamTensor::new(0, "w", Tensor::new(&[1.0, -1.0], &[1, 2]));
        p.grad = Tensor::new(&[-1.0, 1.0], &[1, 2]);
        p
    }];
    let original = params[0].weight.clone();
    let mut hp = Hyperparams::new(0.01);
    hp.iteration = 1;
    StochasticAdam::new(7).optimize(&mut params, &hp).unwrap();

    assert_eq!(params[0].weight, original);
    assert!(!params[0].first_moment().is_zero());
    assert_eq!(params[0].state(), ParamState::Updated);
}

#[test]
fn test_partial_cancel_keeps_norm_bounded() {
    // 坐标0增幅、坐标1减幅：只撤销坐标0，坐标1正常更新到0.99
    let mut params = vec![{
        let mut p = ParamTensor::new(0, "w", Tensor::new(&[1.0, 1.0], &[1, 2]));
        p.grad = Tensor::new(&[-1.0, 1.0], &[1, 2]);
        p
    }];
    let mut hp = Hyperparams::new(0.01);
    hp.iteration = 1;
    StochasticAdam::new(7).optimize(&mut params, &hp).unwrap();

    let w = params[0].weight.as_slice();
    assert_abs_diff_eq!(w[0], 1.0, epsilon = 1e-7);
    assert_abs_diff_eq!(w[1], 0.99, epsilon = 1e-6);
    assert!(params[0].weight.frobenius_norm() <= 2.0f32.sqrt() + 1e-6);
}

#[test]
fn test_norm_never_grows() {
    for seed in [1u64, 2, 3, 4] {
        let mut params = vec![{
            let mut p = ParamTensor::new(
                0,
                "w",
                Tensor::random_seeded(-1.0, 1.0, &[4, 4], seed),
            );
            p.grad = Tensor::random_seeded(-2.0, 2.0, &[4, 4], seed + 100);
            p
        }];
        let norm_before = params[0].weight.frobenius_norm();
        let mut hp = Hyperparams::new(0.05);
        hp.iteration = 1;
        StochasticAdam::new(seed).optimize(&mut params, &hp).unwrap();
        assert!(
            params[0].weight.frobenius_norm() <= norm_before + 1e-5,
            "种子{seed}下范数增大了"
        );
    }
}

#[test]
fn test_same_seed_is_deterministic() {
    let make = || {
        let mut p = ParamTensor::new(3, "w", Tensor::ones(&[2, 8]));
        p.grad = Tensor::random_seeded(-1.0, 1.0, &[2, 8], 55);
        p
    };
    let mut hp = Hyperparams::new(0.01);
    hp.iteration = 1;

    let mut a = vec![make()];
    StochasticAdam::new(9).optimize(&mut a, &hp).unwrap();
    let mut b = vec![make()];
    StochasticAdam::new(9).optimize(&mut b, &hp).unwrap();

    assert_eq!(a[0].weight, b[0].weight);
    assert_eq!(a[0].first_moment(), b[0].first_moment());
}

#[test]
fn test_zero_iteration_and_revert_unsupported() {
    let mut params = vec![ParamTensor::new(0, "w", Tensor::ones(&[1, 2]))];
    let hp = Hyperparams::new(0.01);
    assert_eq!(
        StochasticAdam::new(1).optimize(&mut params, &hp),
        Err(OptimizerError::ZeroIteration)
    );
    assert_eq!(
        StochasticAdam::new(1).revert(&mut params, &hp),
        Err(OptimizerError::RevertUnsupported)
    );
}
