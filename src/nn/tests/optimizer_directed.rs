use crate::nn::optimizer::{
    DirectedAdam, Hyperparams, Optimizer, OptimizerError, ParamState, ParamTensor,
};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn literal_param() -> ParamTensor {
    let mut p = ParamTensor::new(0, "w", Tensor::ones(&[1, 4]));
    p.grad = Tensor::new(&[1.0, 2.0, 3.0, 10.0], &[1, 4]);
    p
}

#[test]
fn test_gating_literal() {
    // 首行统计：avg=4→4.75（向最大值偏移1/8），max=10；
    // |g|<4.75的坐标清零为关键集，幸存坐标按4.75/10=0.475缩放
    let mut params = vec![literal_param()];
    let mut optimizer = DirectedAdam::new();
    let mut hp = Hyperparams::new(0.01);
    hp.iteration = 1;
    optimizer.optimize(&mut params, &hp).unwrap();

    let id = params[0].id();
    assert_eq!(optimizer.critical_indices(id), Some(&[0usize, 1, 2][..]));
    assert_abs_diff_eq!(optimizer.scaling_factor(id).unwrap(), 0.475, epsilon = 1e-6);
    // 门控就地写进梯度缓冲
    assert_eq!(
        params[0].grad,
        Tensor::new(&[0.0, 0.0, 0.0, 4.75], &[1, 4])
    );

    // 清零坐标的动量与权重不变；幸存坐标正常走Adam一步
    let w = params[0].weight.as_slice();
    assert_eq!(&w[..3], &[1.0, 1.0, 1.0]);
    assert_abs_diff_eq!(w[3], 0.99, epsilon = 1e-6);
    assert_eq!(params[0].state(), ParamState::Updated);
}

#[test]
fn test_revert_restores_exactly() {
    let mut params = vec![literal_param()];
    let original = params[0].weight.clone();
    let mut optimizer = DirectedAdam::new();
    let mut hp = Hyperparams::new(0.01);
    hp.iteration = 1;
    optimizer.optimize(&mut params, &hp).unwrap();
    assert_ne!(params[0].weight, original);

    // 调用方先把迭代计数减回去
    hp.iteration = 0;
    optimizer.revert(&mut params, &hp).unwrap();

    // 权重按位还原，动量逆推回零
    assert_eq!(params[0].weight, original);
    assert_eq!(params[0].first_moment(), &Tensor::zeros(&[1, 4]));
    assert_eq!(params[0].second_moment(), &Tensor::zeros(&[1, 4]));
    assert_eq!(params[0].state(), ParamState::Reverted);
}

#[test]
fn test_dampening_and_its_reversal() {
    // 两个坐标的更新都会令幅度增大，步长被1/(1+‖w‖_F)衰减
    let mut params = vec![{
        let mut p = ParamTensor::new(0, "w", Tensor::new(&[0.5, -0.5], &[1, 2]));
        p.grad = Tensor::new(&[-1.0, 1.0], &[1, 2]);
        p
    }];
    let original = params[0].weight.clone();
    let mut optimizer = DirectedAdam::new();
    let mut hp = Hyperparams::new(0.01);
    hp.iteration = 1;
    optimizer.optimize(&mut params, &hp).unwrap();

    assert_eq!(
        optimizer.dampened_indices(params[0].id()),
        Some(&[0usize, 1][..])
    );
    let w = params[0].weight.as_slice();
    // 全步长是0.01，衰减后约为0.00586
    assert_abs_diff_eq!(w[0], 0.5058579, epsilon = 1e-6);
    assert_abs_diff_eq!(w[1], -0.5058579, epsilon = 1e-6);

    hp.iteration = 0;
    optimizer.revert(&mut params, &hp).unwrap();
    assert_eq!(params[0].weight, original);
}

#[test]
fn test_revert_restores_weights_bitwise_after_many_steps() {
    // 动量历史累积若干步后再回退：权重仍须逐位相等，而非仅在容差内
    let mut params = vec![ParamTensor::new(
        0,
        "w",
        Tensor::new(&[0.8, -0.4, 1.2, 0.1], &[1, 4]),
    )];
    let mut optimizer = DirectedAdam::new();
    let mut hp = Hyperparams::new(0.05);
    for t in 1..=6 {
        hp.iteration = t;
        let s = t as f32;
        params[0].grad = Tensor::new(&[0.3 * s, -0.7, 1.1, 0.2 * s - 0.5], &[1, 4]);
        optimizer.optimize(&mut params, &hp).unwrap();
    }

    let checkpoint = params[0].weight.clone();
    let m_checkpoint = params[0].first_moment().clone();
    let v_checkpoint = params[0].second_moment().clone();

    hp.iteration = 7;
    params[0].grad = Tensor::new(&[2.0, -1.5, 0.9, 3.0], &[1, 4]);
    optimizer.optimize(&mut params, &hp).unwrap();
    assert_ne!(params[0].weight, checkpoint);

    hp.iteration = 6;
    optimizer.revert(&mut params, &hp).unwrap();
    for (restored, original) in params[0]
        .weight
        .as_slice()
        .iter()
        .zip(checkpoint.as_slice())
    {
        assert_eq!(restored.to_bits(), original.to_bits());
    }
    // 动量按递推逆推还原，误差只剩最后一步舍入
    for (restored, original) in params[0]
        .first_moment()
        .as_slice()
        .iter()
        .zip(m_checkpoint.as_slice())
    {
        assert_abs_diff_eq!(*restored, *original, epsilon = 1e-5);
    }
    for (restored, original) in params[0]
        .second_moment()
        .as_slice()
        .iter()
        .zip(v_checkpoint.as_slice())
    {
        assert_abs_diff_eq!(*restored, *original, epsilon = 1e-5);
    }
}

#[test]
fn test_revert_without_update() {
    let mut params = vec![literal_param()];
    let hp = Hyperparams::new(0.01);
    assert_eq!(
        DirectedAdam::new().revert(&mut params, &hp),
        Err(OptimizerError::RevertWithoutUpdate("w".to_string()))
    );
}

#[test]
fn test_revert_twice_rejected() {
    let mut params = vec![literal_param()];
    let mut optimizer = DirectedAdam::new();
    let mut hp = Hyperparams::new(0.01);
    hp.iteration = 1;
    optimizer.optimize(&mut params, &hp).unwrap();
    hp.iteration = 0;
    optimizer.revert(&mut params, &hp).unwrap();
    assert_eq!(
        optimizer.revert(&mut params, &hp),
        Err(OptimizerError::RevertWithoutUpdate("w".to_string()))
    );
}

#[test]
fn test_revert_iteration_mismatch() {
    let mut params = vec![literal_param()];
    let mut optimizer = DirectedAdam::new();
    let mut hp = Hyperparams::new(0.01);
    hp.iteration = 1;
    optimizer.optimize(&mut params, &hp).unwrap();

    // 迭代计数没减一就回退
    let result = optimizer.revert(&mut params, &hp);
    assert_eq!(
        result,
        Err(OptimizerError::IterationMismatch {
            name: "w".to_string(),
            recorded: 1,
            current: 1,
        })
    );
    // 校验失败时不动任何权重
    assert_eq!(params[0].state(), ParamState::Updated);
}

#[test]
fn test_zero_iteration_rejected() {
    let mut params = vec![literal_param()];
    let hp = Hyperparams::new(0.01);
    assert_eq!(
        DirectedAdam::new().optimize(&mut params, &hp),
        Err(OptimizerError::ZeroIteration)
    );
}
