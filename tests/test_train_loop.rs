/*
 * @Author       : 老董
 * @Date         : 2026-08-07
 * @Description  : 端到端训练回路：图的前向/反向与优化器家族协同工作
 */

use graph_grad::nn::optimizer::{
    Adam, DirectedAdam, Hyperparams, Optimizer, ParamTensor, StochasticAdam,
};
use graph_grad::nn::{Graph, OpKind, OpRecord, Topology};
use graph_grad::tensor::Tensor;

const X: [f32; 2] = [1.0, 2.0];
const TARGET: f32 = 3.0;

fn linear_graph() -> (Graph, Tensor) {
    let w_init = Tensor::new(&[0.5, -0.3], &[2, 1]);
    let topology =
        Topology::new("x", "y").record(OpRecord::new(OpKind::MatMul, &["x", "w"], "y"));
    let graph = Graph::build(&topology, &[("w", w_init.clone())]).unwrap();
    (graph, w_init)
}

/// 单样本线性回归 y = x·w 拟合目标值，返回(首步损失, 末步损失)
fn train(optimizer: &mut dyn Optimizer, iters: usize) -> (f32, f32) {
    let (mut graph, w_init) = linear_graph();
    let mut params = vec![ParamTensor::new(0, "w", w_init)];
    let mut hp = Hyperparams::new(0.05);

    let x = Tensor::new(&X, &[1, 2]);
    let target = Tensor::new(&[TARGET], &[1, 1]);
    let mut first_loss = 0.0;
    let mut last_loss = 0.0;
    for t in 1..=iters {
        hp.iteration = t;
        let y = graph.forward(&x).unwrap();
        let diff = &y - &target;
        let loss = (&diff * &diff).number().unwrap();
        if t == 1 {
            first_loss = loss;
        }
        last_loss = loss;

        graph.backward(&(&diff * 2.0)).unwrap();
        // 精确收敛时零种子短路不产生梯度，训练提前结束
        let Some(grad) = graph.weight_grad("w").unwrap() else {
            break;
        };
        params[0].grad = grad.clone();
        optimizer.optimize(&mut params, &hp).unwrap();
        graph.set_weight("w", &params[0].weight).unwrap();
    }
    (first_loss, last_loss)
}

#[test]
fn test_train_with_adam_converges() {
    let (first, last) = train(&mut Adam::new(), 300);
    assert!((first - 9.61).abs() < 1e-3);
    assert!(last < 1e-3, "Adam末步损失{last}未收敛");
}

#[test]
fn test_train_with_directed_adam_converges() {
    let (first, last) = train(&mut DirectedAdam::new(), 300);
    assert!(last < 1e-3, "DirectedAdam末步损失{last}未收敛");
    assert!(last < first);
}

#[test]
fn test_train_with_stochastic_adam_descends_within_norm_bound() {
    // 范数约束会拦住需要增大权重幅度的更新，只要求损失下降
    let (first, last) = train(&mut StochasticAdam::new(7), 300);
    assert!(last < first * 0.8, "StochasticAdam损失未下降：{first}→{last}");
}

#[test]
fn test_directed_adam_revert_round_trip() {
    let (mut graph, w_init) = linear_graph();
    let mut params = vec![ParamTensor::new(0, "w", w_init)];
    let mut optimizer = DirectedAdam::new();
    let mut hp = Hyperparams::new(0.05);

    let x = Tensor::new(&X, &[1, 2]);
    let target = Tensor::new(&[TARGET], &[1, 1]);

    // 先正常训练若干步
    for t in 1..=10 {
        hp.iteration = t;
        let y = graph.forward(&x).unwrap();
        let diff = &y - &target;
        graph.backward(&(&diff * 2.0)).unwrap();
        params[0].grad = graph.weight_grad("w").unwrap().unwrap().clone();
        optimizer.optimize(&mut params, &hp).unwrap();
        graph.set_weight("w", &params[0].weight).unwrap();
    }
    let checkpoint = params[0].weight.clone();
    let m_checkpoint = params[0].first_moment().clone();

    // 试探一步后回退，权重与动量按位还原
    hp.iteration = 11;
    let y = graph.forward(&x).unwrap();
    let diff = &y - &target;
    graph.backward(&(&diff * 2.0)).unwrap();
    params[0].grad = graph.weight_grad("w").unwrap().unwrap().clone();
    optimizer.optimize(&mut params, &hp).unwrap();
    assert_ne!(params[0].weight, checkpoint);

    hp.iteration = 10;
    optimizer.revert(&mut params, &hp).unwrap();
    assert_eq!(params[0].weight, checkpoint);
    for (restored, original) in params[0]
        .first_moment()
        .as_slice()
        .iter()
        .zip(m_checkpoint.as_slice())
    {
        assert!((restored - original).abs() < 1e-4);
    }
}
