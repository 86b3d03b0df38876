/*
 * @Author       : 老董
 * @Date         : 2026-08-06
 * @Description  : 优化器的公共地基：参数张量、超参数、共用的Adam单元素递推
 */

use crate::tensor::Tensor;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OptimizerError {
    #[error("迭代计数必须从1开始（当前为0），调用方应在每次优化前先递增")]
    ZeroIteration,

    #[error("参数[{name}]的{buffer}缓冲形状{got:?}与权重形状{expected:?}不一致")]
    BufferShapeMismatch {
        name: String,
        buffer: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("参数[{0}]没有可回退的更新记录（回退必须紧跟一次成功的优化）")]
    RevertWithoutUpdate(String),

    #[error("参数[{name}]的回退迭代计数不匹配：更新时为{recorded}，当前为{current}（调用方需先把迭代计数减一）")]
    IterationMismatch {
        name: String,
        recorded: usize,
        current: usize,
    },

    #[error("该优化器不支持回退")]
    RevertUnsupported,
}

/// 参数张量在优化器视角下的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamState {
    /// 尚未被任何优化器更新过
    Uninitialized,
    /// 最近一次操作是优化更新
    Updated,
    /// 最近一次操作是回退
    Reverted,
}

/// 参数张量在优化器登记表中的唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u64);

/// 优化器超参数。`iteration`由调用方在每次优化前递增，
/// 从1开始计数（Adam的偏差修正依赖它）。
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperparams {
    pub learning_rate: f32,
    /// 梯度逐元素裁剪阈值，0表示不裁剪
    pub clip_value: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    pub iteration: usize,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            clip_value: 0.0,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            iteration: 0,
        }
    }
}

impl Hyperparams {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            ..Default::default()
        }
    }

    pub fn with_clip(mut self, clip_value: f32) -> Self {
        self.clip_value = clip_value;
        self
    }
}

/// 一个可训练参数及其优化器侧的全部状态：
/// 权重、当前梯度、一阶/二阶动量。四者始终同形状。
pub struct ParamTensor {
    id: ParamId,
    name: String,
    pub weight: Tensor,
    pub grad: Tensor,
    pub(in crate::nn::optimizer) m: Tensor,
    pub(in crate::nn::optimizer) v: Tensor,
    pub(in crate::nn::optimizer) state: ParamState,
}

impl ParamTensor {
    pub fn new(id: u64, name: &str, weight: Tensor) -> Self {
        let shape = weight.shape().to_vec();
        Self {
            id: ParamId(id),
            name: name.to_string(),
            weight,
            grad: Tensor::zeros(&shape),
            m: Tensor::zeros(&shape),
            v: Tensor::zeros(&shape),
            state: ParamState::Uninitialized,
        }
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ParamState {
        self.state
    }

    /// 一阶动量（只读，供诊断与测试）
    pub fn first_moment(&self) -> &Tensor {
        &self.m
    }

    /// 二阶动量（只读，供诊断与测试）
    pub fn second_moment(&self) -> &Tensor {
        &self.v
    }

    /// 维度不一致是致命错误：带着错位的缓冲继续更新会悄悄破坏权重
    pub(in crate::nn::optimizer) fn check_buffers(&self) -> Result<(), OptimizerError> {
        let expected = self.weight.shape();
        for (buffer, tensor) in [("梯度", &self.grad), ("一阶动量", &self.m), ("二阶动量", &self.v)]
        {
            if tensor.shape() != expected {
                return Err(OptimizerError::BufferShapeMismatch {
                    name: self.name.clone(),
                    buffer,
                    expected: expected.to_vec(),
                    got: tensor.shape().to_vec(),
                });
            }
        }
        Ok(())
    }
}

/// 优化器统一接口。`optimize`/`revert`对参数组的遍历是并行的，
/// 返回前等待全部参数完成。
pub trait Optimizer {
    fn optimize(
        &mut self,
        params: &mut [ParamTensor],
        hp: &Hyperparams,
    ) -> Result<(), OptimizerError>;

    /// 撤销最近一次`optimize`对参数组的更新。
    /// 调用方必须先把`hp.iteration`减一再调用。
    fn revert(
        &mut self,
        _params: &mut [ParamTensor],
        _hp: &Hyperparams,
    ) -> Result<(), OptimizerError> {
        Err(OptimizerError::RevertUnsupported)
    }
}

pub(in crate::nn::optimizer) fn check_iteration(hp: &Hyperparams) -> Result<usize, OptimizerError> {
    if hp.iteration == 0 {
        return Err(OptimizerError::ZeroIteration);
    }
    Ok(hp.iteration)
}

/// 逐元素裁剪（阈值为0时原样返回）
pub(in crate::nn::optimizer) fn clip(g: f32, clip_value: f32) -> f32 {
    if clip_value > 0.0 {
        g.clamp(-clip_value, clip_value)
    } else {
        g
    }
}

/// Adam单元素递推：就地更新动量并返回带偏差修正的步长增量
pub(in crate::nn::optimizer) fn adam_step(
    m: &mut f32,
    v: &mut f32,
    g: f32,
    hp: &Hyperparams,
    t: usize,
) -> f32 {
    *m = hp.beta1 * *m + (1.0 - hp.beta1) * g;
    *v = hp.beta2 * *v + (1.0 - hp.beta2) * g * g;
    adam_delta(*m, *v, hp, t)
}

/// 由当前动量直接计算带偏差修正的步长增量
fn adam_delta(m: f32, v: f32, hp: &Hyperparams, t: usize) -> f32 {
    let m_hat = m / (1.0 - hp.beta1.powi(t as i32));
    let v_hat = v / (1.0 - hp.beta2.powi(t as i32));
    hp.learning_rate * m_hat / (v_hat.sqrt() + hp.epsilon)
}
