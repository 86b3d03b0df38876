/*
 * @Author       : 老董
 * @Date         : 2026-08-06
 * @Description  : DirectedAdam：带梯度门控的Adam变体，支持对最近一次更新的
 *                 精确回退。回退凭证携带更新前的权重快照，权重按位还原；
 *                 门控与裁剪都就地写进梯度缓冲，动量凭同一缓冲逆推递推。
 */

use super::base::{
    adam_step, check_iteration, Hyperparams, Optimizer, ParamId, ParamState, ParamTensor,
};
use super::OptimizerError;
use crate::tensor::Tensor;
use rayon::prelude::*;
use std::collections::HashMap;

/// 一次更新的回退凭证。权重快照保证按位还原；梯度缓冲本身保持
/// 门控后的状态，动量逆推直接用它，无须再记。
struct RevertRecord {
    /// 更新发生时的迭代计数
    iteration: usize,
    /// 更新前的权重快照
    weight: Tensor,
    /// 被门控清零的坐标（升序）
    critical: Vec<usize>,
    /// 步长被衰减过的坐标（升序）
    dampened: Vec<usize>,
    /// 幸存梯度的缩放系数 avg/max（未触发缩放时为1.0）
    scaling_factor: f32,
}

#[derive(Default)]
pub struct DirectedAdam {
    revert_records: HashMap<ParamId, RevertRecord>,
}

impl DirectedAdam {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次更新中被门控清零的坐标（诊断用）
    pub fn critical_indices(&self, id: ParamId) -> Option<&[usize]> {
        self.revert_records.get(&id).map(|r| r.critical.as_slice())
    }

    /// 最近一次更新中步长被衰减的坐标（诊断用）
    pub fn dampened_indices(&self, id: ParamId) -> Option<&[usize]> {
        self.revert_records.get(&id).map(|r| r.dampened.as_slice())
    }

    /// 最近一次更新的梯度缩放系数（诊断用）
    pub fn scaling_factor(&self, id: ParamId) -> Option<f32> {
        self.revert_records.get(&id).map(|r| r.scaling_factor)
    }
}

impl Optimizer for DirectedAdam {
    fn optimize(
        &mut self,
        params: &mut [ParamTensor],
        hp: &Hyperparams,
    ) -> Result<(), OptimizerError> {
        let t = check_iteration(hp)?;
        for param in params.iter() {
            param.check_buffers()?;
        }

        let records: Vec<(ParamId, RevertRecord)> = params
            .par_iter_mut()
            .map(|param| (param.id(), update_one(param, hp, t)))
            .collect();
        for (id, record) in records {
            self.revert_records.insert(id, record);
        }
        Ok(())
    }

    fn revert(
        &mut self,
        params: &mut [ParamTensor],
        hp: &Hyperparams,
    ) -> Result<(), OptimizerError> {
        // 先整体校验：任何一个参数不可回退，就不动任何权重
        for param in params.iter() {
            let record = self
                .revert_records
                .get(&param.id())
                .ok_or_else(|| OptimizerError::RevertWithoutUpdate(param.name().to_string()))?;
            if param.state() != ParamState::Updated {
                return Err(OptimizerError::RevertWithoutUpdate(param.name().to_string()));
            }
            if record.iteration != hp.iteration + 1 {
                return Err(OptimizerError::IterationMismatch {
                    name: param.name().to_string(),
                    recorded: record.iteration,
                    current: hp.iteration,
                });
            }
            param.check_buffers()?;
        }

        let records: Vec<RevertRecord> = params
            .iter()
            .map(|param| {
                self.revert_records
                    .remove(&param.id())
                    .ok_or_else(|| OptimizerError::RevertWithoutUpdate(param.name().to_string()))
            })
            .collect::<Result<_, _>>()?;

        params
            .par_iter_mut()
            .zip(records.par_iter())
            .for_each(|(param, record)| revert_one(param, record, hp));
        Ok(())
    }
}

fn update_one(param: &mut ParamTensor, hp: &Hyperparams, t: usize) -> RevertRecord {
    // 裁剪与门控都就地写进梯度缓冲：回退时要用同一缓冲逆推动量
    if hp.clip_value > 0.0 {
        for g in param.grad.as_slice_mut() {
            *g = g.clamp(-hp.clip_value, hp.clip_value);
        }
    }

    let cols = param.weight.shape().last().copied().unwrap_or(0);
    let (critical, scaling_factor) = gate_in_place(&mut param.grad, cols);

    let weight_snapshot = param.weight.clone();
    let damp_factor = 1.0 / (1.0 + param.weight.frobenius_norm());
    let mut dampened = Vec::new();

    let grad = param.grad.as_slice();
    let ms = param.m.as_slice_mut();
    let vs = param.v.as_slice_mut();
    let ws = param.weight.as_slice_mut();
    for i in 0..ws.len() {
        let mut delta = adam_step(&mut ms[i], &mut vs[i], grad[i], hp, t);
        // 会令该坐标幅度增大的更新被衰减，防止权重发散
        if (ws[i] - delta).abs() > ws[i].abs() {
            delta *= damp_factor;
            dampened.push(i);
        }
        ws[i] -= delta;
    }
    param.state = ParamState::Updated;

    RevertRecord {
        iteration: t,
        weight: weight_snapshot,
        critical,
        dampened,
        scaling_factor,
    }
}

/// 梯度门控：以首行的|g|统计量为阈值，低于阈值的坐标清零（记为关键集），
/// 幸存坐标按avg/max整体缩放。阈值 avg += (max-avg)/8 略偏向大梯度。
fn gate_in_place(grad: &mut Tensor, cols: usize) -> (Vec<usize>, f32) {
    let gs = grad.as_slice_mut();
    if gs.is_empty() || cols == 0 {
        return (Vec::new(), 1.0);
    }
    let row = &gs[..cols.min(gs.len())];
    let mut avg = row.iter().map(|g| g.abs()).sum::<f32>() / row.len() as f32;
    let max = row.iter().map(|g| g.abs()).fold(0.0f32, f32::max);
    avg += (max - avg) / 8.0;
    let scaling = if max > avg { avg / max } else { 1.0 };

    let mut critical = Vec::new();
    for (i, g) in gs.iter_mut().enumerate() {
        if g.abs() < avg {
            critical.push(i);
            *g = 0.0;
        } else {
            *g *= scaling;
        }
    }
    (critical, scaling)
}

fn revert_one(param: &mut ParamTensor, record: &RevertRecord, hp: &Hyperparams) {
    // 权重直接取快照，按位还原；浮点回加（w-δ）+δ做不到这一点
    param.weight = record.weight.clone();

    let grad = param.grad.as_slice();
    let ms = param.m.as_slice_mut();
    let vs = param.v.as_slice_mut();
    for i in 0..ms.len() {
        // 用仍处于门控状态的梯度缓冲逆推动量递推
        ms[i] = (ms[i] - (1.0 - hp.beta1) * grad[i]) / hp.beta1;
        vs[i] = (vs[i] - (1.0 - hp.beta2) * grad[i] * grad[i]) / hp.beta2;
    }
    param.state = ParamState::Reverted;
}
