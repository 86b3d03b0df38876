/*
 * @Author       : 老董
 * @Date         : 2026-08-06
 * @Description  : StochasticAdam：范数有界的Adam变体。动量照常递推，
 *                 但若本次更新令权重的Frobenius范数增大，则按"最小步长
 *                 配最大步长"成对撤销增幅坐标，直至范数回到更新前的界内。
 */

use super::base::{adam_step, check_iteration, clip, Hyperparams, Optimizer, ParamState, ParamTensor};
use super::OptimizerError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

pub struct StochasticAdam {
    /// 撤销顺序洗牌用的种子；同种子、同输入下结果完全可复现
    seed: u64,
}

impl StochasticAdam {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Optimizer for StochasticAdam {
    fn optimize(
        &mut self,
        params: &mut [ParamTensor],
        hp: &Hyperparams,
    ) -> Result<(), OptimizerError> {
        let t = check_iteration(hp)?;
        for param in params.iter() {
            param.check_buffers()?;
        }

        let seed = self.seed;
        params
            .par_iter_mut()
            .for_each(|param| update_one(param, hp, t, seed));
        Ok(())
    }
}

fn update_one(param: &mut ParamTensor, hp: &Hyperparams, t: usize, seed: u64) {
    let pid = param.id();
    let old: Vec<f32> = param.weight.as_slice().to_vec();
    let grad: Vec<f32> = param.grad.as_slice().to_vec();

    let ms = param.m.as_slice_mut();
    let vs = param.v.as_slice_mut();
    let ws = param.weight.as_slice_mut();
    for i in 0..ws.len() {
        let g = clip(grad[i], hp.clip_value);
        let delta = adam_step(&mut ms[i], &mut vs[i], g, hp, t);
        ws[i] -= delta;
    }

    // 范数核算用f64累加，避免逐对撤销时的跟踪误差
    let norm_before: f64 = old.iter().map(|w| (*w as f64) * (*w as f64)).sum();
    let mut norm_after: f64 = ws.iter().map(|w| (*w as f64) * (*w as f64)).sum();

    if norm_after > norm_before {
        // 只有幅度增大的坐标才是撤销候选；把它们全部撤销后
        // 每个坐标都不增幅，范数必然落回界内，故循环必定终止
        let mut candidates: Vec<usize> = (0..ws.len())
            .filter(|&i| ws[i].abs() > old[i].abs())
            .collect();

        // 先洗牌再稳定排序：等步长坐标的取舍可复现且无位置偏置
        let mut rng = StdRng::seed_from_u64(seed ^ pid.0);
        candidates.shuffle(&mut rng);
        candidates.sort_by(|&a, &b| {
            let da = (ws[a] - old[a]).abs();
            let db = (ws[b] - old[b]).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut lo = 0usize;
        let mut hi = candidates.len();
        while lo < hi && norm_after > norm_before {
            let i = candidates[lo];
            norm_after += (old[i] as f64).powi(2) - (ws[i] as f64).powi(2);
            ws[i] = old[i];
            lo += 1;
            if lo < hi && norm_after > norm_before {
                hi -= 1;
                let j = candidates[hi];
                norm_after += (old[j] as f64).powi(2) - (ws[j] as f64).powi(2);
                ws[j] = old[j];
            }
        }
    }
    param.state = ParamState::Updated;
}
