use super::base::{adam_step, check_iteration, clip, Hyperparams, Optimizer, ParamState, ParamTensor};
use super::OptimizerError;
use rayon::prelude::*;

/// 标准Adam：带偏差修正的一阶/二阶动量自适应步长。
#[derive(Default)]
pub struct Adam;

impl Adam {
    pub fn new() -> Self {
        Self
    }
}

impl Optimizer for Adam {
    fn optimize(
        &mut self,
        params: &mut [ParamTensor],
        hp: &Hyperparams,
    ) -> Result<(), OptimizerError> {
        let t = check_iteration(hp)?;
        // 先整体校验再动手，避免一半参数已更新时才发现错位的缓冲
        for param in params.iter() {
            param.check_buffers()?;
        }

        params.par_iter_mut().for_each(|param| {
            let grad = param.grad.as_slice().to_vec();
            let ms = param.m.as_slice_mut();
            let vs = param.v.as_slice_mut();
            let ws = param.weight.as_slice_mut();
            for i in 0..ws.len() {
                let g = clip(grad[i], hp.clip_value);
                let delta = adam_step(&mut ms[i], &mut vs[i], g, hp, t);
                ws[i] -= delta;
            }
            param.state = ParamState::Updated;
        });
        Ok(())
    }
}
