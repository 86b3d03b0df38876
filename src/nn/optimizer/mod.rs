/*
 * @Author       : 老董
 * @Date         : 2026-08-06
 * @Description  : 优化器家族：标准Adam、带梯度门控与精确回退的DirectedAdam、
 *                 范数有界的StochasticAdam。优化器与图解耦，只操作参数张量组。
 */

mod adam;
mod base;
mod directed_adam;
mod stochastic_adam;

pub use adam::Adam;
pub use base::{Hyperparams, Optimizer, OptimizerError, ParamId, ParamState, ParamTensor};
pub use directed_adam::DirectedAdam;
pub use stochastic_adam::StochasticAdam;
