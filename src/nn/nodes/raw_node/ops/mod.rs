/*
 * @Author       : 老董
 * @Date         : 2026-08-03
 * @Description  : 各算子节点的前向与VJP反向实现
 */

mod add;
mod identity;
mod mat_mul;
mod multiply;
mod sigmoid;
mod subtract;
mod tanh;

pub(in crate::nn) use add::Add;
pub(in crate::nn) use identity::Identity;
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use multiply::Multiply;
pub(in crate::nn) use sigmoid::Sigmoid;
pub(in crate::nn) use subtract::Subtract;
pub(in crate::nn) use tanh::Tanh;

use super::{NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 取第`slot`个父节点的值，未计算则报错（带上下文）
pub(super) fn parent_value<'a>(
    parents: &[&'a NodeHandle],
    slot: usize,
    who: &str,
) -> Result<&'a Tensor, GraphError> {
    let parent = parents.get(slot).ok_or_else(|| {
        GraphError::InvalidOperation(format!("{who}缺少第{slot}个父节点"))
    })?;
    parent.value().ok_or_else(|| {
        GraphError::ComputationError(format!("{who}的父节点[{}]的值尚未计算", parent.name()))
    })
}

/// 校验两个父节点的值同形状（逐元素二元算子的共用前置检查）
pub(super) fn check_same_shape(a: &Tensor, b: &Tensor, who: &str) -> Result<(), GraphError> {
    if !a.is_same_shape(b) {
        return Err(GraphError::ShapeMismatch {
            expected: a.shape().to_vec(),
            got: b.shape().to_vec(),
            message: format!("{who}要求两个父节点的值同形状"),
        });
    }
    Ok(())
}

/// 校验反向传播槽位落在算子的输入范围内
pub(super) fn check_slot(slot: usize, arity: usize, who: &str) -> Result<(), GraphError> {
    if slot >= arity {
        return Err(GraphError::InvalidOperation(format!(
            "{who}只有{arity}个输入槽，槽位{slot}越界"
        )));
    }
    Ok(())
}
