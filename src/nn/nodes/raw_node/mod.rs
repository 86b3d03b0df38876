/*
 * @Author       : 老董
 * @Date         : 2026-08-03
 * @Description  : 原始节点（raw node）：算子的前向/反向实现 + 静态分发注册表
 */

mod input;
mod ops;
mod weight;

pub(in crate::nn) use input::Input;
pub(in crate::nn) use ops::*;
pub(in crate::nn) use weight::Weight;

use super::NodeHandle;
use crate::nn::GraphError;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;

/// 封闭的节点类型注册表：每种算子对应一对前向/反向实现，
/// 非法的算子种类在编译期即不可表示（取代运行时反射查表）。
#[enum_dispatch]
#[derive(Clone)]
pub(in crate::nn) enum NodeType {
    Input(Input),
    Weight(Weight),
    Add(Add),
    Subtract(Subtract),
    Multiply(Multiply),
    MatMul(MatMul),
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    Identity(Identity),
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    fn name(&self) -> &str;

    /// 根据父节点的值计算本节点的值（注意：由于该接口只在Graph中使用，
    /// 所以实现时不用关心父节点的值是否已被计算，所有父节点的值已预先被计算过了）
    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<(), GraphError>;

    fn value(&self) -> Option<&Tensor>;

    fn set_value(&mut self, _value: Option<&Tensor>) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}的值不应该被手动设置",
            self.display_node()
        )))
    }

    fn clear_value(&mut self);

    /// 计算本节点对第`target_slot`个输入槽的VJP梯度（上游梯度 × 本地导数）。
    /// 按槽位而非按父节点id索引，保证同一父节点占据多个输入槽时（如 a⊙a）各槽梯度独立成立。
    fn calc_grad_to_parent(
        &self,
        target_slot: usize,
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError>;

    fn display_node(&self) -> String {
        format!("节点[{}]", self.name())
    }
}
