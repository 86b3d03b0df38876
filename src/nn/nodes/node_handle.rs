/*
 * @Author       : 老董
 * @Date         : 2026-08-03
 * @Description  : 节点句柄（node handle）：图对节点的唯一持有形式。
 *                 外部代码只通过NodeId引用节点，句柄本身不在图外流通。
 */

use super::raw_node::{NodeType, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;
use std::fmt;

/// 节点在图中的唯一标识。不透明、可拷贝，生命周期与图一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone)]
pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    raw_node: NodeType,
    /// 父节点id按输入槽顺序排列，同一父节点可占据多个槽
    parents_ids: Vec<NodeId>,
    /// 本趟反向传播累计的梯度（∂输出/∂本节点值，与值同形状）
    grad: Option<Tensor>,
    /// 前向计算后是否将值导出到中间结果表
    export: bool,
}

impl NodeHandle {
    pub(in crate::nn) fn new(
        id: NodeId,
        raw_node: NodeType,
        parents_ids: Vec<NodeId>,
        export: bool,
    ) -> Self {
        Self {
            id,
            raw_node,
            parents_ids,
            grad: None,
            export,
        }
    }

    pub(in crate::nn) fn name(&self) -> &str {
        self.raw_node.name()
    }

    pub(in crate::nn) fn parents_ids(&self) -> &[NodeId] {
        &self.parents_ids
    }

    pub(in crate::nn) fn export(&self) -> bool {
        self.export
    }

    pub(in crate::nn) fn is_weight(&self) -> bool {
        matches!(self.raw_node, NodeType::Weight(_))
    }

    pub(in crate::nn) fn value(&self) -> Option<&Tensor> {
        self.raw_node.value()
    }

    pub(in crate::nn) fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        self.raw_node.set_value(value)
    }

    pub(in crate::nn) fn clear_value(&mut self) {
        self.raw_node.clear_value();
    }

    pub(in crate::nn) fn calc_value_by_parents(
        &mut self,
        parents: &[&NodeHandle],
    ) -> Result<(), GraphError> {
        self.raw_node.calc_value_by_parents(parents)
    }

    pub(in crate::nn) fn calc_grad_to_parent(
        &self,
        target_slot: usize,
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        self.raw_node
            .calc_grad_to_parent(target_slot, parents, upstream_grad)
    }

    pub(in crate::nn) fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    /// 累加一份梯度贡献。梯度缓冲与节点值必须同形状。
    pub(in crate::nn) fn accumulate_grad(&mut self, grad: &Tensor) -> Result<(), GraphError> {
        if let Some(value) = self.raw_node.value() {
            if value.shape() != grad.shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: value.shape().to_vec(),
                    got: grad.shape().to_vec(),
                    message: format!("{}的梯度与值形状不一致", self.raw_node.display_node()),
                });
            }
        }
        match &mut self.grad {
            Some(acc) => *acc += grad,
            None => self.grad = Some(grad.clone()),
        }
        Ok(())
    }

    pub(in crate::nn) fn clear_grad(&mut self) {
        self.grad = None;
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(id={})", self.raw_node.display_node(), self.id)
    }
}
