/*
 * @Author       : 老董
 * @Date         : 2026-08-04
 * @Description  : Graph的查询与步级状态管理接口
 */

use super::Graph;
use crate::nn::graph::error::GraphError;
use crate::nn::graph::types::{BackwardReport, VisitState};
use crate::nn::nodes::{NodeHandle, NodeId};
use crate::tensor::Tensor;
use std::collections::HashMap;

impl Graph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn input_id(&self) -> NodeId {
        self.input_id
    }

    pub fn output_id(&self) -> NodeId {
        self.output_id
    }

    pub fn node_id(&self, name: &str) -> Result<NodeId, GraphError> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NodeNameNotFound(name.to_string()))
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(
        &mut self,
        id: NodeId,
    ) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// 某节点本步前向算出的值（尚未前向则为None）
    pub fn node_value(&self, name: &str) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(self.node_id(name)?)?.value())
    }

    /// 某节点本趟反向累计的梯度（未触达则为None）
    pub fn node_grad(&self, name: &str) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(self.node_id(name)?)?.grad())
    }

    /// 某权重节点的当前值。非权重节点报非法操作。
    pub fn weight_value(&self, name: &str) -> Result<&Tensor, GraphError> {
        let node = self.get_node(self.node_id(name)?)?;
        if !node.is_weight() {
            return Err(GraphError::InvalidOperation(format!(
                "节点[{name}]不是权重节点"
            )));
        }
        node.value().ok_or_else(|| {
            GraphError::ComputationError(format!("权重节点[{name}]没有值"))
        })
    }

    /// 某权重节点本趟反向累计的梯度
    pub fn weight_grad(&self, name: &str) -> Result<Option<&Tensor>, GraphError> {
        let node = self.get_node(self.node_id(name)?)?;
        if !node.is_weight() {
            return Err(GraphError::InvalidOperation(format!(
                "节点[{name}]不是权重节点"
            )));
        }
        Ok(node.grad())
    }

    /// 训练循环中把优化器更新后的权重写回图。形状必须与原权重一致。
    pub fn set_weight(&mut self, name: &str, value: &Tensor) -> Result<(), GraphError> {
        let id = self.node_id(name)?;
        let node = self.get_node_mut(id)?;
        if !node.is_weight() {
            return Err(GraphError::InvalidOperation(format!(
                "节点[{name}]不是权重节点"
            )));
        }
        node.set_value(Some(value))
    }

    /// 构建期算出的依赖计数（不在输出可达子图内的节点为0）
    pub fn dependency_count(&self, name: &str) -> Result<usize, GraphError> {
        let id = self.node_id(name)?;
        Ok(self.dep_counts.get(&id).copied().unwrap_or(0))
    }

    /// 本步前向按`export`标记导出的中间结果
    pub fn intermediate(&self, name: &str) -> Option<&Tensor> {
        self.intermediates.get(name)
    }

    pub fn intermediates(&self) -> &HashMap<String, Tensor> {
        &self.intermediates
    }

    /// 本步前向中是否出现过非有限值（NaN/Inf）
    pub fn nonfinite_detected(&self) -> bool {
        self.nonfinite_detected
    }

    pub fn last_backward_report(&self) -> Option<&BackwardReport> {
        self.last_report.as_ref()
    }

    /// 由最近一趟反向的报告推导节点的访问状态。尚未反向过则一律Pending。
    pub fn node_visit_state(&self, name: &str) -> Result<VisitState, GraphError> {
        let id = self.node_id(name)?;
        let Some(report) = &self.last_report else {
            return Ok(VisitState::Pending);
        };
        if report.processed.iter().any(|p| p.id == id) {
            return Ok(VisitState::Visited);
        }
        match report.unprocessed.iter().find(|(nid, _, _)| *nid == id) {
            Some((_, contributions, dep)) if contributions >= dep && *dep > 0 => {
                Ok(VisitState::Ready)
            }
            Some((_, contributions, _)) if *contributions > 0 => Ok(VisitState::Accumulating),
            _ => Ok(VisitState::Pending),
        }
    }

    /// 清理步级状态：算子节点的值、所有节点的梯度、中间结果表与诊断标记。
    /// 权重的值跨步存续，不受影响。
    pub fn clear_step_state(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_value();
            node.clear_grad();
        }
        self.intermediates.clear();
        self.nonfinite_detected = false;
        self.last_report = None;
    }
}
