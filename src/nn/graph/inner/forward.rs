/*
 * @Author       : 老董
 * @Date         : 2026-08-04
 * @Description  : 顺序前向执行：注入输入、按登记顺序逐算子求值、
 *                 导出中间结果并检测非有限值
 */

use super::Graph;
use crate::nn::graph::error::GraphError;
use crate::nn::nodes::NodeHandle;
use crate::tensor::Tensor;

impl Graph {
    /// 执行一次前向。每次调用先清理上一步的步级状态，
    /// 因此同一图实例可在训练循环中反复前向/反向。
    pub fn forward(&mut self, input: &Tensor) -> Result<Tensor, GraphError> {
        self.clear_step_state();

        let input_id = self.input_id;
        self.get_node_mut(input_id)?.set_value(Some(input))?;

        for idx in 0..self.forward_order.len() {
            let node_id = self.forward_order[idx];

            // 父节点句柄先克隆一份快照，避免与本节点的可变借用冲突
            let parents: Vec<NodeHandle> = {
                let node = self.get_node(node_id)?;
                node.parents_ids()
                    .iter()
                    .map(|pid| self.get_node(*pid).cloned())
                    .collect::<Result<_, _>>()?
            };
            let parent_refs: Vec<&NodeHandle> = parents.iter().collect();

            let node = self.get_node_mut(node_id)?;
            node.calc_value_by_parents(&parent_refs)?;

            let (node_name, value, export) = {
                let node = self.get_node(node_id)?;
                let value = node.value().ok_or_else(|| {
                    GraphError::ComputationError(format!(
                        "节点[{}]前向后仍没有值",
                        node.name()
                    ))
                })?;
                (node.name().to_string(), value.clone(), node.export())
            };

            // 非有限值不中断执行，只记录诊断标记并告警
            if !value.is_all_finite() {
                self.nonfinite_detected = true;
                log::warn!("图[{}]前向时节点[{}]出现非有限值", self.name, node_name);
            }

            if export {
                self.intermediates.insert(node_name, value);
            }
        }

        let output = self
            .get_node(self.output_id)?
            .value()
            .ok_or_else(|| {
                GraphError::ComputationError("输出节点前向后仍没有值".to_string())
            })?;
        Ok(output.clone())
    }
}
