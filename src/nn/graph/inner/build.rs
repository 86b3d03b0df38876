/*
 * @Author       : 老董
 * @Date         : 2026-08-04
 * @Description  : 从声明式拓扑构建计算图：解析输入引用、惰性创建权重节点、
 *                 校验元数与重名，并预先算好反向传播所需的依赖计数
 */

use super::Graph;
use crate::nn::graph::error::GraphError;
use crate::nn::graph::types::{InputRef, OpKind, Position, Topology};
use crate::nn::nodes::raw_node::{Input, NodeType, Weight};
use crate::nn::nodes::{NodeHandle, NodeId};
use crate::tensor::Tensor;
use std::collections::{HashMap, HashSet};

impl Graph {
    /// 按拓扑描述构建图。`weights`为权重表：只有被拓扑实际引用的条目
    /// 才会生成权重节点，未引用的条目被静默忽略。
    pub fn build(topology: &Topology, weights: &[(&str, Tensor)]) -> Result<Self, GraphError> {
        Self::build_with_name("default_graph", topology, weights)
    }

    pub fn build_with_name(
        name: &str,
        topology: &Topology,
        weights: &[(&str, Tensor)],
    ) -> Result<Self, GraphError> {
        if topology.input.is_empty() {
            return Err(GraphError::InvalidTopology("起始节点名为空".to_string()));
        }
        if topology.output.is_empty() {
            return Err(GraphError::InvalidTopology("结束节点名为空".to_string()));
        }
        if topology.records.is_empty() {
            return Err(GraphError::InvalidTopology("算子记录列表为空".to_string()));
        }

        let mut graph = Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            name_index: HashMap::new(),
            all_ids: Vec::new(),
            index_of: HashMap::new(),
            forward_order: Vec::new(),
            dep_counts: HashMap::new(),
            input_id: NodeId(0),
            output_id: NodeId(0),
            backward_end_id: NodeId(0),
            intermediates: HashMap::new(),
            nonfinite_detected: false,
            last_report: None,
            next_id: 0,
        };

        let weight_table: HashMap<&str, &Tensor> =
            weights.iter().map(|(n, t)| (*n, t)).collect();

        graph.input_id =
            graph.add_node(NodeType::Input(Input::new(&topology.input)), Vec::new(), false)?;

        for record in &topology.records {
            let node_name = if record.output.is_empty() {
                graph.generate_op_name(record.kind, &record.position)
            } else {
                record.output.clone()
            };

            // 逐槽解析输入引用：查找器先转成名字，再解析为节点id
            let mut parents_ids = Vec::with_capacity(record.inputs.len());
            for input_ref in &record.inputs {
                let input_name = match input_ref {
                    InputRef::Named(n) => n.clone(),
                    InputRef::Finder(f) => {
                        f(&record.position).ok_or_else(|| GraphError::UnresolvedInput {
                            node: node_name.clone(),
                            input: format!(
                                "<查找器@t={},l={}>",
                                record.position.time_step, record.position.layer
                            ),
                        })?
                    }
                };
                let parent_id =
                    graph.resolve_input(&node_name, &input_name, &weight_table)?;
                parents_ids.push(parent_id);
            }

            if parents_ids.len() != record.kind.arity() {
                return Err(GraphError::InvalidTopology(format!(
                    "算子[{}]（种类{}）需要{}个输入，实际给出{}个",
                    node_name,
                    record.kind,
                    record.kind.arity(),
                    parents_ids.len()
                )));
            }

            let node_id = graph.add_node(
                record.kind.instantiate(&node_name),
                parents_ids,
                record.export,
            )?;
            graph.forward_order.push(node_id);
        }

        graph.output_id = *graph
            .name_index
            .get(&topology.output)
            .ok_or_else(|| GraphError::NodeNameNotFound(topology.output.clone()))?;
        graph.backward_end_id = graph.input_id;

        graph.compute_dep_counts();
        Ok(graph)
    }

    /// 自动命名："种类_时间步_层"，撞名时追加递增后缀
    fn generate_op_name(&self, kind: OpKind, position: &Position) -> String {
        let base = format!("{kind}_{}_{}", position.time_step, position.layer);
        if !self.name_index.contains_key(&base) {
            return base;
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !self.name_index.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// 把一个输入名解析为节点id：已登记节点直接命中；
    /// 否则查权重表并就地创建权重节点；两者都落空则报错。
    fn resolve_input(
        &mut self,
        node_name: &str,
        input_name: &str,
        weight_table: &HashMap<&str, &Tensor>,
    ) -> Result<NodeId, GraphError> {
        if let Some(id) = self.name_index.get(input_name) {
            return Ok(*id);
        }
        if let Some(init) = weight_table.get(input_name) {
            let weight = Weight::new(input_name, init)?;
            return self.add_node(NodeType::Weight(weight), Vec::new(), false);
        }
        Err(GraphError::UnresolvedInput {
            node: node_name.to_string(),
            input: input_name.to_string(),
        })
    }

    fn add_node(
        &mut self,
        raw_node: NodeType,
        parents_ids: Vec<NodeId>,
        export: bool,
    ) -> Result<NodeId, GraphError> {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let handle = NodeHandle::new(id, raw_node, parents_ids, export);
        let node_name = handle.name().to_string();
        if self.name_index.contains_key(&node_name) {
            return Err(GraphError::DuplicateNodeName(node_name));
        }

        self.index_of.insert(id, self.all_ids.len());
        self.all_ids.push(id);
        self.name_index.insert(node_name, id);
        self.nodes.insert(id, handle);
        Ok(id)
    }

    /// 依赖计数：从输出节点沿父边遍历可达子图，对每个节点统计
    /// 去重后的后继（消费者）数量。同一消费者占据多个输入槽只计一次。
    fn compute_dep_counts(&mut self) {
        let mut counts: HashMap<NodeId, usize> = HashMap::new();
        counts.insert(self.output_id, 0);

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![self.output_id];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let parents: Vec<NodeId> = match self.nodes.get(&id) {
                Some(node) => {
                    let mut unique = node.parents_ids().to_vec();
                    unique.sort_unstable();
                    unique.dedup();
                    unique
                }
                None => continue,
            };
            for parent in parents {
                *counts.entry(parent).or_insert(0) += 1;
                stack.push(parent);
            }
        }
        self.dep_counts = counts;
    }
}
