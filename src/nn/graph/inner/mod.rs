/*
 * @Author       : 老董
 * @Date         : 2026-08-04
 * @Description  : Graph本体：节点仲裁表 + 构建期派生的执行顺序与依赖计数
 */

mod backward;
mod build;
mod core;
mod forward;

use crate::nn::graph::types::BackwardReport;
use crate::nn::nodes::{NodeHandle, NodeId};
use crate::tensor::Tensor;
use std::collections::HashMap;

/// 计算图。节点统一存放在`nodes`仲裁表中，图外只流通`NodeId`，
/// 所有执行期状态（节点值、梯度、中间结果）都挂在图上，可整体清理。
pub struct Graph {
    name: String,
    nodes: HashMap<NodeId, NodeHandle>,
    name_index: HashMap<String, NodeId>,
    /// 全部节点id，按创建顺序；反向传播趟状态用它建立稠密索引
    all_ids: Vec<NodeId>,
    index_of: HashMap<NodeId, usize>,
    /// 算子节点的前向执行顺序（拓扑记录的登记顺序即合法顺序）
    forward_order: Vec<NodeId>,
    /// 构建期从输出可达子图算出的依赖计数：指向输出方向的去重后继数
    dep_counts: HashMap<NodeId, usize>,
    input_id: NodeId,
    output_id: NodeId,
    /// 反向传播的末端节点（当前实现固定为输入节点）
    backward_end_id: NodeId,
    /// 前向时按`export`标记导出的中间结果，键为节点名
    intermediates: HashMap<String, Tensor>,
    /// 本步前向中是否出现过非有限值（NaN/Inf）
    nonfinite_detected: bool,
    last_report: Option<BackwardReport>,
    next_id: u64,
}
