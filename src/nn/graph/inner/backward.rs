/*
 * @Author       : 老董
 * @Date         : 2026-08-05
 * @Description  : 依赖计数的并行反向传播。节点在集齐全部下游梯度贡献后
 *                 恰好被访问一次；"原子加一并与阈值比较"是唯一同步临界点。
 */

use super::Graph;
use crate::nn::graph::error::GraphError;
use crate::nn::graph::types::{BackwardReport, ProcessedNode};
use crate::nn::nodes::{NodeHandle, NodeId};
use crate::tensor::Tensor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// 一趟反向传播的全部可变状态，与图本体分离。
/// 图在并行阶段只读，趟状态按稠密索引逐节点分片，互不争用。
struct PassState {
    /// 各节点已收到的梯度贡献数
    contrib: Vec<AtomicUsize>,
    /// 各节点是否已被处理（swap保证恰好一次）
    visited: Vec<AtomicBool>,
    /// 各节点的梯度累加槽
    grads: Vec<Mutex<Option<Tensor>>>,
    processed: Mutex<Vec<ProcessedNode>>,
    failures: Mutex<Vec<(NodeId, String)>>,
}

impl PassState {
    fn new(n: usize) -> Self {
        Self {
            contrib: (0..n).map(|_| AtomicUsize::new(0)).collect(),
            visited: (0..n).map(|_| AtomicBool::new(false)).collect(),
            grads: (0..n).map(|_| Mutex::new(None)).collect(),
            processed: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }
}

impl Graph {
    /// 从输出节点发起一趟反向传播，返回到达输入节点的梯度。
    ///
    /// 失败策略是宽容的：单个节点反向失败只告警并继续；
    /// 同一趟中2个及以上不同节点失败才聚合上报为错误。
    pub fn backward(&mut self, loss_grad: &Tensor) -> Result<Tensor, GraphError> {
        // 零种子短路：没有任何梯度可传播，本趟视为空趟
        if loss_grad.is_zero() {
            self.last_report = Some(BackwardReport::default());
            return Ok(loss_grad.clone());
        }

        if let Some(out_value) = self.get_node(self.output_id)?.value() {
            if !out_value.is_same_shape(loss_grad) {
                return Err(GraphError::ShapeMismatch {
                    expected: out_value.shape().to_vec(),
                    got: loss_grad.shape().to_vec(),
                    message: "损失梯度种子必须与输出节点的值同形状".to_string(),
                });
            }
        }

        let n = self.all_ids.len();
        let state = PassState::new(n);
        let out_idx = self.index_of[&self.output_id];
        *state.grads[out_idx].lock().unwrap() = Some(loss_grad.clone());

        {
            // 并行阶段：图只读，所有写入都落在趟状态里
            let graph: &Graph = self;
            rayon::scope(|scope| graph.visit_node(scope, &state, out_idx));
        }

        let PassState {
            contrib,
            visited,
            grads,
            processed,
            failures,
        } = state;

        let failures = failures.into_inner().unwrap();
        let mut failed_ids: Vec<NodeId> = failures.iter().map(|(id, _)| *id).collect();
        failed_ids.sort_unstable();
        failed_ids.dedup();
        if failed_ids.len() >= 2 {
            return Err(GraphError::BackwardAggregate(failures));
        }
        if let Some((id, msg)) = failures.first() {
            log::warn!(
                "图[{}]反向传播时节点{}失败（按宽容策略忽略）：{}",
                self.name,
                id,
                msg
            );
        }

        // 提交阶段：把趟状态中累加好的梯度串行写回节点
        for (idx, slot) in grads.into_iter().enumerate() {
            if let Some(grad) = slot.into_inner().unwrap() {
                let id = self.all_ids[idx];
                self.get_node_mut(id)?.accumulate_grad(&grad)?;
            }
        }

        let mut report = BackwardReport {
            processed: processed.into_inner().unwrap(),
            unprocessed: Vec::new(),
            end_reached: false,
        };
        for (idx, id) in self.all_ids.iter().enumerate() {
            if !visited[idx].load(Ordering::SeqCst) {
                report.unprocessed.push((
                    *id,
                    contrib[idx].load(Ordering::SeqCst),
                    self.dep_counts.get(id).copied().unwrap_or(0),
                ));
            }
        }
        let end_idx = self.index_of[&self.backward_end_id];
        report.end_reached = visited[end_idx].load(Ordering::SeqCst);
        self.last_report = Some(report);

        // 末端梯度槽为空表示本趟没有梯度到达输入，按原样返回种子作为无操作信号
        match self.get_node(self.backward_end_id)?.grad() {
            Some(grad) => Ok(grad.clone()),
            None => Ok(loss_grad.clone()),
        }
    }

    /// 处理一个贡献已集齐的节点：逐输入槽算VJP梯度，同一父节点的
    /// 多个槽先在本地求和，再一次性累加进父节点的梯度槽并计一次贡献。
    fn visit_node<'a>(
        &'a self,
        scope: &rayon::Scope<'a>,
        state: &'a PassState,
        idx: usize,
    ) {
        if state.visited[idx].swap(true, Ordering::SeqCst) {
            return;
        }
        let node_id = self.all_ids[idx];
        let Some(node) = self.nodes.get(&node_id) else {
            return;
        };

        let upstream = match state.grads[idx].lock().unwrap().clone() {
            Some(grad) => grad,
            None => return,
        };

        state.processed.lock().unwrap().push(ProcessedNode {
            id: node_id,
            name: node.name().to_string(),
            contributions: state.contrib[idx].load(Ordering::SeqCst),
            dependency_count: self.dep_counts.get(&node_id).copied().unwrap_or(0),
        });

        let parents_ids = node.parents_ids();
        if parents_ids.is_empty() {
            return;
        }

        let mut parent_handles: Vec<&NodeHandle> = Vec::with_capacity(parents_ids.len());
        for pid in parents_ids {
            match self.nodes.get(pid) {
                Some(handle) => parent_handles.push(handle),
                None => {
                    state
                        .failures
                        .lock()
                        .unwrap()
                        .push((node_id, format!("父节点{pid}不存在")));
                    return;
                }
            }
        }

        let mut per_parent: Vec<(NodeId, Tensor)> = Vec::new();
        for (slot, pid) in parents_ids.iter().enumerate() {
            match node.calc_grad_to_parent(slot, &parent_handles, &upstream) {
                Ok(grad) => {
                    if let Some((_, acc)) = per_parent.iter_mut().find(|(id, _)| id == pid) {
                        if acc.is_same_shape(&grad) {
                            *acc += &grad;
                        } else {
                            state.failures.lock().unwrap().push((
                                node_id,
                                format!("对父节点{pid}的多槽梯度形状不一致"),
                            ));
                        }
                    } else {
                        per_parent.push((*pid, grad));
                    }
                }
                Err(err) => {
                    state
                        .failures
                        .lock()
                        .unwrap()
                        .push((node_id, err.to_string()));
                }
            }
        }

        for (pid, grad) in per_parent {
            let pidx = self.index_of[&pid];
            {
                let mut slot = state.grads[pidx].lock().unwrap();
                match slot.as_mut() {
                    Some(acc) if acc.is_same_shape(&grad) => *acc += &grad,
                    Some(_) => {
                        state.failures.lock().unwrap().push((
                            pid,
                            "累计梯度与新贡献形状不一致".to_string(),
                        ));
                        continue;
                    }
                    None => *slot = Some(grad),
                }
            }

            // 原子加一并与依赖计数比较——恰有一个线程观察到相等，由它接力
            let seen = state.contrib[pidx].fetch_add(1, Ordering::SeqCst) + 1;
            let need = self.dep_counts.get(&pid).copied().unwrap_or(0);
            if seen == need {
                scope.spawn(move |inner| self.visit_node(inner, state, pidx));
            }
        }
    }
}
