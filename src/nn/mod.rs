/*
 * @Author       : 老董
 * @Date         : 2026-08-02
 * @Description  : 负责计算图（computation graph）的构建、前向/反向执行与优化器
 */

mod graph;
mod nodes;
pub mod optimizer;

pub use graph::{
    BackwardReport, Graph, GraphError, InputRef, OpKind, OpRecord, Position, ProcessedNode,
    Topology, VisitState,
};
pub use nodes::NodeId;
pub use optimizer::{
    Adam, DirectedAdam, Hyperparams, Optimizer, OptimizerError, ParamId, ParamState, ParamTensor,
    StochasticAdam,
};

#[cfg(test)]
mod tests;
