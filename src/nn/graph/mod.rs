/*
 * @Author       : 老董
 * @Date         : 2026-08-04
 * @Description  : 计算图：声明式拓扑构建 + 顺序前向 + 依赖计数并行反向
 */

mod error;
mod inner;
mod types;

pub use error::GraphError;
pub use inner::Graph;
pub use types::{
    BackwardReport, InputRef, OpKind, OpRecord, Position, ProcessedNode, Topology, VisitState,
};
