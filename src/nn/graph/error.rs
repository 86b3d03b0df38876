use crate::nn::NodeId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("图中不存在节点{0}")]
    NodeNotFound(NodeId),

    #[error("图中不存在名为[{0}]的节点")]
    NodeNameNotFound(String),

    #[error("节点名[{0}]在图中重复")]
    DuplicateNodeName(String),

    #[error("拓扑描述非法：{0}")]
    InvalidTopology(String),

    #[error("节点[{node}]的输入[{input}]无法解析：既不是已登记算子的输出，也不在权重表中")]
    UnresolvedInput { node: String, input: String },

    #[error("非法操作：{0}")]
    InvalidOperation(String),

    #[error("形状不匹配（期望{expected:?}，实际{got:?}）：{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    #[error("计算错误：{0}")]
    ComputationError(String),

    /// 同一趟反向传播中有2个及以上不同节点失败，按聚合错误上报
    #[error("反向传播中有{count}个节点失败：{0:?}", count = .0.len())]
    BackwardAggregate(Vec<(NodeId, String)>),
}
