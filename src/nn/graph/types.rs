/*
 * @Author       : 老董
 * @Date         : 2026-08-04
 * @Description  : 拓扑描述与反向传播报告的公开类型
 */

use crate::nn::nodes::raw_node::{
    Add, Identity, MatMul, Multiply, NodeType, Sigmoid, Subtract, Tanh,
};
use crate::nn::NodeId;
use std::fmt;

/// 算子种类的封闭枚举。每种算子的输入槽数量（元数）固定，
/// 新增算子只需在此处和节点注册表中各加一个分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Subtract,
    Multiply,
    MatMul,
    Sigmoid,
    Tanh,
    Identity,
}

impl OpKind {
    /// 该算子的输入槽数量
    pub fn arity(&self) -> usize {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::MatMul => 2,
            Self::Sigmoid | Self::Tanh | Self::Identity => 1,
        }
    }

    pub(in crate::nn) fn instantiate(&self, name: &str) -> NodeType {
        match self {
            Self::Add => NodeType::Add(Add::new(name)),
            Self::Subtract => NodeType::Subtract(Subtract::new(name)),
            Self::Multiply => NodeType::Multiply(Multiply::new(name)),
            Self::MatMul => NodeType::MatMul(MatMul::new(name)),
            Self::Sigmoid => NodeType::Sigmoid(Sigmoid::new(name)),
            Self::Tanh => NodeType::Tanh(Tanh::new(name)),
            Self::Identity => NodeType::Identity(Identity::new(name)),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::MatMul => "mat_mul",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Identity => "identity",
        };
        write!(f, "{s}")
    }
}

/// 算子在时序展开拓扑中的逻辑坐标（时间步×层）。
/// 不参与执行，只供输入查找器和自动命名使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub time_step: usize,
    pub layer: usize,
}

impl Position {
    pub fn new(time_step: usize, layer: usize) -> Self {
        Self { time_step, layer }
    }
}

/// 算子的一个输入引用：要么按名字直接指定，
/// 要么在构建时根据本算子的逻辑坐标动态查找（如"上一时间步同层的输出"）。
pub enum InputRef {
    Named(String),
    Finder(Box<dyn Fn(&Position) -> Option<String> + Send + Sync>),
}

impl InputRef {
    pub fn named(name: &str) -> Self {
        Self::Named(name.to_string())
    }

    pub fn finder<F>(f: F) -> Self
    where
        F: Fn(&Position) -> Option<String> + Send + Sync + 'static,
    {
        Self::Finder(Box::new(f))
    }
}

impl fmt::Debug for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "Named({name})"),
            Self::Finder(_) => write!(f, "Finder(..)"),
        }
    }
}

/// 拓扑中一条算子记录的声明。输入按槽顺序排列，
/// `output`为空字符串时构建阶段按"种类_时间步_层"自动命名。
#[derive(Debug)]
pub struct OpRecord {
    pub kind: OpKind,
    pub inputs: Vec<InputRef>,
    pub output: String,
    pub position: Position,
    /// 前向计算后是否将该算子的输出值导出到中间结果表
    pub export: bool,
}

impl OpRecord {
    pub fn new(kind: OpKind, inputs: &[&str], output: &str) -> Self {
        Self {
            kind,
            inputs: inputs.iter().map(|s| InputRef::named(s)).collect(),
            output: output.to_string(),
            position: Position::default(),
            export: false,
        }
    }

    /// 以输入引用列表（含查找器）构造
    pub fn with_inputs(kind: OpKind, inputs: Vec<InputRef>, output: &str) -> Self {
        Self {
            kind,
            inputs,
            output: output.to_string(),
            position: Position::default(),
            export: false,
        }
    }

    pub fn at(mut self, time_step: usize, layer: usize) -> Self {
        self.position = Position::new(time_step, layer);
        self
    }

    pub fn exported(mut self) -> Self {
        self.export = true;
        self
    }
}

/// 计算图的声明式描述：起始/结束节点名 + 算子记录列表。
/// 描述与执行分离，同一份拓扑可用不同权重表反复构建。
#[derive(Debug)]
pub struct Topology {
    pub input: String,
    pub output: String,
    pub records: Vec<OpRecord>,
}

impl Topology {
    pub fn new(input: &str, output: &str) -> Self {
        Self {
            input: input.to_string(),
            output: output.to_string(),
            records: Vec::new(),
        }
    }

    pub fn record(mut self, record: OpRecord) -> Self {
        self.records.push(record);
        self
    }
}

/// 节点在一趟反向传播中的访问状态（事后由报告推导）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    /// 尚未收到任何梯度贡献
    Pending,
    /// 已收到部分贡献，但未集齐
    Accumulating,
    /// 贡献已集齐，待处理
    Ready,
    /// 已处理完毕
    Visited,
}

/// 一趟反向传播中被处理节点的快照
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedNode {
    pub id: NodeId,
    pub name: String,
    /// 处理时刻已累计的梯度贡献数
    pub contributions: usize,
    /// 构建期算出的依赖计数（指向输出的去重后继数）
    pub dependency_count: usize,
}

/// 一趟反向传播的执行报告，供诊断与依赖健全性检查使用
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackwardReport {
    pub processed: Vec<ProcessedNode>,
    /// 未被处理节点的(id, 已收到贡献数, 依赖计数)
    pub unprocessed: Vec<(NodeId, usize, usize)>,
    /// 反向末端（输入节点）是否被触达
    pub end_reached: bool,
}
