//! # Graph Grad
//!
//! `graph_grad`是一个纯rust实现的反向模式自动微分（reverse-mode autodiff）运行时：
//! 由声明式拓扑描述一次性构建算子图，前向按声明顺序执行，
//! 反向用“依赖计数”调度器保证每个节点的梯度在所有消费者贡献到齐后才被传播（独立分支可并行），
//! 最后由 Adam 系列优化器（标准 / 可逆的 Directed / 范数受限的 Stochastic）更新权重。
//!

pub mod errors;
pub mod nn;
pub mod tensor;
