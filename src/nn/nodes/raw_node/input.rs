use super::{NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 输入节点：值由外部在每次前向前注入，不参与梯度计算链的"生产"端。
#[derive(Clone)]
pub(in crate::nn) struct Input {
    name: String,
    value: Option<Tensor>,
}

impl Input {
    pub(in crate::nn) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

impl TraitNode for Input {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_value_by_parents(&mut self, _parents: &[&NodeHandle]) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}的值应由外部注入，而不是由父节点计算",
            self.display_node()
        )))
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        self.value = value.cloned();
        Ok(())
    }

    fn clear_value(&mut self) {
        self.value = None;
    }

    fn calc_grad_to_parent(
        &self,
        _target_slot: usize,
        _parents: &[&NodeHandle],
        _upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}没有父节点，不该计算对父节点的梯度",
            self.display_node()
        )))
    }

    fn display_node(&self) -> String {
        format!("输入节点[{}]", self.name)
    }
}
