use super::{check_slot, parent_value, NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 逐元素sigmoid激活：z = 1 / (1 + e^(-a))
#[derive(Clone)]
pub(in crate::nn) struct Sigmoid {
    name: String,
    value: Option<Tensor>,
}

impl Sigmoid {
    pub(in crate::nn) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

impl TraitNode for Sigmoid {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<(), GraphError> {
        let a = parent_value(parents, 0, &self.display_node())?;
        self.value = Some(a.sigmoid());
        Ok(())
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn clear_value(&mut self) {
        self.value = None;
    }

    fn calc_grad_to_parent(
        &self,
        target_slot: usize,
        _parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        check_slot(target_slot, 1, &self.display_node())?;
        // 利用前向缓存的输出值：σ'(a) = σ(a)·(1-σ(a))
        let s = self.value.as_ref().ok_or_else(|| {
            GraphError::ComputationError(format!("{}的值尚未计算", self.display_node()))
        })?;
        Ok(upstream_grad * &(s * &(1.0 - s)))
    }
}
