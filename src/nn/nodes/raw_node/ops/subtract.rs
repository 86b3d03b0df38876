use super::{check_same_shape, check_slot, parent_value, NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 逐元素减法：z = a - b
#[derive(Clone)]
pub(in crate::nn) struct Subtract {
    name: String,
    value: Option<Tensor>,
}

impl Subtract {
    pub(in crate::nn) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

impl TraitNode for Subtract {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<(), GraphError> {
        let a = parent_value(parents, 0, &self.display_node())?;
        let b = parent_value(parents, 1, &self.display_node())?;
        check_same_shape(a, b, &self.display_node())?;
        self.value = Some(a - b);
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
        check_slot(target_slot, 2, &self.display_node())?;
        if target_slot == 0 {
            Ok(upstream_grad.clone())
        } else {
            Ok(upstream_grad * -1.0)
        }
    }
}
