use super::{check_slot, parent_value, NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 恒等算子：z = a。用于时序拓扑中跨层/跨时间步的值转发。
#[derive(Clone)]
pub(in crate::nn) struct Identity {
    name: String,
    value: Option<Tensor>,
}

impl Identity {
    pub(in crate::nn) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

impl TraitNode for Identity {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<(), GraphError> {
        let a = parent_value(parents, 0, &self.display_node())?;
        self.value = Some(a.clone());
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
        Ok(upstream_grad.clone())
    }
}
