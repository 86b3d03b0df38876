use super::{check_slot, parent_value, NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 矩阵乘法：z = a · b（a为[m,k]，b为[k,n]）
#[derive(Clone)]
pub(in crate::nn) struct MatMul {
    name: String,
    value: Option<Tensor>,
}

impl MatMul {
    pub(in crate::nn) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }
}

impl TraitNode for MatMul {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_value_by_parents(&mut self, parents: &[&NodeHandle]) -> Result<(), GraphError> {
        let a = parent_value(parents, 0, &self.display_node())?;
        let b = parent_value(parents, 1, &self.display_node())?;
        if a.dimension() != 2 || b.dimension() != 2 {
            return Err(GraphError::InvalidOperation(format!(
                "{}的两个父节点的值必须都是2维矩阵",
                self.display_node()
            )));
        }
        if a.shape()[1] != b.shape()[0] {
            return Err(GraphError::ShapeMismatch {
                expected: a.shape().to_vec(),
                got: b.shape().to_vec(),
                message: format!("{}要求前者的列数等于后者的行数", self.display_node()),
            });
        }
        self.value = Some(a.mat_mul(b));
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
        parents: &[&NodeHandle],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        check_slot(target_slot, 2, &self.display_node())?;
        // ∂L/∂a = 上游梯度 · bᵀ；∂L/∂b = aᵀ · 上游梯度
        if target_slot == 0 {
            let b = parent_value(parents, 1, &self.display_node())?;
            Ok(upstream_grad.mat_mul(&b.transpose()))
        } else {
            let a = parent_value(parents, 0, &self.display_node())?;
            Ok(a.transpose().mat_mul(upstream_grad))
        }
    }
}
