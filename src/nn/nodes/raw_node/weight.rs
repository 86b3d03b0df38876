use super::{NodeHandle, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 权重节点：可训练参数。构建图时从权重表解析并注入初值，
/// 训练循环中由优化器在图外更新后通过`set_weight`写回。
#[derive(Clone)]
pub(in crate::nn) struct Weight {
    name: String,
    value: Option<Tensor>,
}

impl Weight {
    pub(in crate::nn) fn new(name: &str, value: &Tensor) -> Result<Self, GraphError> {
        // 权重张量限定为2~4维（矩阵及带批/通道维的扩展形式）
        if !(2..=4).contains(&value.dimension()) {
            return Err(GraphError::InvalidOperation(format!(
                "权重节点[{}]的维度必须在2~4之间，实际为{}维",
                name,
                value.dimension()
            )));
        }
        Ok(Self {
            name: name.to_string(),
            value: Some(value.clone()),
        })
    }
}

impl TraitNode for Weight {
    fn name(&self) -> &str {
        &self.name
    }

    fn calc_value_by_parents(&mut self, _parents: &[&NodeHandle]) -> Result<(), GraphError> {
        // 权重的值在构建或写回时已就位，前向时无需计算
        Ok(())
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        if let (Some(old), Some(new)) = (&self.value, value) {
            if !old.is_same_shape(new) {
                return Err(GraphError::ShapeMismatch {
                    expected: old.shape().to_vec(),
                    got: new.shape().to_vec(),
                    message: format!("{}写回的形状与原形状不一致", self.display_node()),
                });
            }
        }
        self.value = value.cloned();
        Ok(())
    }

    fn clear_value(&mut self) {
        // 权重的值跨步存续，清理步级状态时不清除
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
        format!("权重节点[{}]", self.name)
    }
}
