/*
 * @Author       : 老董
 * @Date         : 2026-08-02
 * @Description  : 张量的自相乘（*=），逐元素，形状必须严格一致（或乘纯数）。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::MulAssign;

impl MulAssign<f32> for Tensor {
    fn mul_assign(&mut self, scalar: f32) {
        self.data *= scalar;
    }
}

impl MulAssign<&Tensor> for Tensor {
    fn mul_assign(&mut self, other: &Tensor) {
        assert!(
            self.is_same_shape(other),
            "{}",
            TensorError::OperatorError {
                operator: Operator::MulAssign,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        );
        self.data *= &other.data;
    }
}

impl MulAssign for Tensor {
    fn mul_assign(&mut self, other: Tensor) {
        *self *= &other;
    }
}
