/*
 * @Author       : 老董
 * @Date         : 2026-08-24
 * @Description  : 张量的逐元素二元运算：加、减与Hadamard乘。三种运算的实现
 *                 矩阵完全同构（纯数与张量互算、张量与张量互算并支持 NumPy
 *                 风格广播、引用与所有权各形式齐备），统一由宏生成。
 *                 注意：这里的乘法不是线性代数中的矩阵乘法，矩阵乘法请使用`mat_mul`。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::ArrayD;
use std::ops::{Add, Mul, Sub};

macro_rules! elementwise_op {
    ($trait_:ident, $method:ident, $op:tt, $operator:expr) => {
        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓f32与（不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl $trait_<Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: Tensor) -> Tensor {
                Tensor {
                    data: self $op &tensor.data,
                }
            }
        }
        impl<'a> $trait_<&'a Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: &'a Tensor) -> Tensor {
                Tensor {
                    data: self $op &tensor.data,
                }
            }
        }
        impl $trait_<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor {
                    data: &self.data $op scalar,
                }
            }
        }
        impl $trait_<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor {
                    data: &self.data $op scalar,
                }
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑f32与（不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量之间↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl $trait_ for Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                broadcast_op(&self, &other, $operator, |a, b| a $op b)
            }
        }
        impl<'a> $trait_<&'a Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: &'a Tensor) -> Tensor {
                broadcast_op(&self, other, $operator, |a, b| a $op b)
            }
        }
        impl $trait_<Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                broadcast_op(self, &other, $operator, |a, b| a $op b)
            }
        }
        impl<'b> $trait_<&'b Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: &'b Tensor) -> Tensor {
                broadcast_op(self, other, $operator, |a, b| a $op b)
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量之间↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    };
}

elementwise_op!(Add, add, +, Operator::Add);
elementwise_op!(Sub, sub, -, Operator::Sub);
elementwise_op!(Mul, mul, *, Operator::Mul);

/// 两个张量的逐元素运算，支持 NumPy 风格广播（broadcasting）
///
/// # Panics
/// 如果形状不兼容（无法广播）
fn broadcast_op(
    tensor_1: &Tensor,
    tensor_2: &Tensor,
    operator: Operator,
    apply: impl Fn(&ArrayD<f32>, &ArrayD<f32>) -> ArrayD<f32>,
) -> Tensor {
    assert!(
        tensor_1.can_broadcast_with(tensor_2),
        "{}",
        TensorError::OperatorError {
            operator,
            tensor1_shape: tensor_1.shape().to_vec(),
            tensor2_shape: tensor_2.shape().to_vec(),
        }
    );
    Tensor {
        data: apply(&tensor_1.data, &tensor_2.data),
    }
}
