use crate::tensor::Tensor;
use std::cmp::PartialEq;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Tensor::new(&[scalar], &[1])
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Tensor {
    /// 对张量中的所有元素求和并返回一个形状为[1]的标量。
    pub fn sum(&self) -> Tensor {
        Tensor::from(self.data.iter().sum::<f32>())
    }

    /// 返回张量所有元素的算术平均值（纯数）。空张量会触发panic。
    pub fn mean(&self) -> f32 {
        assert!(self.size() > 0, "空张量没有平均值");
        self.data.iter().sum::<f32>() / self.size() as f32
    }

    /// 逐元素取绝对值，返回新张量。
    pub fn abs(&self) -> Tensor {
        Tensor {
            data: self.data.mapv(f32::abs),
        }
    }

    /// 逐元素开平方，返回新张量。
    pub fn sqrt(&self) -> Tensor {
        Tensor {
            data: self.data.mapv(f32::sqrt),
        }
    }

    /// 逐元素裁剪到[min, max]区间，返回新张量。
    pub fn clamp(&self, min: f32, max: f32) -> Tensor {
        Tensor {
            data: self.data.mapv(|x| x.clamp(min, max)),
        }
    }

    /// 逐元素计算 sigmoid(x) = 1 / (1 + e^(-x))，返回新张量。
    pub fn sigmoid(&self) -> Tensor {
        Tensor {
            data: self.data.mapv(|x| 1.0 / (1.0 + (-x).exp())),
        }
    }

    /// 逐元素计算 tanh(x)，返回新张量。
    pub fn tanh(&self) -> Tensor {
        Tensor {
            data: self.data.mapv(f32::tanh),
        }
    }

    /// Frobenius 范数：所有元素平方和的平方根，作为张量整体幅度的度量。
    pub fn frobenius_norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}
