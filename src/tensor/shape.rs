use super::Tensor;
use crate::errors::TensorError;
use ndarray::IxDyn;

impl Tensor {
    /// 转置一个2阶张量（矩阵）。非2阶张量会触发panic。
    pub fn transpose(&self) -> Tensor {
        assert!(self.dimension() == 2, "只有2阶张量（矩阵）才能转置");
        let view = self
            .data
            .view()
            .into_dimensionality::<ndarray::Ix2>()
            .unwrap();
        Tensor {
            data: view.t().to_owned().into_dyn(),
        }
    }

    /// 改变张量的形状（元素总数必须保持不变），返回新张量。
    pub fn reshape(&self, shape: &[usize]) -> Tensor {
        assert!(
            self.size() == shape.iter().product::<usize>(),
            "{}",
            TensorError::IncompatibleShape
        );
        let data = self.data.clone().into_shape(IxDyn(shape)).unwrap();
        Tensor { data }
    }

    /// 将张量展平为形状[1, n]的行向量。
    pub fn flatten(&self) -> Tensor {
        self.reshape(&[1, self.size()])
    }
}
