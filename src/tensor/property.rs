/*
 * @Author       : 老董
 * @Date         : 2026-08-02
 * @Description  : 本类仅包含一些属性方法，不包含任何运算方法，所以不会需要用到mut
 */

use super::Tensor;

impl Tensor {
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]。
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维（dim）数、阶（rank）数
    /// 即`shape()`的元素个数--如：形状为`[]`的标量阶数为0，向量阶数为1，矩阵阶数为2，以此类推
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 判断两个张量的形状是否严格一致。如：形状为 [1, 4]，[1, 4]和[4]是不一致的，会返回false
    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 判断张量是否为标量
    pub fn is_scalar(&self) -> bool {
        self.shape().is_empty() || self.shape().iter().all(|x| *x == 1)
    }

    /// 转化为纯数（number）。若为标量，则返回Some(number)，否则返回None
    pub fn number(&self) -> Option<f32> {
        if self.is_scalar() {
            self.data.iter().next().copied()
        } else {
            None
        }
    }

    /// 判断张量是否所有元素均为零（反向传播的“零种子短路”用）
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0.0)
    }

    /// 判断张量是否所有元素均为有限值（NaN/Inf检测用）
    pub fn is_all_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// 以行优先顺序返回底层数据的切片
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().unwrap()
    }

    /// 以行优先顺序返回底层数据的可变切片
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        self.data.as_slice_mut().unwrap()
    }

    /// 判断两个张量是否可以广播（NumPy 广播规则：从右向左对齐，维度相等或其中一个为1）
    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        let mut lhs = self.shape().iter().rev();
        let mut rhs = other.shape().iter().rev();
        loop {
            match (lhs.next(), rhs.next()) {
                (Some(&a), Some(&b)) => {
                    if a != b && a != 1 && b != 1 {
                        return false;
                    }
                }
                _ => return true,
            }
        }
    }
}
