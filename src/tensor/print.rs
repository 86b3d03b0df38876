use super::Tensor;
use std::fmt;

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "形状: {:?}", self.shape())?;
        writeln!(f, "{:.4}", self.data)
    }
}
