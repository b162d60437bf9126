/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : 张量乘法：两个同形状张量逐元素相乘（Hadamard积），或张量与纯数相乘。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::Mul;

fn check_same_shape(a: &Tensor, b: &Tensor) {
    assert!(
        a.shape() == b.shape(),
        "{}",
        TensorError::OperatorError {
            operator: Operator::Mul,
            tensor1_shape: a.shape().to_vec(),
            tensor2_shape: b.shape().to_vec(),
        }
    );
}

impl Mul for &Tensor {
    type Output = Tensor;

    fn mul(self, rhs: &Tensor) -> Tensor {
        check_same_shape(self, rhs);
        Tensor {
            data: &self.data * &rhs.data,
        }
    }
}

impl Mul for Tensor {
    type Output = Tensor;

    fn mul(self, rhs: Tensor) -> Tensor {
        &self * &rhs
    }
}

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data * scalar,
        }
    }
}

impl Mul<f32> for Tensor {
    type Output = Tensor;

    fn mul(self, scalar: f32) -> Tensor {
        &self * scalar
    }
}

impl Mul<&Tensor> for f32 {
    type Output = Tensor;

    fn mul(self, tensor: &Tensor) -> Tensor {
        tensor * self
    }
}

impl Mul<Tensor> for f32 {
    type Output = Tensor;

    fn mul(self, tensor: Tensor) -> Tensor {
        &tensor * self
    }
}
