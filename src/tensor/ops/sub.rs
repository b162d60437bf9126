/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : 张量减法：两个同形状张量逐元素相减，或张量与纯数相减。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::Sub;

fn check_same_shape(a: &Tensor, b: &Tensor) {
    assert!(
        a.shape() == b.shape(),
        "{}",
        TensorError::OperatorError {
            operator: Operator::Sub,
            tensor1_shape: a.shape().to_vec(),
            tensor2_shape: b.shape().to_vec(),
        }
    );
}

impl Sub for &Tensor {
    type Output = Tensor;

    fn sub(self, rhs: &Tensor) -> Tensor {
        check_same_shape(self, rhs);
        Tensor {
            data: &self.data - &rhs.data,
        }
    }
}

impl Sub for Tensor {
    type Output = Tensor;

    fn sub(self, rhs: Tensor) -> Tensor {
        &self - &rhs
    }
}

impl Sub<f32> for &Tensor {
    type Output = Tensor;

    fn sub(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data - scalar,
        }
    }
}

impl Sub<f32> for Tensor {
    type Output = Tensor;

    fn sub(self, scalar: f32) -> Tensor {
        &self - scalar
    }
}

impl Sub<&Tensor> for f32 {
    type Output = Tensor;

    fn sub(self, tensor: &Tensor) -> Tensor {
        Tensor {
            data: tensor.data.map(|x| self - x),
        }
    }
}

impl Sub<Tensor> for f32 {
    type Output = Tensor;

    fn sub(self, tensor: Tensor) -> Tensor {
        self - &tensor
    }
}
