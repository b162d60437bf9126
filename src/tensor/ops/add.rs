/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : 张量加法：两个同形状张量逐元素相加，或张量与纯数相加。
 *                 形状不一致时panic（图层构造时已校验，这里视为编程错误）。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::Add;

fn check_same_shape(a: &Tensor, b: &Tensor, op: Operator) {
    assert!(
        a.shape() == b.shape(),
        "{}",
        TensorError::OperatorError {
            operator: op,
            tensor1_shape: a.shape().to_vec(),
            tensor2_shape: b.shape().to_vec(),
        }
    );
}

impl Add for &Tensor {
    type Output = Tensor;

    fn add(self, rhs: &Tensor) -> Tensor {
        check_same_shape(self, rhs, Operator::Add);
        Tensor {
            data: &self.data + &rhs.data,
        }
    }
}

impl Add for Tensor {
    type Output = Tensor;

    fn add(self, rhs: Tensor) -> Tensor {
        &self + &rhs
    }
}

impl Add<f32> for &Tensor {
    type Output = Tensor;

    fn add(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data + scalar,
        }
    }
}

impl Add<f32> for Tensor {
    type Output = Tensor;

    fn add(self, scalar: f32) -> Tensor {
        &self + scalar
    }
}

impl Add<&Tensor> for f32 {
    type Output = Tensor;

    fn add(self, tensor: &Tensor) -> Tensor {
        tensor + self
    }
}

impl Add<Tensor> for f32 {
    type Output = Tensor;

    fn add(self, tensor: Tensor) -> Tensor {
        &tensor + self
    }
}
