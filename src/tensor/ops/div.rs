/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : 张量除法：两个同形状张量逐元素相除，或张量与纯数相除。
 *                 注：除数中的零元素不做防御，调用方（如EM更新）须自行用denom>0守卫。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::Div;

fn check_same_shape(a: &Tensor, b: &Tensor) {
    assert!(
        a.shape() == b.shape(),
        "{}",
        TensorError::OperatorError {
            operator: Operator::Div,
            tensor1_shape: a.shape().to_vec(),
            tensor2_shape: b.shape().to_vec(),
        }
    );
}

impl Div for &Tensor {
    type Output = Tensor;

    fn div(self, rhs: &Tensor) -> Tensor {
        check_same_shape(self, rhs);
        Tensor {
            data: &self.data / &rhs.data,
        }
    }
}

impl Div for Tensor {
    type Output = Tensor;

    fn div(self, rhs: Tensor) -> Tensor {
        &self / &rhs
    }
}

impl Div<f32> for &Tensor {
    type Output = Tensor;

    fn div(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data / scalar,
        }
    }
}

impl Div<f32> for Tensor {
    type Output = Tensor;

    fn div(self, scalar: f32) -> Tensor {
        &self / scalar
    }
}

impl Div<&Tensor> for f32 {
    type Output = Tensor;

    fn div(self, tensor: &Tensor) -> Tensor {
        Tensor {
            data: tensor.data.map(|x| self / x),
        }
    }
}

impl Div<Tensor> for f32 {
    type Output = Tensor;

    fn div(self, tensor: Tensor) -> Tensor {
        self / &tensor
    }
}
