/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : 张量的一元运算与归约：取负、exp、ln、sqrt、abs、平方、逐元素map、
 *                 求和与均值。logP表达式的数值核心都由这些运算组成。
 */

use crate::tensor::Tensor;
use std::ops::Neg;

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor {
            data: self.data.map(|x| -x),
        }
    }
}

impl Neg for Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        -&self
    }
}

impl Tensor {
    /// 逐元素e^x
    pub fn exp(&self) -> Tensor {
        self.map(f32::exp)
    }

    /// 逐元素自然对数
    pub fn ln(&self) -> Tensor {
        self.map(f32::ln)
    }

    /// 逐元素平方根
    pub fn sqrt(&self) -> Tensor {
        self.map(f32::sqrt)
    }

    /// 逐元素绝对值
    pub fn abs(&self) -> Tensor {
        self.map(f32::abs)
    }

    /// 逐元素平方
    pub fn square(&self) -> Tensor {
        self.map(|x| x * x)
    }

    /// 逐元素映射
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Tensor {
            data: self.data.map(|&x| f(x)),
        }
    }

    /// 所有元素之和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 所有元素的均值
    pub fn mean(&self) -> f32 {
        self.sum() / self.size() as f32
    }

    /// 两个张量是否逐元素精确相等（含形状）。
    /// 这是IsEqual节点的指示函数语义，用于离散随机变量的退化"密度"。
    pub fn all_equal(&self, other: &Tensor) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}
