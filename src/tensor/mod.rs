/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : 二维张量（length × width）。
 *                 本引擎中节点的值与梯度都是二维张量：[1,1]表示标量，[1,n]表示行向量，
 *                 [n,m]表示矩阵。随机变量的取值约定为行向量[1,d]。
 */

use ndarray::Array2;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::Rng;

use crate::errors::TensorError;

mod ops {
    pub mod add;
    pub mod div;
    pub mod mul;
    pub mod others;
    pub mod sub;
}

mod print;

#[cfg(test)]
pub mod tests;

/// 二维张量：所有构造函数都要求`shape`为`[length, width]`两个元素。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Array2<f32>,
}

impl Tensor {
    /// 创建一个张量。`data`按行主序排列，长度必须等于`length * width`。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        let (l, w) = Self::check_shape(shape);
        assert!(
            data.len() == l * w,
            "{}",
            TensorError::DataLenShapeMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
            }
        );
        Tensor {
            data: Array2::from_shape_vec((l, w), data.to_vec()).unwrap(),
        }
    }

    /// 创建全零张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        let (l, w) = Self::check_shape(shape);
        Tensor {
            data: Array2::zeros((l, w)),
        }
    }

    /// 创建全一张量
    pub fn ones(shape: &[usize]) -> Tensor {
        let (l, w) = Self::check_shape(shape);
        Tensor {
            data: Array2::ones((l, w)),
        }
    }

    /// 创建元素全为`v`的张量
    pub fn fill(v: f32, shape: &[usize]) -> Tensor {
        let (l, w) = Self::check_shape(shape);
        Tensor {
            data: Array2::from_elem((l, w), v),
        }
    }

    /// 创建形状为[1,1]的标量张量
    pub fn scalar(v: f32) -> Tensor {
        Tensor::fill(v, &[1, 1])
    }

    /// 由切片创建形状为[1,n]的行向量
    pub fn from_row(data: &[f32]) -> Tensor {
        Tensor::new(data, &[1, data.len()])
    }

    /// 创建一个均匀分布的随机张量，其值在[min, max)区间（使用全局RNG）
    pub fn uniform(min: f32, max: f32, shape: &[usize]) -> Tensor {
        let mut rng = rand::thread_rng();
        Self::uniform_with(min, max, shape, &mut rng)
    }

    /// 创建一个均匀分布的随机张量（使用指定RNG）
    pub fn uniform_with_rng(min: f32, max: f32, shape: &[usize], rng: &mut StdRng) -> Tensor {
        Self::uniform_with(min, max, shape, rng)
    }

    fn uniform_with<R: Rng>(min: f32, max: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let (l, w) = Self::check_shape(shape);
        let uniform = Uniform::new(min, max);
        let data = (0..l * w).map(|_| uniform.sample(rng)).collect::<Vec<_>>();
        Tensor::new(&data, &[l, w])
    }

    /// 创建服从正态分布的随机张量（使用全局RNG）
    pub fn normal(mean: f32, std_dev: f32, shape: &[usize]) -> Tensor {
        let mut rng = rand::thread_rng();
        Self::normal_with(mean, std_dev, shape, &mut rng)
    }

    /// 创建服从正态分布的随机张量（使用指定RNG，保证可重复性）
    pub fn normal_with_rng(mean: f32, std_dev: f32, shape: &[usize], rng: &mut StdRng) -> Tensor {
        Self::normal_with(mean, std_dev, shape, rng)
    }

    // Box-Muller变换；丢弃非有限值
    fn normal_with<R: Rng>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let (l, w) = Self::check_shape(shape);
        let data_len = l * w;
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.gen_range(0.0..1.0);
            let u2: f32 = rng.gen_range(0.0..1.0);
            let r = (-2.0 * u1.max(f32::MIN_POSITIVE).ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Tensor::new(&data, &[l, w])
    }

    fn check_shape(shape: &[usize]) -> (usize, usize) {
        assert!(
            shape.len() == 2 && shape[0] > 0 && shape[1] > 0,
            "{}",
            TensorError::ShapeMustBe2D {
                shape: shape.to_vec(),
            }
        );
        (shape[0], shape[1])
    }
}

// 访问器
impl Tensor {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 行数（PLearn术语中的length）
    pub fn length(&self) -> usize {
        self.data.nrows()
    }

    /// 列数（PLearn术语中的width）
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.size() == 1
    }

    pub fn to_scalar(&self) -> Option<f32> {
        if self.is_scalar() {
            Some(self.data[(0, 0)])
        } else {
            None
        }
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, v: f32) {
        self.data[(row, col)] = v;
    }

    /// 按行主序展平的只读视图
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().unwrap()
    }

    /// 按行主序展平的可写视图
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        self.data.as_slice_mut().unwrap()
    }

    pub(crate) fn data(&self) -> &Array2<f32> {
        &self.data
    }

    pub(crate) fn from_array(data: Array2<f32>) -> Tensor {
        Tensor { data }
    }
}
