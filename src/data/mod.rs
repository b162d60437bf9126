/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 训练数据的行式访问抽象（VMat）。
 *                 EM训练器只按行取数据，不关心数据存放在哪里；
 *                 `MemoryVMat`是最常用的内存实现（持有一个二维张量）。
 */

use crate::graph::GraphError;
use crate::tensor::Tensor;

/// 行式数据集：`length`行、每行`width`个f32。
pub trait VMat {
    /// 数据集的行数（样本数）
    fn length(&self) -> usize;

    /// 每行的元素个数
    fn width(&self) -> usize;

    /// 把第`i`行拷贝进`out`。`out`的长度必须等于`width()`。
    fn get_row(&self, i: usize, out: &mut [f32]) -> Result<(), GraphError>;
}

/// 内存数据集：持有一个[length, width]的张量
pub struct MemoryVMat {
    data: Tensor,
}

impl MemoryVMat {
    pub fn new(data: Tensor) -> Self {
        Self { data }
    }

    /// 由行主序切片构造
    pub fn from_rows(data: &[f32], length: usize, width: usize) -> Self {
        Self {
            data: Tensor::new(data, &[length, width]),
        }
    }

    pub fn data(&self) -> &Tensor {
        &self.data
    }
}

impl VMat for MemoryVMat {
    fn length(&self) -> usize {
        self.data.length()
    }

    fn width(&self) -> usize {
        self.data.width()
    }

    fn get_row(&self, i: usize, out: &mut [f32]) -> Result<(), GraphError> {
        if i >= self.length() {
            return Err(GraphError::InvalidOperation(format!(
                "数据集只有{}行，无法访问第{}行",
                self.length(),
                i
            )));
        }
        if out.len() != self.width() {
            return Err(GraphError::DimensionMismatch {
                expected: self.width(),
                got: out.len(),
                message: "get_row的缓冲区长度与数据集宽度不一致".to_string(),
            });
        }
        for (j, v) in out.iter_mut().enumerate() {
            *v = self.data.get(i, j);
        }
        Ok(())
    }
}
