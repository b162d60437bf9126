/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Slice节点：从行向量[1,w]中截取[offset, offset+len)的子段
 *                 （Concat的逆运算；联合随机变量按成员拆分观测值时使用）。
 */

use super::{check_parent_count, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Slice {
    offset: usize,
    len: usize,
}

impl Slice {
    pub(crate) fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }
}

impl TraitOp for Slice {
    fn op_name(&self) -> &'static str {
        "slice"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Slice", parent_shapes, 1)?;
        let shape = parent_shapes[0];
        if shape[0] != 1 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![1, shape[1]],
                got: shape.to_vec(),
                message: "Slice节点的父节点必须是行向量[1,w]".to_string(),
            });
        }
        if self.len == 0 || self.offset + self.len > shape[1] {
            return Err(GraphError::InvalidOperation(format!(
                "Slice区间[{}, {})超出父节点宽度{}",
                self.offset,
                self.offset + self.len,
                shape[1]
            )));
        }
        Ok(vec![1, self.len])
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        let src = parent_values[0].as_slice();
        Ok(Tensor::from_row(&src[self.offset..self.offset + self.len]))
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // 上游梯度嵌回父节点对应位置，其余元素为0
        let mut grad = Tensor::zeros(parent_values[0].shape());
        grad.as_slice_mut()[self.offset..self.offset + self.len]
            .copy_from_slice(upstream.as_slice());
        Ok(grad)
    }
}
