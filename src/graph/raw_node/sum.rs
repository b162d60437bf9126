/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Sum节点：所有元素求和，输出[1,1]标量。
 */

use super::{check_parent_count, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Sum;

impl TraitOp for Sum {
    fn op_name(&self) -> &'static str {
        "sum"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Sum", parent_shapes, 1)?;
        Ok(vec![1, 1])
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(Tensor::scalar(parent_values[0].sum()))
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // 标量上游梯度广播回父节点形状
        let g = upstream.to_scalar().ok_or_else(|| {
            GraphError::ComputationError("Sum节点的上游梯度应为[1,1]标量".to_string())
        })?;
        Ok(Tensor::fill(g, parent_values[0].shape()))
    }
}
