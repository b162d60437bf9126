/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Square节点：逐元素平方。正态logP中的(x-μ)²项由它构成。
 */

use super::{check_parent_count, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Square;

impl TraitOp for Square {
    fn op_name(&self) -> &'static str {
        "square"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Square", parent_shapes, 1)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_values[0].square())
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // d(x²)/dx = 2x
        Ok(&(parent_values[0] * 2.0) * upstream)
    }
}
