/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Log节点：逐元素自然对数。
 */

use super::{check_parent_count, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Log;

impl TraitOp for Log {
    fn op_name(&self) -> &'static str {
        "log"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Log", parent_shapes, 1)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_values[0].ln())
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // d(ln x)/dx = 1/x
        Ok(upstream / parent_values[0])
    }
}
