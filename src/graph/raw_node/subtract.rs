/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Subtract节点：逐元素减法（left - right）。
 */

use super::{check_parent_count, check_same_shapes, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Subtract;

impl TraitOp for Subtract {
    fn op_name(&self) -> &'static str {
        "subtract"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Subtract", parent_shapes, 2)?;
        check_same_shapes("Subtract", parent_shapes)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_values[0] - parent_values[1])
    }

    fn grad_to_parent(
        &self,
        parent_ix: usize,
        _parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if parent_ix == 0 {
            Ok(upstream.clone())
        } else {
            Ok(-upstream)
        }
    }
}
