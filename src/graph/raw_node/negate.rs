/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Negate节点：逐元素取负。
 */

use super::{check_parent_count, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Negate;

impl TraitOp for Negate {
    fn op_name(&self) -> &'static str {
        "negate"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Negate", parent_shapes, 1)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(-parent_values[0])
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        _parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(-upstream)
    }
}
