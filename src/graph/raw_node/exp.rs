/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Exp节点：逐元素e^x。
 */

use super::{check_parent_count, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Exp;

impl TraitOp for Exp {
    fn op_name(&self) -> &'static str {
        "exp"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Exp", parent_shapes, 1)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_values[0].exp())
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        _parent_values: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // d(e^x)/dx = e^x，复用已算出的本节点值
        Ok(value * upstream)
    }
}
