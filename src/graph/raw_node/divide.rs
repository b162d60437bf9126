/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Divide节点：逐元素除法（left / right）。
 */

use super::{check_parent_count, check_same_shapes, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Divide;

impl TraitOp for Divide {
    fn op_name(&self) -> &'static str {
        "divide"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Divide", parent_shapes, 2)?;
        check_same_shapes("Divide", parent_shapes)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_values[0] / parent_values[1])
    }

    fn grad_to_parent(
        &self,
        parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let (a, b) = (parent_values[0], parent_values[1]);
        if parent_ix == 0 {
            // d(a/b)/da = 1/b
            Ok(upstream / b)
        } else {
            // d(a/b)/db = -a/b²
            Ok(-&(&(a * upstream) / &b.square()))
        }
    }
}
