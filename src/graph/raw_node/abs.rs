/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Abs节点：逐元素绝对值。零点处的梯度按0处理。
 */

use super::{check_parent_count, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Abs;

impl TraitOp for Abs {
    fn op_name(&self) -> &'static str {
        "abs"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Abs", parent_shapes, 1)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_values[0].abs())
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let sign = parent_values[0].map(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        });
        Ok(&sign * upstream)
    }
}
