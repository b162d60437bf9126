/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Multiply节点：逐元素乘法（Hadamard积）。
 *                 两个父节点形状必须相同，输出形状与输入相同。
 */

use super::{check_parent_count, check_same_shapes, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Multiply;

impl TraitOp for Multiply {
    fn op_name(&self) -> &'static str {
        "multiply"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("Multiply", parent_shapes, 2)?;
        check_same_shapes("Multiply", parent_shapes)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_values[0] * parent_values[1])
    }

    fn grad_to_parent(
        &self,
        parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // d(a⊙b)/da = b，d(a⊙b)/db = a
        let other = parent_values[1 - parent_ix];
        Ok(other * upstream)
    }
}
