/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Add节点：n元逐元素加法（变长父节点列表的代表算子）。
 *                 所有父节点形状必须相同，输出形状与输入相同。
 */

use super::{check_same_shapes, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Add;

impl TraitOp for Add {
    fn op_name(&self) -> &'static str {
        "add"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        if parent_shapes.len() < 2 {
            return Err(GraphError::InvalidOperation(format!(
                "Add节点至少需要2个父节点，实际为{}",
                parent_shapes.len()
            )));
        }
        check_same_shapes("Add", parent_shapes)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        let mut result = parent_values[0].clone();
        for v in &parent_values[1..] {
            result = &result + *v;
        }
        Ok(result)
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        _parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // d(Σx_i)/dx_k = 1
        Ok(upstream.clone())
    }
}
