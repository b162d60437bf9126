/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : IsEqual节点：两个父节点逐元素完全相等时输出[1,1]的1，否则0。
 *                 这是完全观测的函数型随机变量logP用到的指示函数；
 *                 它不可微，梯度按0传播。
 */

use super::{check_parent_count, check_same_shapes, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct IsEqual;

impl TraitOp for IsEqual {
    fn op_name(&self) -> &'static str {
        "is_equal"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("IsEqual", parent_shapes, 2)?;
        check_same_shapes("IsEqual", parent_shapes)?;
        Ok(vec![1, 1])
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        let equal = parent_values[0].all_equal(parent_values[1]);
        Ok(Tensor::scalar(if equal { 1.0 } else { 0.0 }))
    }

    fn grad_to_parent(
        &self,
        parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        _upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(Tensor::zeros(parent_values[parent_ix].shape()))
    }
}
