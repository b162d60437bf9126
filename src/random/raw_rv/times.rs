/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Times函数型随机变量：Y = A ⊙ B（逐元素）。
 *                 对任一未观测父变量可逆：X = obs / 另一父变量，
 *                 密度变换带雅可比修正 -Σ ln|另一父变量|。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct TimesRv;

impl TraitRv for TimesRv {
    fn rv_name(&self) -> &'static str {
        "times"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Functional
    }

    fn rebuild_value(
        &self,
        graph: &mut GraphInner,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        graph.new_multiply_node(parent_values[0], parent_values[1], None)
    }

    fn invert(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        parent_ix: usize,
        parent_values: &[NodeId],
    ) -> Result<Option<(NodeId, Option<NodeId>)>, GraphError> {
        let other = parent_values[1 - parent_ix];
        let transformed = graph.new_divide_node(obs, other, None)?;
        // |dY/dX| = |other| → logP修正 -Σ ln|other|
        let abs_other = graph.new_abs_node(other, None)?;
        let log_abs = graph.new_log_node(abs_other, None)?;
        let sum = graph.new_sum_node(log_abs, None)?;
        let jacobian = graph.new_negate_node(sum, None)?;
        Ok(Some((transformed, Some(jacobian))))
    }

    fn invert_tensor(
        &self,
        obs: &Tensor,
        parent_ix: usize,
        parent_tensors: &[&Tensor],
    ) -> Result<Option<Tensor>, GraphError> {
        Ok(Some(obs / parent_tensors[1 - parent_ix]))
    }

    fn forward_tensor(&self, parent_tensors: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_tensors[0] * parent_tensors[1])
    }
}
