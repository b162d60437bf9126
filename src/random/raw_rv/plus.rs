/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Plus函数型随机变量：Y = A + B。
 *                 对任一未观测父变量可逆：X = obs - 另一父变量，无雅可比修正。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct PlusRv;

impl TraitRv for PlusRv {
    fn rv_name(&self) -> &'static str {
        "plus"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Functional
    }

    fn rebuild_value(
        &self,
        graph: &mut GraphInner,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        graph.new_add_node(parent_values, None)
    }

    fn invert(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        parent_ix: usize,
        parent_values: &[NodeId],
    ) -> Result<Option<(NodeId, Option<NodeId>)>, GraphError> {
        let other = parent_values[1 - parent_ix];
        let transformed = graph.new_subtract_node(obs, other, None)?;
        Ok(Some((transformed, None)))
    }

    fn invert_tensor(
        &self,
        obs: &Tensor,
        parent_ix: usize,
        parent_tensors: &[&Tensor],
    ) -> Result<Option<Tensor>, GraphError> {
        Ok(Some(obs - parent_tensors[1 - parent_ix]))
    }

    fn forward_tensor(&self, parent_tensors: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_tensors[0] + parent_tensors[1])
    }
}
