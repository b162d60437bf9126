/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Neg函数型随机变量：Y = -X。自逆变换，无雅可比修正。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct NegRv;

impl TraitRv for NegRv {
    fn rv_name(&self) -> &'static str {
        "neg"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Functional
    }

    fn rebuild_value(
        &self,
        graph: &mut GraphInner,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        graph.new_negate_node(parent_values[0], None)
    }

    fn invert(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        _parent_ix: usize,
        _parent_values: &[NodeId],
    ) -> Result<Option<(NodeId, Option<NodeId>)>, GraphError> {
        let transformed = graph.new_negate_node(obs, None)?;
        Ok(Some((transformed, None)))
    }

    fn invert_tensor(
        &self,
        obs: &Tensor,
        _parent_ix: usize,
        _parent_tensors: &[&Tensor],
    ) -> Result<Option<Tensor>, GraphError> {
        Ok(Some(-obs))
    }

    fn forward_tensor(&self, parent_tensors: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(-parent_tensors[0])
    }
}
