/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Minus函数型随机变量：Y = A - B。
 *                 左父未观测时 A = obs + B；右父未观测时 B = A - obs。均无雅可比修正。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct MinusRv;

impl TraitRv for MinusRv {
    fn rv_name(&self) -> &'static str {
        "minus"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Functional
    }

    fn rebuild_value(
        &self,
        graph: &mut GraphInner,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        graph.new_subtract_node(parent_values[0], parent_values[1], None)
    }

    fn invert(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        parent_ix: usize,
        parent_values: &[NodeId],
    ) -> Result<Option<(NodeId, Option<NodeId>)>, GraphError> {
        let transformed = if parent_ix == 0 {
            graph.new_add_node(&[obs, parent_values[1]], None)?
        } else {
            graph.new_subtract_node(parent_values[0], obs, None)?
        };
        Ok(Some((transformed, None)))
    }

    fn invert_tensor(
        &self,
        obs: &Tensor,
        parent_ix: usize,
        parent_tensors: &[&Tensor],
    ) -> Result<Option<Tensor>, GraphError> {
        let transformed = if parent_ix == 0 {
            obs + parent_tensors[1]
        } else {
            parent_tensors[0] - obs
        };
        Ok(Some(transformed))
    }

    fn forward_tensor(&self, parent_tensors: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_tensors[0] - parent_tensors[1])
    }
}
