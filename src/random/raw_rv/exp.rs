/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Exp函数型随机变量：Y = e^X。
 *                 逆变换 X = ln(obs)，密度雅可比修正 -Σ ln(obs)。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct ExpRv;

impl TraitRv for ExpRv {
    fn rv_name(&self) -> &'static str {
        "exp"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Functional
    }

    // e^X几乎必然取无理数值，按连续处理
    fn own_discrete(&self) -> Option<bool> {
        Some(false)
    }

    fn rebuild_value(
        &self,
        graph: &mut GraphInner,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        graph.new_exp_node(parent_values[0], None)
    }

    fn invert(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        _parent_ix: usize,
        _parent_values: &[NodeId],
    ) -> Result<Option<(NodeId, Option<NodeId>)>, GraphError> {
        let transformed = graph.new_log_node(obs, None)?;
        let sum = graph.new_sum_node(transformed, None)?;
        let jacobian = graph.new_negate_node(sum, None)?;
        Ok(Some((transformed, Some(jacobian))))
    }

    fn invert_tensor(
        &self,
        obs: &Tensor,
        _parent_ix: usize,
        _parent_tensors: &[&Tensor],
    ) -> Result<Option<Tensor>, GraphError> {
        Ok(Some(obs.ln()))
    }

    fn forward_tensor(&self, parent_tensors: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_tensors[0].exp())
    }
}
