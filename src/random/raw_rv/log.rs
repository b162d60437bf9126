/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Log函数型随机变量：Y = ln(X)。
 *                 逆变换 X = e^obs，密度雅可比修正 +Σ obs。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct LogRv;

impl TraitRv for LogRv {
    fn rv_name(&self) -> &'static str {
        "log"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Functional
    }

    fn own_discrete(&self) -> Option<bool> {
        Some(false)
    }

    fn rebuild_value(
        &self,
        graph: &mut GraphInner,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        graph.new_log_node(parent_values[0], None)
    }

    fn invert(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        _parent_ix: usize,
        _parent_values: &[NodeId],
    ) -> Result<Option<(NodeId, Option<NodeId>)>, GraphError> {
        let transformed = graph.new_exp_node(obs, None)?;
        let jacobian = graph.new_sum_node(obs, None)?;
        Ok(Some((transformed, Some(jacobian))))
    }

    fn invert_tensor(
        &self,
        obs: &Tensor,
        _parent_ix: usize,
        _parent_tensors: &[&Tensor],
    ) -> Result<Option<Tensor>, GraphError> {
        Ok(Some(obs.exp()))
    }

    fn forward_tensor(&self, parent_tensors: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_tensors[0].ln())
    }
}
