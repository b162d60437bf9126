/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Joint函数型随机变量：把若干成员按列拼接为一个联合行向量。
 *                 唯一允许多个未观测父变量各自独立求逆的种类：
 *                 对第i个成员的逆就是观测向量中对应的切片，无雅可比修正。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct JointRv;

impl JointRv {
    fn member_range(
        parent_widths: &[usize],
        parent_ix: usize,
    ) -> (usize, usize) {
        let offset = parent_widths[..parent_ix].iter().sum();
        (offset, parent_widths[parent_ix])
    }
}

impl TraitRv for JointRv {
    fn rv_name(&self) -> &'static str {
        "joint"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Functional
    }

    fn rebuild_value(
        &self,
        graph: &mut GraphInner,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        graph.new_concat_node(parent_values, None)
    }

    fn invert(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        parent_ix: usize,
        parent_values: &[NodeId],
    ) -> Result<Option<(NodeId, Option<NodeId>)>, GraphError> {
        let widths = parent_values
            .iter()
            .map(|&p| Ok(graph.get_node_value_shape(p)?[1]))
            .collect::<Result<Vec<_>, GraphError>>()?;
        let (offset, len) = Self::member_range(&widths, parent_ix);
        let transformed = graph.new_slice_node(obs, offset, len, None)?;
        Ok(Some((transformed, None)))
    }

    fn invert_tensor(
        &self,
        obs: &Tensor,
        parent_ix: usize,
        parent_tensors: &[&Tensor],
    ) -> Result<Option<Tensor>, GraphError> {
        let widths = parent_tensors.iter().map(|t| t.width()).collect::<Vec<_>>();
        let (offset, len) = Self::member_range(&widths, parent_ix);
        if offset + len > obs.width() {
            return Err(GraphError::DimensionMismatch {
                expected: widths.iter().sum(),
                got: obs.width(),
                message: "联合观测向量的宽度小于各成员宽度之和".to_string(),
            });
        }
        Ok(Some(Tensor::from_row(
            &obs.as_slice()[offset..offset + len],
        )))
    }

    fn forward_tensor(&self, parent_tensors: &[&Tensor]) -> Result<Tensor, GraphError> {
        let mut data = Vec::new();
        for t in parent_tensors {
            data.extend_from_slice(t.as_slice());
        }
        Ok(Tensor::from_row(&data))
    }

    fn splits_parents(&self) -> bool {
        true
    }
}
