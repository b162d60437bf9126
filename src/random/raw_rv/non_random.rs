/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 非随机变量：包一个源节点（常量或可学习参数）。
 *                 注意“非随机”不等于“常量”——EM更新会原地改写其源节点的值。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;
use crate::utils::FloatTrait;

#[derive(Clone)]
pub(crate) struct NonRandomRv {
    node: NodeId,
    discrete: bool,
}

impl NonRandomRv {
    /// 离散性在构造期由初值判定：全部元素为整数值则视为离散
    pub(crate) fn new(node: NodeId, value: &Tensor) -> Self {
        let discrete = value.as_slice().iter().all(|v| v.is_integer());
        Self { node, discrete }
    }
}

impl TraitRv for NonRandomRv {
    fn rv_name(&self) -> &'static str {
        "non_random"
    }

    fn category(&self) -> RvCategory {
        RvCategory::NonRandom
    }

    fn own_discrete(&self) -> Option<bool> {
        Some(self.discrete)
    }

    // 值就是自己的源节点，无需重建
    fn rebuild_value(
        &self,
        _graph: &mut GraphInner,
        _parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        Ok(self.node)
    }
}
