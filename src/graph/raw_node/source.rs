/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 源节点：无父节点的叶子，值由外部设置（参数、观测绑定、常量）。
 *                 传播路径把源节点视为已知项，fprop对其是空操作。
 */

use super::{GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Source;

impl TraitOp for Source {
    fn op_name(&self) -> &'static str {
        "source"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        if !parent_shapes.is_empty() {
            return Err(GraphError::InvalidOperation(
                "Source节点不应有父节点".to_string(),
            ));
        }
        // 形状由构造方（new_source_node）直接给出，这里不会被用到
        Err(GraphError::InvalidOperation(
            "Source节点的形状不应由父节点推导".to_string(),
        ))
    }

    fn compute_value(&self, _parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "Source节点的值应通过set_value设置，而非前向传播计算".to_string(),
        ))
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        _parent_values: &[&Tensor],
        _value: &Tensor,
        _upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "Source节点没有父节点，不存在梯度传播".to_string(),
        ))
    }
}
