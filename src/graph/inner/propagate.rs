/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 单节点的前向与反向传播。
 *                 调用顺序由NodeArray/propagation_path保证（正向求值、严格逆序回传），
 *                 这里不做任何顺序检查。
 */

use super::super::error::GraphError;
use super::super::node::NodeId;
use super::super::raw_node::TraitOp;
use super::GraphInner;
use crate::tensor::Tensor;

impl GraphInner {
    /// 前向传播单个节点：用父节点当前值重算本节点值。
    /// 源节点是空操作（其值由外部设置）。父节点值不变时幂等。
    pub fn fprop_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.get_node(id)?;
        if node.is_source() {
            return Ok(());
        }

        let new_value = {
            let parent_values = node
                .parents()
                .iter()
                .map(|&p| self.get_node(p).map(|n| n.value()))
                .collect::<Result<Vec<_>, _>>()?;
            node.kind().compute_value(&parent_values)?
        };

        self.get_node_mut(id)?.assign_value(new_value);
        Ok(())
    }

    /// 反向传播单个节点：把本节点已累积的梯度按算子公式累加进各父节点的梯度。
    /// 只有当所有下游消费者的bprop都已执行（即严格按传播路径逆序调用）时结果才正确。
    pub fn bprop_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let contributions = {
            let node = self.get_node(id)?;
            if node.is_source() {
                return Ok(());
            }
            let parents = node.parents();
            let parent_values = parents
                .iter()
                .map(|&p| self.get_node(p).map(|n| n.value()))
                .collect::<Result<Vec<_>, _>>()?;

            let mut contributions: Vec<(NodeId, Tensor)> = Vec::with_capacity(parents.len());
            for (ix, &parent_id) in parents.iter().enumerate() {
                let grad = node.kind().grad_to_parent(
                    ix,
                    &parent_values,
                    node.value(),
                    node.gradient(),
                )?;
                contributions.push((parent_id, grad));
            }
            contributions
        };

        for (parent_id, grad) in contributions {
            self.get_node_mut(parent_id)?.accumulate_gradient(&grad);
        }
        Ok(())
    }

    /// 把节点梯度置为全一（反向传播的种子，通常用于[1,1]的输出节点）
    pub fn seed_gradient(&mut self, id: NodeId) -> Result<(), GraphError> {
        let shape = self.get_node_value_shape(id)?;
        self.get_node_mut(id)?.set_gradient(Tensor::ones(&shape));
        Ok(())
    }
}
