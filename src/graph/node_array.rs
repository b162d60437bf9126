/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : NodeArray：节点ID的有序集合，支持批量图操作
 *                 （按序fprop/严格逆序bprop/融合fbprop、标记管理、路径构建）
 *                 与聚合数值传输（与平铺缓冲区互拷，对接外部平铺向量优化器）。
 *                 调用方负责保证数组本身是合法的拓扑序——propagation_path的产物即是。
 */

use super::error::GraphError;
use super::inner::GraphInner;
use super::node::NodeId;
use super::path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeArray {
    ids: Vec<NodeId>,
}

impl NodeArray {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    pub fn from_ids(ids: Vec<NodeId>) -> Self {
        Self { ids }
    }

    pub fn push(&mut self, id: NodeId) {
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.ids.iter()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// 数组中的节点个数（占位语义上等同len）
    pub fn nelems(&self) -> usize {
        self.ids.len()
    }

    /// 所有节点值的元素总数
    pub fn sum_of_lengths(&self, graph: &GraphInner) -> Result<usize, GraphError> {
        let mut total = 0;
        for &id in &self.ids {
            total += self.node_size(graph, id)?;
        }
        Ok(total)
    }

    fn node_size(&self, graph: &GraphInner, id: NodeId) -> Result<usize, GraphError> {
        Ok(graph.get_node_value(id)?.size())
    }

    // ========== 批量传播 ==========

    /// 按数组顺序逐节点前向传播
    pub fn fprop(&self, graph: &mut GraphInner) -> Result<(), GraphError> {
        for &id in &self.ids {
            graph.fprop_node(id)?;
        }
        Ok(())
    }

    /// 按数组严格逆序逐节点反向传播
    pub fn bprop(&self, graph: &mut GraphInner) -> Result<(), GraphError> {
        for &id in self.ids.iter().rev() {
            graph.bprop_node(id)?;
        }
        Ok(())
    }

    /// 融合的前向+反向：前向传播整个数组，在最后一个（汇）节点上播种梯度，
    /// 再整体逆序回传。免去调用方单独做一次播种与二次前向。
    pub fn fbprop(&self, graph: &mut GraphInner) -> Result<(), GraphError> {
        let Some(&last) = self.ids.last() else {
            return Ok(());
        };
        for &id in &self.ids[..self.ids.len() - 1] {
            graph.fprop_node(id)?;
        }
        graph.fprop_node(last)?;
        graph.seed_gradient(last)?;
        for &id in self.ids.iter().rev() {
            graph.bprop_node(id)?;
        }
        Ok(())
    }

    /// 清零数组中所有节点的梯度
    pub fn clear_gradient(&self, graph: &mut GraphInner) -> Result<(), GraphError> {
        for &id in &self.ids {
            graph.clear_node_gradient(id)?;
        }
        Ok(())
    }

    // ========== 批量标记 ==========

    pub fn set_mark(&self, graph: &mut GraphInner) -> Result<(), GraphError> {
        for &id in &self.ids {
            graph.set_mark(id)?;
        }
        Ok(())
    }

    pub fn clear_mark(&self, graph: &mut GraphInner) -> Result<(), GraphError> {
        for &id in &self.ids {
            graph.clear_mark(id)?;
        }
        Ok(())
    }

    /// 对每个元素调用节点级markPath（见path模块）
    pub fn mark_path(&self, graph: &mut GraphInner) -> Result<(), GraphError> {
        for &id in &self.ids {
            path::mark_path(graph, id)?;
        }
        Ok(())
    }

    /// 对每个元素调用节点级buildPath，把仍被标记的子图按拓扑序展平进`out`
    pub fn build_path(
        &self,
        graph: &mut GraphInner,
        out: &mut Vec<NodeId>,
    ) -> Result<(), GraphError> {
        for &id in &self.ids {
            path::build_path(graph, id, out)?;
        }
        Ok(())
    }

    // ========== 聚合数值传输 ==========

    /// 把所有节点的值按数组顺序串接写入平铺缓冲区。长度不匹配是致命错误。
    pub fn copy_values_to(
        &self,
        graph: &GraphInner,
        out: &mut [f32],
    ) -> Result<(), GraphError> {
        let total = self.sum_of_lengths(graph)?;
        if out.len() != total {
            return Err(GraphError::DimensionMismatch {
                expected: total,
                got: out.len(),
                message: "copy_values_to的缓冲区长度与节点值总长不一致".to_string(),
            });
        }
        let mut offset = 0;
        for &id in &self.ids {
            let value = graph.get_node_value(id)?;
            let n = value.size();
            out[offset..offset + n].copy_from_slice(value.as_slice());
            offset += n;
        }
        Ok(())
    }

    /// 从平铺缓冲区按数组顺序读出并写回所有节点的值（形状保持不变）
    pub fn copy_values_from(
        &self,
        graph: &mut GraphInner,
        src: &[f32],
    ) -> Result<(), GraphError> {
        let total = self.sum_of_lengths(graph)?;
        if src.len() != total {
            return Err(GraphError::DimensionMismatch {
                expected: total,
                got: src.len(),
                message: "copy_values_from的缓冲区长度与节点值总长不一致".to_string(),
            });
        }
        let mut offset = 0;
        for &id in &self.ids {
            let shape = graph.get_node_value_shape(id)?;
            let n = shape[0] * shape[1];
            let value = crate::tensor::Tensor::new(&src[offset..offset + n], &shape);
            graph.set_node_value(id, &value)?;
            offset += n;
        }
        Ok(())
    }

    /// 把所有节点的梯度按数组顺序串接写入平铺缓冲区
    pub fn copy_gradients_to(
        &self,
        graph: &GraphInner,
        out: &mut [f32],
    ) -> Result<(), GraphError> {
        let total = self.sum_of_lengths(graph)?;
        if out.len() != total {
            return Err(GraphError::DimensionMismatch {
                expected: total,
                got: out.len(),
                message: "copy_gradients_to的缓冲区长度与节点值总长不一致".to_string(),
            });
        }
        let mut offset = 0;
        for &id in &self.ids {
            let gradient = graph.get_node_gradient(id)?;
            let n = gradient.size();
            out[offset..offset + n].copy_from_slice(gradient.as_slice());
            offset += n;
        }
        Ok(())
    }
}

impl std::ops::Index<usize> for NodeArray {
    type Output = NodeId;

    fn index(&self, ix: usize) -> &NodeId {
        &self.ids[ix]
    }
}

impl<'a> IntoIterator for &'a NodeArray {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

impl FromIterator<NodeId> for NodeArray {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
