/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : GraphInner核心操作：创建、访问器、ID/名称生成、标记与梯度管理。
 */

use super::super::error::GraphError;
use super::super::node::{Node, NodeId};
use super::GraphInner;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            next_id: 0,
            rng: None,
        }
    }

    /// 创建一个带固定种子的计算图（确保可重复性）
    pub fn new_with_seed(seed: u64) -> Self {
        let mut graph = Self::new();
        graph.set_seed(seed);
        graph
    }

    /// 设置/重置图的随机种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    /// 检查图是否有固定种子
    pub const fn has_seed(&self) -> bool {
        self.rng.is_some()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Option<StdRng> {
        &mut self.rng
    }

    // ========== 基础访问器 ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn get_node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(crate) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        Ok(self.get_node(id)?.parents().to_vec())
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    pub fn set_node_value(&mut self, id: NodeId, value: &Tensor) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    pub fn get_node_gradient(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        Ok(self.get_node(id)?.gradient())
    }

    pub fn get_node_value_shape(&self, id: NodeId) -> Result<Vec<usize>, GraphError> {
        Ok(self.get_node(id)?.value().shape().to_vec())
    }

    /// 节点是否是源节点（无父节点的叶子）
    pub fn is_source_node(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.is_source())
    }

    // ========== 标记管理 ==========

    pub(crate) fn is_marked(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.is_marked())
    }

    pub(crate) fn set_mark(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_mark();
        Ok(())
    }

    pub(crate) fn clear_mark(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.get_node_mut(id)?.clear_mark();
        Ok(())
    }

    /// 图中是否存在任何残留标记（测试标记卫生用）
    pub fn any_marks_set(&self) -> bool {
        self.nodes
            .values()
            .any(|n| n.is_marked() || n.is_visited())
    }

    // ========== 梯度与数值更新 ==========

    /// 清零单个节点的梯度
    pub fn clear_node_gradient(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.get_node_mut(id)?.clear_gradient();
        Ok(())
    }

    /// 清零所有节点的梯度
    pub fn clear_all_gradients(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_gradient();
        }
    }

    /// 对节点值沿给定方向走一步，返回值是否有变化
    pub fn update_node_value(
        &mut self,
        id: NodeId,
        step: f32,
        direction: &Tensor,
    ) -> Result<bool, GraphError> {
        self.get_node_mut(id)?.update(step, direction)
    }

    // ========== ID/名称生成 ==========

    pub(in crate::graph) fn generate_valid_node_id(&mut self) -> NodeId {
        // 先递增再返回，所以第一个节点ID是1
        self.next_id += 1;
        NodeId(self.next_id)
    }

    pub(in crate::graph) fn check_duplicate_node_name(&self, name: &str) -> Result<(), GraphError> {
        if self.nodes.values().any(|node| node.name() == name) {
            return Err(GraphError::DuplicateNodeName(format!(
                "节点{}在图{}中重复",
                name,
                self.name()
            )));
        }
        Ok(())
    }

    pub(in crate::graph) fn generate_valid_new_node_name(
        &self,
        base_name: &str,
        node_type: &str,
    ) -> Result<String, GraphError> {
        if !base_name.is_empty() {
            self.check_duplicate_node_name(base_name)?;
            return Ok(base_name.to_string());
        }

        let mut counter = 1;
        loop {
            let name = format!("{node_type}_{counter}");
            if self.check_duplicate_node_name(&name).is_ok() {
                return Ok(name);
            }
            counter += 1;
        }
    }

    pub(in crate::graph) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
