/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 计算图节点：值、梯度、父节点列表与遍历标记。
 *                 节点存放在GraphInner的arena中，父子关系用NodeId表示
 *                 （多个节点可引用同一父节点，即共享所有权的arena化）。
 */

use super::error::GraphError;
use super::raw_node::{NodeKind, TraitOp};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "节点#{}", self.0)
    }
}

/// 计算图节点。
/// 不变式：`value`与`gradient`形状始终一致；结构（kind与parents）构造后不再变动，
/// 只有`value`/`gradient`的数值与两个遍历标记会被原地修改。
pub(crate) struct Node {
    id: NodeId,
    name: String,
    kind: NodeKind,
    parents: Vec<NodeId>,
    value: Tensor,
    gradient: Tensor,
    /// “在当前传播路径上”的标记，markPath/buildPath期间使用
    marked: bool,
    /// 第二标记：祖先收集等遍历的去重守卫
    visited: bool,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        name: String,
        kind: NodeKind,
        parents: Vec<NodeId>,
        shape: &[usize],
    ) -> Self {
        Self {
            id,
            name,
            kind,
            parents,
            value: Tensor::zeros(shape),
            gradient: Tensor::zeros(shape),
            marked: false,
            visited: false,
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub(crate) fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub(crate) fn is_source(&self) -> bool {
        self.parents.is_empty()
    }

    pub(crate) fn value(&self) -> &Tensor {
        &self.value
    }

    /// 设置节点值。形状必须与声明形状一致（配置/形状错误是致命的）。
    pub(crate) fn set_value(&mut self, value: &Tensor) -> Result<(), GraphError> {
        if value.shape() != self.value.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("{}的值形状与声明形状不一致", self.id),
            });
        }
        self.value = value.clone();
        Ok(())
    }

    /// 内部赋值：kind的compute_value已保证形状正确
    pub(crate) fn assign_value(&mut self, value: Tensor) {
        self.value = value;
    }

    pub(crate) fn gradient(&self) -> &Tensor {
        &self.gradient
    }

    /// 梯度清零（bprop前必须由调用方显式清零）
    pub(crate) fn clear_gradient(&mut self) {
        self.gradient = Tensor::zeros(self.value.shape());
    }

    /// 梯度累加（只累加、从不覆盖）
    pub(crate) fn accumulate_gradient(&mut self, contribution: &Tensor) {
        self.gradient = &self.gradient + contribution;
    }

    pub(crate) fn set_gradient(&mut self, gradient: Tensor) {
        self.gradient = gradient;
    }

    /// 沿给定方向走一步：value += step * direction。返回值是否有变化。
    pub(crate) fn update(&mut self, step: f32, direction: &Tensor) -> Result<bool, GraphError> {
        if direction.shape() != self.value.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: direction.shape().to_vec(),
                message: format!("{}的更新方向形状与值形状不一致", self.id),
            });
        }
        let delta = direction * step;
        let changed = delta.as_slice().iter().any(|&x| x != 0.0);
        self.value = &self.value + &delta;
        Ok(changed)
    }

    // ========== 遍历标记 ==========

    pub(crate) fn is_marked(&self) -> bool {
        self.marked
    }

    pub(crate) fn set_mark(&mut self) {
        self.marked = true;
    }

    pub(crate) fn clear_mark(&mut self) {
        self.marked = false;
    }

    pub(crate) fn is_visited(&self) -> bool {
        self.visited
    }

    pub(crate) fn set_visited(&mut self, v: bool) {
        self.visited = v;
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}, {})", self.id, self.kind.op_name(), self.name)
    }
}
