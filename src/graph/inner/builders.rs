/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : GraphInner节点构造入口。所有算子节点的形状都在构造期校验与推导；
 *                 校验失败时不会留下半成品节点。
 */

use super::super::error::GraphError;
use super::super::node::{Node, NodeId};
use super::super::raw_node::{
    Abs, Add, Concat, Divide, Exp, IsEqual, Log, Multiply, Negate, NodeKind, ScalarMultiply,
    Slice, Source, Square, Subtract, Sum, TraitOp,
};
use super::GraphInner;
use crate::tensor::Tensor;

impl GraphInner {
    /// 创建源节点（值为全零，之后由外部set_value）
    pub fn new_source_node(
        &mut self,
        shape: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        if shape.len() != 2 || shape[0] == 0 || shape[1] == 0 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![1, 1],
                got: shape.to_vec(),
                message: "Source节点的形状必须是[length, width]且各维大于0".to_string(),
            });
        }
        let name = self.generate_valid_new_node_name(name.unwrap_or(""), "source")?;
        let id = self.generate_valid_node_id();
        let node = Node::new(id, name, NodeKind::Source(Source), Vec::new(), shape);
        Ok(self.insert_node(node))
    }

    /// 创建带初值的源节点（常量、参数、观测绑定都用它）
    pub fn new_source_node_with_value(
        &mut self,
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let id = self.new_source_node(value.shape(), name)?;
        self.set_node_value(id, value)?;
        Ok(id)
    }

    pub fn new_add_node(
        &mut self,
        parents: &[NodeId],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Add(Add), parents, name)
    }

    pub fn new_subtract_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Subtract(Subtract), &[left, right], name)
    }

    pub fn new_multiply_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Multiply(Multiply), &[left, right], name)
    }

    pub fn new_divide_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Divide(Divide), &[left, right], name)
    }

    pub fn new_negate_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Negate(Negate), &[parent], name)
    }

    pub fn new_exp_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Exp(Exp), &[parent], name)
    }

    pub fn new_log_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Log(Log), &[parent], name)
    }

    pub fn new_abs_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Abs(Abs), &[parent], name)
    }

    pub fn new_square_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Square(Square), &[parent], name)
    }

    pub fn new_sum_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Sum(Sum), &[parent], name)
    }

    pub fn new_scalar_multiply_node(
        &mut self,
        k: f32,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(
            NodeKind::ScalarMultiply(ScalarMultiply::new(k)),
            &[parent],
            name,
        )
    }

    pub fn new_concat_node(
        &mut self,
        parents: &[NodeId],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Concat(Concat), parents, name)
    }

    pub fn new_slice_node(
        &mut self,
        parent: NodeId,
        offset: usize,
        len: usize,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::Slice(Slice::new(offset, len)), &[parent], name)
    }

    pub fn new_is_equal_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(NodeKind::IsEqual(IsEqual), &[left, right], name)
    }

    /// 通用算子节点构造：校验父节点存在、推导形状、生成唯一名称与ID
    fn new_op_node(
        &mut self,
        kind: NodeKind,
        parents: &[NodeId],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let parent_shapes_owned = parents
            .iter()
            .map(|&p| self.get_node_value_shape(p))
            .collect::<Result<Vec<_>, _>>()?;
        let parent_shapes: Vec<&[usize]> =
            parent_shapes_owned.iter().map(|s| s.as_slice()).collect();

        let shape = kind.infer_shape(&parent_shapes)?;
        let name = self.generate_valid_new_node_name(name.unwrap_or(""), kind.op_name())?;
        let id = self.generate_valid_node_id();
        let node = Node::new(id, name, kind, parents.to_vec(), &shape);
        Ok(self.insert_node(node))
    }
}
