/*
 * @Author       : 老董
 * @Description  : 各算子节点的单元测试
 *
 * 测试策略：
 * 1. 构造期形状校验（父节点个数、形状一致性）
 * 2. 前向传播的数值正确性（fprop_node）
 * 3. 反向传播的梯度公式（seed后bprop_node，检查父节点梯度）
 */

use crate::assert_err;
use crate::graph::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn source(graph: &mut GraphInner, data: &[f32]) -> NodeId {
    graph
        .new_source_node_with_value(&Tensor::from_row(data), None)
        .unwrap()
}

// ==================== 构造期校验 ====================

#[test]
fn test_op_construction_validation() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[1.0, 2.0]);
    let b = source(&mut graph, &[1.0, 2.0, 3.0]);

    // 1. Add至少2个父节点
    assert_err!(
        graph.new_add_node(&[a], None),
        GraphError::InvalidOperation(msg) if msg.contains("Add")
    );
    // 2. 形状不一致
    assert_err!(
        graph.new_subtract_node(a, b, None),
        GraphError::ShapeMismatch { .. }
    );
    // 3. 不存在的父节点
    assert_err!(
        graph.new_exp_node(NodeId(42), None),
        GraphError::NodeNotFound(NodeId(42))
    );
    // 4. Slice越界
    assert_err!(
        graph.new_slice_node(b, 1, 3, None),
        GraphError::InvalidOperation(msg) if msg.contains("Slice")
    );
    // 校验失败不产生半成品节点
    assert_eq!(graph.nodes_count(), 2);
}

// ==================== 前向传播 ====================

#[test]
fn test_fprop_elementwise() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[1.0, 2.0, 3.0]);
    let b = source(&mut graph, &[4.0, 5.0, 6.0]);

    let add = graph.new_add_node(&[a, b], None).unwrap();
    let sub = graph.new_subtract_node(b, a, None).unwrap();
    let mul = graph.new_multiply_node(a, b, None).unwrap();
    let div = graph.new_divide_node(b, a, None).unwrap();
    for id in [add, sub, mul, div] {
        graph.fprop_node(id).unwrap();
    }

    assert_eq!(graph.get_node_value(add).unwrap().as_slice(), &[5.0, 7.0, 9.0]);
    assert_eq!(graph.get_node_value(sub).unwrap().as_slice(), &[3.0, 3.0, 3.0]);
    assert_eq!(graph.get_node_value(mul).unwrap().as_slice(), &[4.0, 10.0, 18.0]);
    assert_eq!(graph.get_node_value(div).unwrap().as_slice(), &[4.0, 2.5, 2.0]);
}

#[test]
fn test_fprop_nary_add() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[1.0]);
    let b = source(&mut graph, &[2.0]);
    let c = source(&mut graph, &[3.0]);
    let add = graph.new_add_node(&[a, b, c], None).unwrap();

    graph.fprop_node(add).unwrap();
    assert_eq!(graph.get_node_value(add).unwrap().to_scalar(), Some(6.0));
}

#[test]
fn test_fprop_unary_and_reduce() {
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0, 4.0]);

    let neg = graph.new_negate_node(x, None).unwrap();
    let exp = graph.new_exp_node(x, None).unwrap();
    let log = graph.new_log_node(x, None).unwrap();
    let abs = graph.new_abs_node(neg, None).unwrap();
    let square = graph.new_square_node(x, None).unwrap();
    let sum = graph.new_sum_node(x, None).unwrap();
    let scaled = graph.new_scalar_multiply_node(-0.5, x, None).unwrap();
    for id in [neg, exp, log, abs, square, sum, scaled] {
        graph.fprop_node(id).unwrap();
    }

    assert_eq!(graph.get_node_value(neg).unwrap().as_slice(), &[-1.0, -4.0]);
    assert_abs_diff_eq!(
        graph.get_node_value(exp).unwrap().get(0, 1),
        4.0_f32.exp(),
        epsilon = 1e-3
    );
    assert_abs_diff_eq!(
        graph.get_node_value(log).unwrap().get(0, 1),
        4.0_f32.ln(),
        epsilon = 1e-6
    );
    assert_eq!(graph.get_node_value(abs).unwrap().as_slice(), &[1.0, 4.0]);
    assert_eq!(graph.get_node_value(square).unwrap().as_slice(), &[1.0, 16.0]);
    // Sum归约到[1,1]
    assert_eq!(graph.get_node_value(sum).unwrap().shape(), &[1, 1]);
    assert_eq!(graph.get_node_value(sum).unwrap().to_scalar(), Some(5.0));
    assert_eq!(graph.get_node_value(scaled).unwrap().as_slice(), &[-0.5, -2.0]);
}

#[test]
fn test_fprop_concat_slice() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[1.0, 2.0]);
    let b = source(&mut graph, &[3.0]);
    let concat = graph.new_concat_node(&[a, b], None).unwrap();
    let slice = graph.new_slice_node(concat, 1, 2, None).unwrap();

    graph.fprop_node(concat).unwrap();
    graph.fprop_node(slice).unwrap();

    assert_eq!(
        graph.get_node_value(concat).unwrap().as_slice(),
        &[1.0, 2.0, 3.0]
    );
    assert_eq!(graph.get_node_value(slice).unwrap().as_slice(), &[2.0, 3.0]);
}

#[test]
fn test_fprop_is_equal() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[1.0, 2.0]);
    let b = source(&mut graph, &[1.0, 2.0]);
    let c = source(&mut graph, &[1.0, 3.0]);

    let eq = graph.new_is_equal_node(a, b, None).unwrap();
    let ne = graph.new_is_equal_node(a, c, None).unwrap();
    graph.fprop_node(eq).unwrap();
    graph.fprop_node(ne).unwrap();

    assert_eq!(graph.get_node_value(eq).unwrap().to_scalar(), Some(1.0));
    assert_eq!(graph.get_node_value(ne).unwrap().to_scalar(), Some(0.0));
}

#[test]
fn test_fprop_idempotent() {
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[2.0, 3.0]);
    let y = graph.new_square_node(x, None).unwrap();

    graph.fprop_node(y).unwrap();
    let first = graph.get_node_value(y).unwrap().clone();
    graph.fprop_node(y).unwrap();
    assert_eq!(graph.get_node_value(y).unwrap(), &first);
}

// ==================== 反向传播 ====================

/// 对单节点做一次seed+bprop，返回各父节点的梯度
fn bprop_once(graph: &mut GraphInner, node: NodeId, parents: &[NodeId]) -> Vec<Tensor> {
    for &p in parents {
        graph.clear_node_gradient(p).unwrap();
    }
    graph.fprop_node(node).unwrap();
    graph.seed_gradient(node).unwrap();
    graph.bprop_node(node).unwrap();
    parents
        .iter()
        .map(|&p| graph.get_node_gradient(p).unwrap().clone())
        .collect()
}

#[test]
fn test_bprop_multiply() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[2.0, 3.0]);
    let b = source(&mut graph, &[5.0, 7.0]);
    let mul = graph.new_multiply_node(a, b, None).unwrap();

    let grads = bprop_once(&mut graph, mul, &[a, b]);
    // d(a⊙b)/da = b，d(a⊙b)/db = a
    assert_eq!(grads[0].as_slice(), &[5.0, 7.0]);
    assert_eq!(grads[1].as_slice(), &[2.0, 3.0]);
}

#[test]
fn test_bprop_divide() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[6.0]);
    let b = source(&mut graph, &[2.0]);
    let div = graph.new_divide_node(a, b, None).unwrap();

    let grads = bprop_once(&mut graph, div, &[a, b]);
    assert_abs_diff_eq!(grads[0].to_scalar().unwrap(), 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(grads[1].to_scalar().unwrap(), -1.5, epsilon = 1e-6);
}

#[test]
fn test_bprop_exp_log_square() {
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[2.0]);

    let exp = graph.new_exp_node(x, None).unwrap();
    let grads = bprop_once(&mut graph, exp, &[x]);
    assert_abs_diff_eq!(grads[0].to_scalar().unwrap(), 2.0_f32.exp(), epsilon = 1e-3);

    let log = graph.new_log_node(x, None).unwrap();
    let grads = bprop_once(&mut graph, log, &[x]);
    assert_abs_diff_eq!(grads[0].to_scalar().unwrap(), 0.5, epsilon = 1e-6);

    let square = graph.new_square_node(x, None).unwrap();
    let grads = bprop_once(&mut graph, square, &[x]);
    assert_abs_diff_eq!(grads[0].to_scalar().unwrap(), 4.0, epsilon = 1e-6);
}

#[test]
fn test_bprop_sum_broadcast() {
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0, 2.0, 3.0]);
    let sum = graph.new_sum_node(x, None).unwrap();

    let grads = bprop_once(&mut graph, sum, &[x]);
    // 标量梯度广播回父节点的每个元素
    assert_eq!(grads[0].as_slice(), &[1.0, 1.0, 1.0]);
}

#[test]
fn test_bprop_concat_and_slice() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[1.0, 2.0]);
    let b = source(&mut graph, &[3.0]);
    let concat = graph.new_concat_node(&[a, b], None).unwrap();

    let grads = bprop_once(&mut graph, concat, &[a, b]);
    assert_eq!(grads[0].as_slice(), &[1.0, 1.0]);
    assert_eq!(grads[1].as_slice(), &[1.0]);

    graph.fprop_node(concat).unwrap();
    let slice = graph.new_slice_node(concat, 1, 2, None).unwrap();
    let grads = bprop_once(&mut graph, slice, &[concat]);
    // 上游梯度嵌回对应位置，其余为0
    assert_eq!(grads[0].as_slice(), &[0.0, 1.0, 1.0]);
}

#[test]
fn test_bprop_is_equal_zero_gradient() {
    let mut graph = GraphInner::new();
    let a = source(&mut graph, &[1.0]);
    let b = source(&mut graph, &[1.0]);
    let eq = graph.new_is_equal_node(a, b, None).unwrap();

    let grads = bprop_once(&mut graph, eq, &[a, b]);
    assert_eq!(grads[0].as_slice(), &[0.0]);
    assert_eq!(grads[1].as_slice(), &[0.0]);
}

#[test]
fn test_gradient_accumulation() {
    // x同时作为multiply的两个父节点：梯度应累加而非覆盖
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[3.0]);
    let square = graph.new_multiply_node(x, x, None).unwrap();

    let grads = bprop_once(&mut graph, square, &[x]);
    // d(x·x)/dx = 2x = 6（两条边各贡献3.0）
    assert_abs_diff_eq!(grads[0].to_scalar().unwrap(), 6.0, epsilon = 1e-6);
}
