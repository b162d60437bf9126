/*
 * @Author       : 老董
 * @Description  : GraphInner 基础功能测试
 *
 * 测试策略：
 * 1. 图与节点的创建（ID单调、自动命名、重名检测）
 * 2. 源节点的形状校验与赋值
 * 3. 节点访问错误（NodeNotFound）
 * 4. 梯度清零与数值更新
 */

use crate::assert_err;
use crate::graph::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

// ==================== 创建与命名 ====================

#[test]
fn test_node_id_generation() {
    let mut graph = GraphInner::new();
    let a = graph.new_source_node(&[1, 2], None).unwrap();
    let b = graph.new_source_node(&[1, 2], None).unwrap();
    let c = graph.new_add_node(&[a, b], None).unwrap();

    // ID从1开始单调递增
    assert_eq!(a, NodeId(1));
    assert_eq!(b, NodeId(2));
    assert_eq!(c, NodeId(3));
    assert_eq!(graph.nodes_count(), 3);
}

#[test]
fn test_auto_node_naming() {
    let mut graph = GraphInner::new();
    let a = graph.new_source_node(&[1, 2], None).unwrap();
    let b = graph.new_source_node(&[1, 2], None).unwrap();
    let add = graph.new_add_node(&[a, b], None).unwrap();

    assert_eq!(graph.get_node_name(a).unwrap(), "source_1");
    assert_eq!(graph.get_node_name(b).unwrap(), "source_2");
    assert_eq!(graph.get_node_name(add).unwrap(), "add_1");
}

#[test]
fn test_duplicate_node_name() {
    let mut graph = GraphInner::new();
    graph.new_source_node(&[1, 2], Some("x")).unwrap();
    let result = graph.new_source_node(&[1, 2], Some("x"));
    assert_err!(
        result,
        GraphError::DuplicateNodeName("节点x在图default_graph中重复")
    );
}

#[test]
fn test_source_node_shape_validation() {
    let mut graph = GraphInner::new();
    assert_err!(
        graph.new_source_node(&[1, 2, 3], None),
        GraphError::ShapeMismatch { .. }
    );
    assert_err!(
        graph.new_source_node(&[0, 2], None),
        GraphError::ShapeMismatch { .. }
    );
}

// ==================== 值与梯度 ====================

#[test]
fn test_set_node_value() {
    let mut graph = GraphInner::new();
    let a = graph.new_source_node(&[1, 3], None).unwrap();

    graph
        .set_node_value(a, &Tensor::from_row(&[1.0, 2.0, 3.0]))
        .unwrap();
    assert_eq!(
        graph.get_node_value(a).unwrap().as_slice(),
        &[1.0, 2.0, 3.0]
    );

    // 形状不匹配的赋值是错误
    assert_err!(
        graph.set_node_value(a, &Tensor::from_row(&[1.0, 2.0])),
        GraphError::ShapeMismatch { .. }
    );
}

#[test]
fn test_node_not_found() {
    let graph = GraphInner::new();
    assert_err!(
        graph.get_node_value(NodeId(99)),
        GraphError::NodeNotFound(NodeId(99))
    );
}

#[test]
fn test_clear_and_update() {
    let mut graph = GraphInner::new();
    let a = graph
        .new_source_node_with_value(&Tensor::from_row(&[1.0, 2.0]), None)
        .unwrap();

    // 1. 更新：value += step * direction
    let changed = graph
        .update_node_value(a, 0.5, &Tensor::from_row(&[2.0, 4.0]))
        .unwrap();
    assert!(changed);
    assert_eq!(graph.get_node_value(a).unwrap().as_slice(), &[2.0, 4.0]);

    // 2. 零方向不改变值
    let changed = graph
        .update_node_value(a, 0.5, &Tensor::zeros(&[1, 2]))
        .unwrap();
    assert!(!changed);

    // 3. 梯度清零
    graph.clear_node_gradient(a).unwrap();
    assert_eq!(graph.get_node_gradient(a).unwrap().as_slice(), &[0.0, 0.0]);
}
