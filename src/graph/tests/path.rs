/*
 * @Author       : 老董
 * @Description  : 传播路径提取的单元测试
 *
 * 测试策略：
 * 1. 路径排他性：inputs不出现在路径中，路径内父先于子且每节点恰好一次
 * 2. 菱形汇聚：多分支可达的节点只出现一次
 * 3. 边界行为：空outputs、与inputs无关的子图不被访问
 * 4. 标记卫生：任何调用返回后图中无残留标记（含重叠子图的交错调用）
 * 5. 派生操作：sources_of、non_input_parents_of_path
 */

use crate::graph::{
    non_input_parents_of_path, propagation_path, propagation_path_from_sources, sources_of,
    GraphInner, NodeArray, NodeId,
};
use crate::tensor::Tensor;

fn source(graph: &mut GraphInner, data: &[f32]) -> NodeId {
    graph
        .new_source_node_with_value(&Tensor::from_row(data), None)
        .unwrap()
}

fn ids(v: &[NodeId]) -> NodeArray {
    NodeArray::from_ids(v.to_vec())
}

/// 校验路径是合法拓扑序：不含inputs、无重复、父节点（不在inputs中的）先于子节点
fn assert_valid_path(graph: &GraphInner, path: &NodeArray, inputs: &NodeArray) {
    let mut seen = Vec::new();
    for &id in path {
        assert!(!inputs.contains(id), "路径不应包含输入节点{id}");
        assert!(!seen.contains(&id), "节点{id}在路径中出现多次");
        for p in graph.get_node_parents(id).unwrap() {
            if !inputs.contains(p) && path.contains(p) {
                assert!(seen.contains(&p), "节点{id}的父节点{p}应先于它出现");
            }
        }
        seen.push(id);
    }
}

#[test]
fn test_simple_chain_path() {
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0]);
    let y = graph.new_exp_node(x, None).unwrap();
    let z = graph.new_sum_node(y, None).unwrap();

    let path = propagation_path(&mut graph, &ids(&[x]), &ids(&[z])).unwrap();
    assert_eq!(path.ids(), &[y, z]);
    assert!(!graph.any_marks_set());
}

#[test]
fn test_diamond_visited_once() {
    // x → a, x → b, (a,b) → c：x的两条分支汇聚于c
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0]);
    let a = graph.new_exp_node(x, None).unwrap();
    let b = graph.new_square_node(x, None).unwrap();
    let c = graph.new_add_node(&[a, b], None).unwrap();

    let inputs = ids(&[x]);
    let path = propagation_path(&mut graph, &inputs, &ids(&[c])).unwrap();

    assert_eq!(path.len(), 3);
    assert_valid_path(&graph, &path, &inputs);
    assert!(path.contains(a) && path.contains(b) && path.contains(c));
    assert!(!graph.any_marks_set());
}

#[test]
fn test_inputs_act_as_boundary() {
    // w → x → y：以x为输入时，w不应被访问
    let mut graph = GraphInner::new();
    let w = source(&mut graph, &[1.0]);
    let x = graph.new_exp_node(w, None).unwrap();
    let y = graph.new_square_node(x, None).unwrap();

    let path = propagation_path(&mut graph, &ids(&[x]), &ids(&[y])).unwrap();
    assert_eq!(path.ids(), &[y]);
    assert!(!path.contains(w) && !path.contains(x));
    assert!(!graph.any_marks_set());
}

#[test]
fn test_unreachable_subgraph_untouched() {
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0]);
    let y = graph.new_exp_node(x, None).unwrap();
    // 与y无关的旁支
    let other = source(&mut graph, &[2.0]);
    let unrelated = graph.new_square_node(other, None).unwrap();

    let path = propagation_path(&mut graph, &ids(&[x]), &ids(&[y])).unwrap();
    assert!(!path.contains(other) && !path.contains(unrelated));
    assert!(!graph.any_marks_set());
}

#[test]
fn test_empty_outputs() {
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0]);
    graph.new_exp_node(x, None).unwrap();

    let path = propagation_path(&mut graph, &ids(&[x]), &ids(&[])).unwrap();
    assert!(path.is_empty());
    assert!(!graph.any_marks_set());
}

#[test]
fn test_path_from_sources() {
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0]);
    let y = source(&mut graph, &[2.0]);
    let mul = graph.new_multiply_node(x, y, None).unwrap();
    let out = graph.new_sum_node(mul, None).unwrap();

    // 单参数版本：从全部传递闭包源头出发
    let path = propagation_path_from_sources(&mut graph, &ids(&[out])).unwrap();
    assert_eq!(path.ids(), &[mul, out]);

    let sources = sources_of(&mut graph, &ids(&[out])).unwrap();
    assert_eq!(sources.len(), 2);
    assert!(sources.contains(x) && sources.contains(y));
    assert!(!graph.any_marks_set());
}

#[test]
fn test_non_input_parents_of_path() {
    // z = x*w + b：以x为输入，路径的非输入父节点应是隐藏参数w与b
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0]);
    let w = source(&mut graph, &[2.0]);
    let b = source(&mut graph, &[3.0]);
    let mul = graph.new_multiply_node(x, w, None).unwrap();
    let z = graph.new_add_node(&[mul, b], None).unwrap();

    let hidden = non_input_parents_of_path(&mut graph, &ids(&[x]), &ids(&[z])).unwrap();
    assert_eq!(hidden.len(), 2);
    assert!(hidden.contains(w) && hidden.contains(b));
    assert!(!hidden.contains(x));
    assert!(!graph.any_marks_set());
}

#[test]
fn test_interleaved_calls_mark_cleanliness() {
    // 重叠子图上的交错调用不应互相污染
    let mut graph = GraphInner::new();
    let x = source(&mut graph, &[1.0]);
    let a = graph.new_exp_node(x, None).unwrap();
    let b = graph.new_square_node(a, None).unwrap();
    let c = graph.new_sum_node(b, None).unwrap();

    for _ in 0..3 {
        let p1 = propagation_path(&mut graph, &ids(&[x]), &ids(&[c])).unwrap();
        assert_eq!(p1.ids(), &[a, b, c]);
        let p2 = propagation_path(&mut graph, &ids(&[a]), &ids(&[b])).unwrap();
        assert_eq!(p2.ids(), &[b]);
        // 空inputs时没有可达的已标记边界，路径为空
        let p3 = propagation_path(&mut graph, &ids(&[]), &ids(&[c])).unwrap();
        assert!(p3.is_empty());
        let p4 = propagation_path_from_sources(&mut graph, &ids(&[c])).unwrap();
        assert_eq!(p4.ids(), &[a, b, c]);
        assert!(!graph.any_marks_set());
    }
}
