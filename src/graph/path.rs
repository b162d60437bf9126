/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 传播路径提取——本引擎的图算法核心。
 *                 给定输入集与输出集，求出为计算输出所必须求值的节点的拓扑有序子集
 *                 （不含输入本身：输入被视为已知叶子、遍历的边界）。
 *
 * 算法（双遍历，标记存放在节点上，每次调用重新推导、用后清净）：
 *   1. set_mark标记所有输入（它们充当路径终止器）；
 *   2. 对每个输出调用mark_path：递归地标记所有“经由某条路径可达已标记输入”的祖先；
 *   3. 单独clear_mark输入（它们不进入展平结果）；
 *   4. 对每个输出调用build_path：把仍被标记的子图按“父先于子”的顺序展平，
 *      边展平边清除标记（保证每个节点恰好出现一次，也保证返回时无残留标记）。
 */

use super::error::GraphError;
use super::inner::GraphInner;
use super::node::NodeId;
use super::node_array::NodeArray;

/// 节点级markPath：若本节点可达某个已标记的输入则标记本节点并返回true。
/// 已标记节点直接返回true（自标记检查保证多分支汇聚时只深入一次；
/// 也使输入成为不可穿越的边界——不会继续向输入的祖先递归）。
pub(in crate::graph) fn mark_path(graph: &mut GraphInner, id: NodeId) -> Result<bool, GraphError> {
    if graph.is_marked(id)? {
        return Ok(true);
    }
    let parents = graph.get_node_parents(id)?;
    let mut on_path = false;
    for p in parents {
        if mark_path(graph, p)? {
            on_path = true;
        }
    }
    if on_path {
        graph.set_mark(id)?;
    }
    Ok(on_path)
}

/// 节点级buildPath：mark_path设好标记之后，把被标记的子图按依赖序展平进`out`
/// （父节点先于本节点），并在追加时清除标记，使重复调用不会重复追加。
pub(in crate::graph) fn build_path(
    graph: &mut GraphInner,
    id: NodeId,
    out: &mut Vec<NodeId>,
) -> Result<(), GraphError> {
    if !graph.is_marked(id)? {
        return Ok(());
    }
    graph.clear_mark(id)?;
    let parents = graph.get_node_parents(id)?;
    for p in parents {
        build_path(graph, p, out)?;
    }
    out.push(id);
    Ok(())
}

/// 计算从`inputs`到`outputs`的传播路径：为把输出算成输入的函数所必须求值的
/// 节点的有序列表（可直接按序fprop），不含`inputs`本身。
/// `outputs`为空时返回空路径且不做任何标记。
pub fn propagation_path(
    graph: &mut GraphInner,
    inputs: &NodeArray,
    outputs: &NodeArray,
) -> Result<NodeArray, GraphError> {
    if outputs.is_empty() {
        return Ok(NodeArray::new());
    }
    inputs.set_mark(graph)?;
    outputs.mark_path(graph)?;
    inputs.clear_mark(graph)?;
    let mut path = Vec::new();
    outputs.build_path(graph, &mut path)?;
    Ok(NodeArray::from_ids(path))
}

/// 单参数版本：从`outputs`的全部传递闭包源头（无父节点的祖先）出发的传播路径。
/// 在没有显式割集时使用。
pub fn propagation_path_from_sources(
    graph: &mut GraphInner,
    outputs: &NodeArray,
) -> Result<NodeArray, GraphError> {
    let sources = sources_of(graph, outputs)?;
    propagation_path(graph, &sources, outputs)
}

/// 收集`outputs`的所有无父节点祖先（含输出自身若其无父节点）。
/// 用第二标记（visited）做去重，返回前全部清净。
pub fn sources_of(
    graph: &mut GraphInner,
    outputs: &NodeArray,
) -> Result<NodeArray, GraphError> {
    let mut sources = Vec::new();
    for &id in outputs {
        collect_sources(graph, id, &mut sources)?;
    }
    for &id in outputs {
        clear_visited(graph, id)?;
    }
    Ok(NodeArray::from_ids(sources))
}

fn collect_sources(
    graph: &mut GraphInner,
    id: NodeId,
    out: &mut Vec<NodeId>,
) -> Result<(), GraphError> {
    if graph.get_node(id)?.is_visited() {
        return Ok(());
    }
    graph.get_node_mut(id)?.set_visited(true);
    let parents = graph.get_node_parents(id)?;
    if parents.is_empty() {
        out.push(id);
        return Ok(());
    }
    for p in parents {
        collect_sources(graph, p, out)?;
    }
    Ok(())
}

fn clear_visited(graph: &mut GraphInner, id: NodeId) -> Result<(), GraphError> {
    if !graph.get_node(id)?.is_visited() {
        return Ok(());
    }
    graph.get_node_mut(id)?.set_visited(false);
    let parents = graph.get_node_parents(id)?;
    for p in parents {
        clear_visited(graph, p)?;
    }
    Ok(())
}

/// 返回`inputs→outputs`路径上各节点的、既不在`inputs`中也不在路径上的直接父节点
/// （去重）。数值层隐式依赖的“隐藏”参数即由此发现。
pub fn non_input_parents_of_path(
    graph: &mut GraphInner,
    inputs: &NodeArray,
    outputs: &NodeArray,
) -> Result<NodeArray, GraphError> {
    let path = propagation_path(graph, inputs, outputs)?;

    // 用标记圈出“路径∪输入”，再收集路径节点的未被圈出的父节点
    path.set_mark(graph)?;
    inputs.set_mark(graph)?;

    let mut result = Vec::new();
    for &id in &path {
        let parents = graph.get_node_parents(id)?;
        for p in parents {
            if !graph.is_marked(p)? && !graph.get_node(p)?.is_visited() {
                graph.get_node_mut(p)?.set_visited(true);
                result.push(p);
            }
        }
    }

    // 清净所有临时标记
    path.clear_mark(graph)?;
    inputs.clear_mark(graph)?;
    for &p in &result {
        graph.get_node_mut(p)?.set_visited(false);
    }

    Ok(NodeArray::from_ids(result))
}
