/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : GraphInner：计算图的底层实现（arena + NodeId边表）。
 *
 * 模块划分：
 * - `core`     : 创建、访问器、ID/名称生成、标记与梯度管理
 * - `builders` : 各算子节点的构造入口
 * - `propagate`: 单节点fprop/bprop
 */

mod builders;
mod core;
mod propagate;

use super::node::{Node, NodeId};
use rand::rngs::StdRng;
use std::collections::HashMap;

pub struct GraphInner {
    name: String,
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
    rng: Option<StdRng>,
}
