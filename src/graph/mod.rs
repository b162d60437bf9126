/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 符号计算图模块。
 *                 `GraphInner`是arena式底层实现；`Graph`/`Var`是用户级句柄；
 *                 `NodeArray`+`path`提供传播路径的提取与批量fprop/bprop。
 */

mod error;
mod inner;
mod node;
mod node_array;
mod path;
mod raw_node;
mod var;

#[cfg(test)]
mod tests;

pub use error::GraphError;
pub use inner::GraphInner;
pub use node::NodeId;
pub use node_array::NodeArray;
pub use path::{
    non_input_parents_of_path, propagation_path, propagation_path_from_sources, sources_of,
};
pub use var::{Graph, Var};
