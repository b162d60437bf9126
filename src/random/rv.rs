/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 随机变量的arena条目。
 *                 `value`是进计算图的活绑定：推断调用（条件化、set_known_values）
 *                 会把它整个替换成基于父变量当前值节点新建的表达式节点。
 *                 三个标记的职责：
 *                 - `marked` : 本次遍历中已解析为非随机（值已确定为已知量的函数）；
 *                 - `pmark`  : 解析递归进行中的防重入卫兵；
 *                 - `em_mark`: EM阶段的已访问卫兵（保证每轮每节点恰好更新一次）。
 */

use super::raw_rv::RvKind;
use crate::graph::NodeId;
use std::fmt;

/// 随机变量ID。创建序严格递增，且父变量先于子变量创建，
/// 因此ID顺序同时是一个合法的拓扑序（RVInstanceArray::sort依赖此性质）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RvId(pub u64);

impl fmt::Display for RvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "随机变量#{}", self.0)
    }
}

pub(crate) struct Rv {
    id: RvId,
    name: String,
    pub(crate) kind: RvKind,
    pub(crate) parents: Vec<RvId>,
    /// 活绑定的值节点（可被推断调用重绑）
    pub(crate) value: NodeId,
    pub(crate) marked: bool,
    pub(crate) pmark: bool,
    pub(crate) em_mark: bool,
    /// 每个父变量槽位是否在本次EM调用中被学习（仅在一次EM调用期间有效）
    pub(crate) learn_the_parameters: Vec<bool>,
}

impl Rv {
    pub(crate) fn new(
        id: RvId,
        name: String,
        kind: RvKind,
        parents: Vec<RvId>,
        value: NodeId,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            parents,
            value,
            marked: false,
            pmark: false,
            em_mark: false,
            learn_the_parameters: Vec::new(),
        }
    }

    pub(crate) fn id(&self) -> RvId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}
