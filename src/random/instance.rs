/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 观测绑定相关类型：
 *                 RVInstance是一条等式`V == v`（随机变量配上观测值节点）；
 *                 RVInstanceArray是其有序列表，按rv_number排序即得
 *                 先祖先后子孙的条件化顺序（链式法则）；
 *                 ConditionalExpression建模查询P(LHS | RHS)。
 */

use super::net::RandomVar;
use super::rv::RvId;
use crate::graph::{NodeId, Var};

/// 观测绑定`V == v`
#[derive(Clone)]
pub struct RVInstance {
    pub rv: RandomVar,
    pub v: Var,
}

impl RVInstance {
    pub fn new(rv: RandomVar, v: Var) -> Self {
        Self { rv, v }
    }

    /// 与RHS观测组成条件查询P(self | rhs)
    pub fn given(self, rhs: RVInstanceArray) -> ConditionalExpression {
        ConditionalExpression { lhs: self, rhs }
    }
}

/// 观测绑定的有序列表
#[derive(Clone, Default)]
pub struct RVInstanceArray {
    items: Vec<RVInstance>,
}

impl RVInstanceArray {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, instance: RVInstance) {
        self.items.push(instance);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RVInstance> {
        self.items.iter()
    }

    /// 按rv_number升序排序。由于父变量先于子变量创建，
    /// 排序后即是一个合法的先祖先后子孙处理顺序。
    pub fn sort(&mut self) {
        self.items.sort_by_key(|inst| inst.rv.rv_number());
    }

    /// 所有观测值的元素总数
    pub fn total_length(&self) -> usize {
        self.items
            .iter()
            .map(|inst| inst.v.shape().iter().product::<usize>())
            .sum()
    }

    pub(crate) fn bindings(&self) -> Vec<(RvId, NodeId)> {
        self.items
            .iter()
            .map(|inst| (inst.rv.id, inst.v.id()))
            .collect()
    }
}

impl std::ops::Index<usize> for RVInstanceArray {
    type Output = RVInstance;

    fn index(&self, ix: usize) -> &RVInstance {
        &self.items[ix]
    }
}

impl FromIterator<RVInstance> for RVInstanceArray {
    fn from_iter<T: IntoIterator<Item = RVInstance>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// 条件查询P(LHS | RHS)
#[derive(Clone)]
pub struct ConditionalExpression {
    pub lhs: RVInstance,
    pub rhs: RVInstanceArray,
}

impl ConditionalExpression {
    pub fn new(lhs: RVInstance, rhs: RVInstanceArray) -> Self {
        Self { lhs, rhs }
    }

    /// 无条件查询P(LHS)
    pub fn unconditional(lhs: RVInstance) -> Self {
        Self {
            lhs,
            rhs: RVInstanceArray::new(),
        }
    }
}
