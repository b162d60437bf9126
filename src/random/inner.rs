/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : RvNetInner：随机变量网络的底层实现（arena + RvId边表），
 *                 与计算图通过每个随机变量的`value`活绑定耦合。
 *
 * 每次推断调用（log_p/p/sample/em）的状态机：
 *   1. mark_rhs_and_set_known_values：绑定RHS观测并标记，再从LHS根递归解析——
 *      所有父变量都解析为非随机的函数型/非随机变量重建自己的值节点并变为marked；
 *   2. 执行本次调用的构造/求值；
 *   3. restore_marks：清除marked/pmark，恢复洁净状态后才返回
 *      （标记泄漏会污染下一次调用的结果）。
 */

use super::raw_rv::{RvCategory, RvKind, TraitRv};
use super::rv::{Rv, RvId};
use crate::graph::{
    propagation_path_from_sources, GraphError, GraphInner, NodeArray, NodeId,
};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) struct RvNetInner {
    graph: Rc<RefCell<GraphInner>>,
    rvs: HashMap<RvId, Rv>,
    next_id: u64,
}

impl RvNetInner {
    pub(crate) fn new() -> Self {
        Self {
            graph: Rc::new(RefCell::new(GraphInner::new())),
            rvs: HashMap::new(),
            next_id: 0,
        }
    }

    pub(crate) fn new_with_seed(seed: u64) -> Self {
        let inner = Self::new();
        inner.graph.borrow_mut().set_seed(seed);
        inner
    }

    pub(crate) fn graph_rc(&self) -> Rc<RefCell<GraphInner>> {
        Rc::clone(&self.graph)
    }

    pub(crate) fn rvs_count(&self) -> usize {
        self.rvs.len()
    }

    // ========== 访问器 ==========

    pub(crate) fn get_rv(&self, id: RvId) -> Result<&Rv, GraphError> {
        self.rvs
            .get(&id)
            .ok_or_else(|| GraphError::InvalidOperation(format!("{id}不存在")))
    }

    pub(crate) fn get_rv_mut(&mut self, id: RvId) -> Result<&mut Rv, GraphError> {
        self.rvs
            .get_mut(&id)
            .ok_or_else(|| GraphError::InvalidOperation(format!("{id}不存在")))
    }

    pub(crate) fn rv_value_node(&self, id: RvId) -> Result<NodeId, GraphError> {
        Ok(self.get_rv(id)?.value)
    }

    pub(crate) fn rv_value_tensor(&self, id: RvId) -> Result<Tensor, GraphError> {
        let node = self.get_rv(id)?.value;
        Ok(self.graph.borrow().get_node_value(node)?.clone())
    }

    /// 网络中是否存在任何残留的推断标记（测试标记卫生用）
    pub(crate) fn any_marks_set(&self) -> bool {
        self.rvs
            .values()
            .any(|rv| rv.marked || rv.pmark || rv.em_mark)
    }

    fn parent_value_nodes(&self, parents: &[RvId]) -> Result<Vec<NodeId>, GraphError> {
        parents.iter().map(|&p| self.rv_value_node(p)).collect()
    }

    // ========== 构造 ==========

    fn generate_valid_rv_name(
        &self,
        base_name: &str,
        rv_type: &str,
    ) -> Result<String, GraphError> {
        if !base_name.is_empty() {
            if self.rvs.values().any(|rv| rv.name() == base_name) {
                return Err(GraphError::DuplicateNodeName(format!(
                    "随机变量{base_name}在网络中重复"
                )));
            }
            return Ok(base_name.to_string());
        }
        let mut counter = 1;
        loop {
            let name = format!("{rv_type}_{counter}");
            if !self.rvs.values().any(|rv| rv.name() == name) {
                return Ok(name);
            }
            counter += 1;
        }
    }

    fn insert_rv(
        &mut self,
        kind: RvKind,
        parents: Vec<RvId>,
        value: NodeId,
        name: Option<&str>,
    ) -> Result<RvId, GraphError> {
        let name = self.generate_valid_rv_name(name.unwrap_or(""), kind.rv_name())?;
        // 先递增再返回，与节点ID的生成方式一致
        self.next_id += 1;
        let id = RvId(self.next_id);
        self.rvs.insert(id, Rv::new(id, name, kind, parents, value));
        Ok(id)
    }

    pub(crate) fn add_non_random(
        &mut self,
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<RvId, GraphError> {
        let node = self
            .graph
            .borrow_mut()
            .new_source_node_with_value(value, None)?;
        let kind = RvKind::NonRandom(super::raw_rv::NonRandomRv::new(node, value));
        self.insert_rv(kind, Vec::new(), node, name)
    }

    pub(crate) fn add_normal(
        &mut self,
        mean: RvId,
        log_variance: RvId,
        name: Option<&str>,
    ) -> Result<RvId, GraphError> {
        let mean_shape = {
            let g = self.graph.borrow();
            g.get_node_value_shape(self.rv_value_node(mean)?)?
        };
        let lv_shape = {
            let g = self.graph.borrow();
            g.get_node_value_shape(self.rv_value_node(log_variance)?)?
        };
        if mean_shape != lv_shape {
            return Err(GraphError::ShapeMismatch {
                expected: mean_shape,
                got: lv_shape,
                message: "normal随机变量的均值与对数方差形状必须相同".to_string(),
            });
        }
        // 值节点是占位的零源节点，采样/条件化时才被赋值或重绑
        let node = self.graph.borrow_mut().new_source_node(&mean_shape, None)?;
        self.insert_rv(
            RvKind::Normal(super::raw_rv::NormalRv::new()),
            vec![mean, log_variance],
            node,
            name,
        )
    }

    pub(crate) fn add_multinomial(
        &mut self,
        probabilities: RvId,
        name: Option<&str>,
    ) -> Result<RvId, GraphError> {
        let shape = {
            let g = self.graph.borrow();
            g.get_node_value_shape(self.rv_value_node(probabilities)?)?
        };
        if shape[0] != 1 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![1, shape[1]],
                got: shape,
                message: "multinomial随机变量的概率向量必须是行向量[1,d]".to_string(),
            });
        }
        let node = self.graph.borrow_mut().new_source_node(&shape, None)?;
        self.insert_rv(
            RvKind::Multinomial(super::raw_rv::MultinomialRv::new()),
            vec![probabilities],
            node,
            name,
        )
    }

    pub(crate) fn add_functional(
        &mut self,
        kind: RvKind,
        parents: Vec<RvId>,
        name: Option<&str>,
    ) -> Result<RvId, GraphError> {
        let parent_nodes = self.parent_value_nodes(&parents)?;
        let node = {
            let mut g = self.graph.borrow_mut();
            kind.rebuild_value(&mut g, &parent_nodes)?
        };
        self.insert_rv(kind, parents, node, name)
    }

    // ========== 离散性与随机性的递归判定 ==========

    pub(crate) fn is_discrete(&self, id: RvId) -> Result<bool, GraphError> {
        let rv = self.get_rv(id)?;
        if let Some(d) = rv.kind.own_discrete() {
            return Ok(d);
        }
        for &p in &rv.parents {
            if !self.is_discrete(p)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn is_non_random(&self, id: RvId) -> Result<bool, GraphError> {
        let rv = self.get_rv(id)?;
        match rv.kind.category() {
            RvCategory::NonRandom => Ok(true),
            RvCategory::Stochastic => Ok(false),
            RvCategory::Functional => {
                for &p in &rv.parents {
                    if !self.is_non_random(p)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    // ========== 标记状态机 ==========

    /// 条件化：把每个RHS观测节点绑定为对应变量的当前值并直接标记，
    /// 再从LHS根递归解析非随机祖先。
    pub(crate) fn mark_rhs_and_set_known_values(
        &mut self,
        lhs: RvId,
        rhs: &[(RvId, NodeId)],
    ) -> Result<(), GraphError> {
        for &(r, obs) in rhs {
            let rv = self.get_rv_mut(r)?;
            rv.value = obs;
            rv.marked = true;
        }
        self.set_known_values(lhs)
    }

    /// 递归解析：pmark防重入；所有父变量都marked的非随机源类变量
    /// 重建自己的值节点并变为marked（解析为非随机）。
    pub(crate) fn set_known_values(&mut self, id: RvId) -> Result<(), GraphError> {
        {
            let rv = self.get_rv(id)?;
            if rv.marked || rv.pmark {
                return Ok(());
            }
        }
        self.get_rv_mut(id)?.pmark = true;

        let parents = self.get_rv(id)?.parents.clone();
        for &p in &parents {
            self.set_known_values(p)?;
        }

        let mut all_marked = true;
        for &p in &parents {
            if !self.get_rv(p)?.marked {
                all_marked = false;
                break;
            }
        }
        let category = self.get_rv(id)?.kind.category();
        if all_marked && category != RvCategory::Stochastic {
            let parent_nodes = self.parent_value_nodes(&parents)?;
            let node = {
                let mut g = self.graph.borrow_mut();
                self.get_rv(id)?.kind.rebuild_value(&mut g, &parent_nodes)?
            };
            let rv = self.get_rv_mut(id)?;
            rv.value = node;
            rv.marked = true;
        }
        Ok(())
    }

    /// 清除本变量及全部祖先的marked/pmark。两标记皆空的变量视为已洁净，
    /// 不再深入（这同时是递归的终止卫兵）。
    pub(crate) fn unmark_ancestors(&mut self, id: RvId) -> Result<(), GraphError> {
        {
            let rv = self.get_rv(id)?;
            if !rv.marked && !rv.pmark {
                return Ok(());
            }
        }
        {
            let rv = self.get_rv_mut(id)?;
            rv.marked = false;
            rv.pmark = false;
        }
        let parents = self.get_rv(id)?.parents.clone();
        for &p in &parents {
            self.unmark_ancestors(p)?;
        }
        Ok(())
    }

    /// 每个顶层推断调用返回前的洁净化：LHS与每个RHS变量的祖先全部去标记
    pub(crate) fn restore_marks(
        &mut self,
        lhs: RvId,
        rhs: &[(RvId, NodeId)],
    ) -> Result<(), GraphError> {
        self.unmark_ancestors(lhs)?;
        for &(r, _) in rhs {
            self.unmark_ancestors(r)?;
        }
        Ok(())
    }

    // ========== logP构造 ==========

    pub(crate) fn log_p(
        &mut self,
        lhs: RvId,
        obs: NodeId,
        rhs: &[(RvId, NodeId)],
    ) -> Result<NodeId, GraphError> {
        self.mark_rhs_and_set_known_values(lhs, rhs)?;
        let result = self.build_log_p(lhs, obs);
        self.restore_marks(lhs, rhs)?;
        result
    }

    /// 条件对数概率的符号构造（标记已由调用方设好）：
    /// - 随机源：种类自带的闭式表达式；
    /// - 非随机/函数型：收集未解析的父变量——
    ///   没有 → 指示函数（离散），或指示函数×巨常数的占位“密度”（连续）；
    ///   可逆 → 对每个未观测父变量递归构造其logP并加上雅可比修正；
    ///   其余 → 归入一般边缘化（未实现，报不支持）。
    pub(crate) fn build_log_p(&mut self, id: RvId, obs: NodeId) -> Result<NodeId, GraphError> {
        let kind = self.get_rv(id)?.kind.clone();
        let parents = self.get_rv(id)?.parents.clone();
        let parent_nodes = self.parent_value_nodes(&parents)?;

        if kind.category() == RvCategory::Stochastic {
            let mut g = self.graph.borrow_mut();
            return kind.build_log_p(&mut g, obs, &parent_nodes);
        }

        let mut unobserved = Vec::new();
        for (ix, &p) in parents.iter().enumerate() {
            if !self.get_rv(p)?.marked {
                unobserved.push(ix);
            }
        }

        if unobserved.is_empty() {
            // 完全观测的确定性情形
            let discrete = self.is_discrete(id)?;
            let value_node = self.get_rv(id)?.value;
            let mut g = self.graph.borrow_mut();
            let indicator = g.new_is_equal_node(value_node, obs, None)?;
            return if discrete {
                Ok(indicator)
            } else {
                // 占位“密度”：指示函数×巨常数，而非真正的广义密度
                g.new_scalar_multiply_node(f32::MAX, indicator, None)
            };
        }

        if unobserved.len() > 1 && !kind.splits_parents() {
            return self.marginalize(id);
        }

        let mut terms = Vec::new();
        for ix in unobserved {
            let inverted = {
                let mut g = self.graph.borrow_mut();
                kind.invert(&mut g, obs, ix, &parent_nodes)?
            };
            let Some((transformed, jacobian)) = inverted else {
                return self.marginalize(id);
            };
            terms.push(self.build_log_p(parents[ix], transformed)?);
            if let Some(j) = jacobian {
                terms.push(j);
            }
        }
        if terms.len() == 1 {
            Ok(terms[0])
        } else {
            self.graph.borrow_mut().new_add_node(&terms, None)
        }
    }

    /// 一般边缘化未实现：只支持具体种类能直接处理的情形
    fn marginalize(&self, id: RvId) -> Result<NodeId, GraphError> {
        Err(GraphError::Unsupported(format!(
            "无法对{}做一般的边缘化（未实现）",
            self.get_rv(id)?.name()
        )))
    }

    // ========== 采样 ==========

    pub(crate) fn sample(
        &mut self,
        lhs: RvId,
        rhs: &[(RvId, NodeId)],
    ) -> Result<Tensor, GraphError> {
        self.mark_rhs_and_set_known_values(lhs, rhs)?;
        let result = self.sample_value(lhs);
        self.restore_marks(lhs, rhs)?;
        result
    }

    /// 数值自底向上采样：已解析为非随机的变量对其绑定子图fprop求值；
    /// 随机源用图RNG抽样；函数型对父变量采样结果做数值前向。
    fn sample_value(&mut self, id: RvId) -> Result<Tensor, GraphError> {
        {
            let rv = self.get_rv(id)?;
            if rv.marked {
                let node = rv.value;
                let mut g = self.graph.borrow_mut();
                let outputs = NodeArray::from_ids(vec![node]);
                let path = propagation_path_from_sources(&mut g, &outputs)?;
                path.fprop(&mut g)?;
                return Ok(g.get_node_value(node)?.clone());
            }
        }
        let kind = self.get_rv(id)?.kind.clone();
        let parents = self.get_rv(id)?.parents.clone();

        match kind.category() {
            RvCategory::NonRandom => self.rv_value_tensor(id),
            RvCategory::Functional | RvCategory::Stochastic => {
                let mut parent_tensors = Vec::with_capacity(parents.len());
                for &p in &parents {
                    parent_tensors.push(self.sample_value(p)?);
                }
                let refs: Vec<&Tensor> = parent_tensors.iter().collect();
                if kind.category() == RvCategory::Functional {
                    kind.forward_tensor(&refs)
                } else {
                    let mut g = self.graph.borrow_mut();
                    let rng = g.rng_mut().get_or_insert_with(StdRng::from_entropy);
                    kind.sample_tensor(rng, &refs)
                }
            }
        }
    }
}
