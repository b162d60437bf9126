/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : RvNet/RandomVar——随机变量网络的用户级句柄。
 *                 用户像写算式一样声明概率模型（`&a + &b`、`x.exp()`、
 *                 `net.normal(&mu, &lv)`……），再通过log_p/p/sample/em发起推断。
 */

use super::em::EmOptions;
use super::inner::RvNetInner;
use super::instance::{ConditionalExpression, RVInstance, RVInstanceArray};
use super::raw_rv::{ExpRv, JointRv, LogRv, MinusRv, NegRv, PlusRv, RvKind, TimesRv};
use super::rv::RvId;
use crate::data::VMat;
use crate::graph::{Graph, GraphError, Var};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

// ==================== RvNet 句柄 ====================

/// 随机变量网络的用户级句柄（共享引用，Clone开销极低）
#[derive(Clone)]
pub struct RvNet {
    inner: Rc<RefCell<RvNetInner>>,
}

impl RvNet {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RvNetInner::new())),
        }
    }

    /// 创建带固定种子的网络（采样可重复）
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RvNetInner::new_with_seed(seed))),
        }
    }

    /// 底层计算图的句柄
    pub fn graph(&self) -> Graph {
        Graph::from_rc(self.inner.borrow().graph_rc())
    }

    pub fn rvs_count(&self) -> usize {
        self.inner.borrow().rvs_count()
    }

    /// 网络中是否存在任何残留推断标记（测试标记卫生用）
    pub fn any_marks_set(&self) -> bool {
        self.inner.borrow().any_marks_set()
    }

    // ========== 变量声明 ==========

    /// 非随机变量（常量或可学习参数）
    pub fn non_random(
        &self,
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<RandomVar, GraphError> {
        let id = self.inner.borrow_mut().add_non_random(value, name)?;
        Ok(self.rv(id))
    }

    /// 对角正态变量，参数为均值与对数方差
    pub fn normal(
        &self,
        mean: &RandomVar,
        log_variance: &RandomVar,
        name: Option<&str>,
    ) -> Result<RandomVar, GraphError> {
        let id = self
            .inner
            .borrow_mut()
            .add_normal(mean.id, log_variance.id, name)?;
        Ok(self.rv(id))
    }

    /// 多项变量，参数为概率向量（观测约定为one-hot）
    pub fn multinomial(
        &self,
        probabilities: &RandomVar,
        name: Option<&str>,
    ) -> Result<RandomVar, GraphError> {
        let id = self
            .inner
            .borrow_mut()
            .add_multinomial(probabilities.id, name)?;
        Ok(self.rv(id))
    }

    /// 联合变量：把若干成员按列拼接
    pub fn joint(
        &self,
        members: &[&RandomVar],
        name: Option<&str>,
    ) -> Result<RandomVar, GraphError> {
        let parents = members.iter().map(|m| m.id).collect();
        let id = self
            .inner
            .borrow_mut()
            .add_functional(RvKind::Joint(JointRv), parents, name)?;
        Ok(self.rv(id))
    }

    fn rv(&self, id: RvId) -> RandomVar {
        RandomVar {
            id,
            net: Rc::clone(&self.inner),
        }
    }

    // ========== 推断 ==========

    /// 构造条件对数概率logP(lhs=v | rhs)的符号表达式，返回其[1,1]节点的Var句柄。
    /// 返回前网络的推断标记已全部洁净。
    pub fn log_p(&self, ce: &ConditionalExpression) -> Result<Var, GraphError> {
        let rhs = ce.rhs.bindings();
        let node = self
            .inner
            .borrow_mut()
            .log_p(ce.lhs.rv.id, ce.lhs.v.id(), &rhs)?;
        Ok(Var::from_parts(node, self.inner.borrow().graph_rc()))
    }

    /// P(lhs|rhs) = exp(logP)
    pub fn p(&self, ce: &ConditionalExpression) -> Result<Var, GraphError> {
        let log_p = self.log_p(ce)?;
        let graph = self.inner.borrow().graph_rc();
        let node = graph.borrow_mut().new_exp_node(log_p.id(), None)?;
        Ok(Var::from_parts(node, graph))
    }

    /// 在给定RHS观测的条件下对`rv`数值采样
    pub fn sample(&self, rv: &RandomVar, rhs: &RVInstanceArray) -> Result<Tensor, GraphError> {
        let rhs = rhs.bindings();
        self.inner.borrow_mut().sample(rv.id, &rhs)
    }

    /// 广义EM训练。返回最后一轮的总负对数似然。
    pub fn em(
        &self,
        ce: &ConditionalExpression,
        parameters_to_learn: &[RandomVar],
        data: &dyn VMat,
        n_samples: usize,
        options: &EmOptions,
    ) -> Result<f32, GraphError> {
        let rhs = ce.rhs.bindings();
        let params: Vec<RvId> = parameters_to_learn.iter().map(|p| p.id).collect();
        self.inner.borrow_mut().em(
            ce.lhs.rv.id,
            ce.lhs.v.id(),
            &rhs,
            &params,
            data,
            n_samples,
            options,
        )
    }
}

impl Default for RvNet {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== RandomVar 句柄 ====================

/// 携带网络引用的随机变量句柄
#[derive(Clone)]
pub struct RandomVar {
    pub(crate) id: RvId,
    net: Rc<RefCell<RvNetInner>>,
}

impl std::fmt::Debug for RandomVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomVar").field("id", &self.id).finish()
    }
}

impl RandomVar {
    pub fn rv_number(&self) -> u64 {
        self.id.0
    }

    pub fn name(&self) -> String {
        self.net
            .borrow()
            .get_rv(self.id)
            .expect("RandomVar引用的随机变量应存在")
            .name()
            .to_string()
    }

    /// 当前绑定的值节点的数值
    pub fn value(&self) -> Tensor {
        self.net
            .borrow()
            .rv_value_tensor(self.id)
            .expect("RandomVar引用的随机变量应存在")
    }

    pub fn is_discrete(&self) -> bool {
        self.net
            .borrow()
            .is_discrete(self.id)
            .expect("RandomVar引用的随机变量应存在")
    }

    pub fn is_non_random(&self) -> bool {
        self.net
            .borrow()
            .is_non_random(self.id)
            .expect("RandomVar引用的随机变量应存在")
    }

    /// 观测绑定`V == v`：在计算图中为观测值创建源节点
    pub fn instance(&self, observation: &Tensor) -> Result<RVInstance, GraphError> {
        let graph = self.net.borrow().graph_rc();
        let node = graph
            .borrow_mut()
            .new_source_node_with_value(observation, None)?;
        Ok(RVInstance {
            rv: self.clone(),
            v: Var::from_parts(node, graph),
        })
    }

    // ========== 可失败的函数型组合 ==========

    pub fn try_plus(&self, other: &RandomVar) -> Result<RandomVar, GraphError> {
        self.functional(RvKind::Plus(PlusRv), vec![self.id, other.id])
    }

    pub fn try_minus(&self, other: &RandomVar) -> Result<RandomVar, GraphError> {
        self.functional(RvKind::Minus(MinusRv), vec![self.id, other.id])
    }

    pub fn try_times(&self, other: &RandomVar) -> Result<RandomVar, GraphError> {
        self.functional(RvKind::Times(TimesRv), vec![self.id, other.id])
    }

    // ========== 链式一元组合 ==========

    pub fn exp(&self) -> RandomVar {
        self.functional(RvKind::Exp(ExpRv), vec![self.id])
            .expect("RandomVar exp失败")
    }

    pub fn log(&self) -> RandomVar {
        self.functional(RvKind::Log(LogRv), vec![self.id])
            .expect("RandomVar log失败")
    }

    fn functional(&self, kind: RvKind, parents: Vec<RvId>) -> Result<RandomVar, GraphError> {
        let id = self.net.borrow_mut().add_functional(kind, parents, None)?;
        Ok(RandomVar {
            id,
            net: Rc::clone(&self.net),
        })
    }
}

// ==================== 算子重载 ====================

impl Add for &RandomVar {
    type Output = RandomVar;

    fn add(self, other: &RandomVar) -> RandomVar {
        self.try_plus(other).expect("RandomVar 加法失败")
    }
}

impl Add for RandomVar {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for &RandomVar {
    type Output = RandomVar;

    fn sub(self, other: &RandomVar) -> RandomVar {
        self.try_minus(other).expect("RandomVar 减法失败")
    }
}

impl Sub for RandomVar {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Mul for &RandomVar {
    type Output = RandomVar;

    fn mul(self, other: &RandomVar) -> RandomVar {
        self.try_times(other).expect("RandomVar 乘法失败")
    }
}

impl Mul for RandomVar {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        &self * &other
    }
}

impl Neg for &RandomVar {
    type Output = RandomVar;

    fn neg(self) -> RandomVar {
        self.functional(RvKind::Neg(NegRv), vec![self.id])
            .expect("RandomVar 取负失败")
    }
}

impl Neg for RandomVar {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
