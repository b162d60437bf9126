/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Graph/Var——用户级句柄，支持算子重载与链式调用。
 *                 Var持有`Rc<RefCell<GraphInner>>`引用；用户像写普通算式一样
 *                 组合表达式（`&x + &y`、`x.exp()`……），每次组合都在图中构造节点。
 */

use super::error::GraphError;
use super::inner::GraphInner;
use super::node::NodeId;
use super::node_array::NodeArray;
use super::path::{propagation_path_from_sources, sources_of};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

// ==================== Graph 句柄 ====================

/// 计算图的用户级句柄（共享引用，Clone开销极低）
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    pub(crate) fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner::new())),
        }
    }

    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner::new_with_seed(seed))),
        }
    }

    pub fn set_seed(&self, seed: u64) {
        self.inner.borrow_mut().set_seed(seed);
    }

    pub fn has_seed(&self) -> bool {
        self.inner.borrow().has_seed()
    }

    pub fn nodes_count(&self) -> usize {
        self.inner.borrow().nodes_count()
    }

    /// 图中是否存在任何残留遍历标记（测试标记卫生用）
    pub fn any_marks_set(&self) -> bool {
        self.inner.borrow().any_marks_set()
    }

    /// 创建带初值的源节点并返回其Var句柄
    pub fn source(&self, value: &Tensor, name: Option<&str>) -> Result<Var, GraphError> {
        let id = self
            .inner
            .borrow_mut()
            .new_source_node_with_value(value, name)?;
        Ok(self.var(id))
    }

    /// 创建全零源节点并返回其Var句柄
    pub fn zeros_source(&self, shape: &[usize], name: Option<&str>) -> Result<Var, GraphError> {
        let id = self.inner.borrow_mut().new_source_node(shape, name)?;
        Ok(self.var(id))
    }

    /// 常量就是不再改值的源节点
    pub fn constant(&self, value: &Tensor) -> Result<Var, GraphError> {
        self.source(value, None)
    }

    pub(crate) fn var(&self, id: NodeId) -> Var {
        Var {
            id,
            graph: Rc::clone(&self.inner),
        }
    }

    pub(crate) fn inner_rc(&self) -> Rc<RefCell<GraphInner>> {
        Rc::clone(&self.inner)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Var 句柄 ====================

/// 携带图引用的节点句柄。
///
/// # 使用示例
/// ```ignore
/// let g = Graph::new();
/// let x = g.source(&Tensor::from_row(&[1.0, 2.0, 3.0]), Some("x"))?;
/// let y = x.exp();
/// let loss = y.sum();
/// loss.forward()?;
/// loss.backward()?;
/// let dx = x.gradient();
/// ```
#[derive(Clone)]
pub struct Var {
    id: NodeId,
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    pub(crate) fn from_parts(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> Tensor {
        self.graph
            .borrow()
            .get_node_value(self.id)
            .expect("Var引用的节点应存在")
            .clone()
    }

    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_value(self.id, value)
    }

    pub fn gradient(&self) -> Tensor {
        self.graph
            .borrow()
            .get_node_gradient(self.id)
            .expect("Var引用的节点应存在")
            .clone()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.graph
            .borrow()
            .get_node_value_shape(self.id)
            .expect("Var引用的节点应存在")
    }

    /// 从所有源头前向传播到本节点，返回算得的值
    pub fn forward(&self) -> Result<Tensor, GraphError> {
        let mut g = self.graph.borrow_mut();
        let outputs = NodeArray::from_ids(vec![self.id]);
        let path = propagation_path_from_sources(&mut g, &outputs)?;
        path.fprop(&mut g)?;
        Ok(g.get_node_value(self.id)?.clone())
    }

    /// 反向传播：清零路径与其源头的梯度，在本节点播种全一梯度后逆序回传。
    /// 调用前须已forward过（或自行fprop过路径）。
    pub fn backward(&self) -> Result<(), GraphError> {
        let mut g = self.graph.borrow_mut();
        let outputs = NodeArray::from_ids(vec![self.id]);
        let path = propagation_path_from_sources(&mut g, &outputs)?;
        let sources = sources_of(&mut g, &outputs)?;
        path.clear_gradient(&mut g)?;
        sources.clear_gradient(&mut g)?;
        g.seed_gradient(self.id)?;
        path.bprop(&mut g)?;
        Ok(())
    }

    // ========== 可失败的算子构造 ==========

    pub fn try_add(&self, other: &Var) -> Result<Var, GraphError> {
        let id = self
            .graph
            .borrow_mut()
            .new_add_node(&[self.id, other.id], None)?;
        Ok(self.peer(id))
    }

    pub fn try_sub(&self, other: &Var) -> Result<Var, GraphError> {
        let id = self
            .graph
            .borrow_mut()
            .new_subtract_node(self.id, other.id, None)?;
        Ok(self.peer(id))
    }

    pub fn try_mul(&self, other: &Var) -> Result<Var, GraphError> {
        let id = self
            .graph
            .borrow_mut()
            .new_multiply_node(self.id, other.id, None)?;
        Ok(self.peer(id))
    }

    pub fn try_div(&self, other: &Var) -> Result<Var, GraphError> {
        let id = self
            .graph
            .borrow_mut()
            .new_divide_node(self.id, other.id, None)?;
        Ok(self.peer(id))
    }

    pub fn try_isequal(&self, other: &Var) -> Result<Var, GraphError> {
        let id = self
            .graph
            .borrow_mut()
            .new_is_equal_node(self.id, other.id, None)?;
        Ok(self.peer(id))
    }

    // ========== 链式一元算子 ==========

    pub fn exp(&self) -> Var {
        let id = self
            .graph
            .borrow_mut()
            .new_exp_node(self.id, None)
            .expect("Var exp失败");
        self.peer(id)
    }

    pub fn log(&self) -> Var {
        let id = self
            .graph
            .borrow_mut()
            .new_log_node(self.id, None)
            .expect("Var log失败");
        self.peer(id)
    }

    pub fn abs(&self) -> Var {
        let id = self
            .graph
            .borrow_mut()
            .new_abs_node(self.id, None)
            .expect("Var abs失败");
        self.peer(id)
    }

    pub fn square(&self) -> Var {
        let id = self
            .graph
            .borrow_mut()
            .new_square_node(self.id, None)
            .expect("Var square失败");
        self.peer(id)
    }

    pub fn sum(&self) -> Var {
        let id = self
            .graph
            .borrow_mut()
            .new_sum_node(self.id, None)
            .expect("Var sum失败");
        self.peer(id)
    }

    pub fn scale(&self, k: f32) -> Var {
        let id = self
            .graph
            .borrow_mut()
            .new_scalar_multiply_node(k, self.id, None)
            .expect("Var scale失败");
        self.peer(id)
    }

    fn peer(&self, id: NodeId) -> Var {
        Var {
            id,
            graph: Rc::clone(&self.graph),
        }
    }
}

// ==================== 算子重载 ====================

impl Add for &Var {
    type Output = Var;

    fn add(self, other: &Var) -> Var {
        self.try_add(other).expect("Var 加法失败")
    }
}

impl Add for Var {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for &Var {
    type Output = Var;

    fn sub(self, other: &Var) -> Var {
        self.try_sub(other).expect("Var 减法失败")
    }
}

impl Sub for Var {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Mul for &Var {
    type Output = Var;

    fn mul(self, other: &Var) -> Var {
        self.try_mul(other).expect("Var 乘法失败")
    }
}

impl Mul for Var {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        &self * &other
    }
}

impl Div for &Var {
    type Output = Var;

    fn div(self, other: &Var) -> Var {
        self.try_div(other).expect("Var 除法失败")
    }
}

impl Div for Var {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        &self / &other
    }
}

impl Neg for &Var {
    type Output = Var;

    fn neg(self) -> Var {
        let id = self
            .graph
            .borrow_mut()
            .new_negate_node(self.id, None)
            .expect("Var 取负失败");
        self.peer(id)
    }
}

impl Neg for Var {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
