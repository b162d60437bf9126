/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 随机变量种类目录。
 *                 三大类别：非随机（NonRandom，包一个源节点）、随机源
 *                 （Stochastic：Normal/Multinomial，自带闭式logP与采样）、
 *                 函数型（Functional：对父变量做确定性变换，logP靠解析逆
 *                 加雅可比修正归结到父变量）。
 *                 与节点算子目录一样，这里的种类集是可扩展的：
 *                 外部种类只需实现TraitRv契约即可接入。
 */

mod exp;
mod joint;
mod log;
mod minus;
mod multinomial;
mod neg;
mod non_random;
mod normal;
mod plus;
mod times;

pub(crate) use exp::ExpRv;
pub(crate) use joint::JointRv;
pub(crate) use log::LogRv;
pub(crate) use minus::MinusRv;
pub(crate) use multinomial::MultinomialRv;
pub(crate) use neg::NegRv;
pub(crate) use non_random::NonRandomRv;
pub(crate) use normal::NormalRv;
pub(crate) use plus::PlusRv;
pub(crate) use times::TimesRv;

use crate::graph::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;
use rand::rngs::StdRng;

/// 随机变量的类别，决定推断时的解析策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RvCategory {
    NonRandom,
    Stochastic,
    Functional,
}

#[enum_dispatch]
#[derive(Clone)]
pub(crate) enum RvKind {
    NonRandom(NonRandomRv),
    Normal(NormalRv),
    Multinomial(MultinomialRv),
    Plus(PlusRv),
    Minus(MinusRv),
    Times(TimesRv),
    Exp(ExpRv),
    Log(LogRv),
    Neg(NegRv),
    Joint(JointRv),
}

#[enum_dispatch(RvKind)]
pub(crate) trait TraitRv {
    fn rv_name(&self) -> &'static str;

    fn category(&self) -> RvCategory;

    /// Some(x)表示离散性与父变量无关；None表示由全部父变量的离散性共同决定
    fn own_discrete(&self) -> Option<bool> {
        None
    }

    /// 用父变量当前的值节点重建本变量的值节点
    /// （条件化改变后，非随机后代据此获得新的数值子图）
    fn rebuild_value(
        &self,
        graph: &mut GraphInner,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError>;

    /// 随机源类别的闭式logP表达式构造（返回[1,1]标量节点）
    fn build_log_p(
        &self,
        _graph: &mut GraphInner,
        _obs: NodeId,
        _parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}随机变量没有内在的logP表达式",
            self.rv_name()
        )))
    }

    /// 函数型类别的解析逆：给定本变量的观测节点与未观测父变量的下标，
    /// 返回该父变量的变换后观测节点与可选的雅可比修正节点（加进logP）。
    /// 返回None表示该变换不可逆（上层转入边缘化，报不支持）。
    fn invert(
        &self,
        _graph: &mut GraphInner,
        _obs: NodeId,
        _parent_ix: usize,
        _parent_values: &[NodeId],
    ) -> Result<Option<(NodeId, Option<NodeId>)>, GraphError> {
        Ok(None)
    }

    /// `invert`的数值版本（EM统计沿函数型节点回传观测值时使用）
    fn invert_tensor(
        &self,
        _obs: &Tensor,
        _parent_ix: usize,
        _parent_tensors: &[&Tensor],
    ) -> Result<Option<Tensor>, GraphError> {
        Ok(None)
    }

    /// 函数型类别的数值前向（采样时自底向上求值）
    fn forward_tensor(&self, _parent_tensors: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}随机变量不支持数值前向",
            self.rv_name()
        )))
    }

    /// 数值采样。函数型类别退化为数值前向。
    fn sample_tensor(
        &self,
        _rng: &mut StdRng,
        parent_tensors: &[&Tensor],
    ) -> Result<Tensor, GraphError> {
        self.forward_tensor(parent_tensors)
    }

    /// 多个未观测父变量是否可各自独立求逆（目前只有Joint成立）
    fn splits_parents(&self) -> bool {
        false
    }

    // ========== EM钩子（随机源类别重写） ==========

    /// 清零本轮的充分统计量累积器。`width`是观测行向量的宽度。
    fn em_epoch_initialize(&mut self, _width: usize) {}

    /// 累加一条观测的充分统计量贡献。一轮内必须可加（只累加，不覆盖）。
    fn em_accumulate(&mut self, _obs: &Tensor, _posterior: f32) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}随机变量不支持EM统计累积",
            self.rv_name()
        )))
    }

    /// 闭式参数更新：返回(父变量下标, 新参数值)的列表。
    /// 统计量退化（分母为0等）时对应参数不出现在列表中（静默保持旧值）。
    fn em_update(&mut self) -> Result<Vec<(usize, Tensor)>, GraphError> {
        Ok(Vec::new())
    }

    /// 收敛一票否决：返回false可阻止EM循环在数值判据满足时停止
    fn can_stop_em(&self) -> bool {
        true
    }
}
