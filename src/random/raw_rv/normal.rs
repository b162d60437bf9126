/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 对角正态随机变量。父变量：[0]=均值μ，[1]=对数方差lv（都是[1,d]）。
 *                 用对数方差而非方差做参数，保证EM更新后方差恒正。
 *
 *                 logP(x) = Σ_j -½[ ln2π + lv_j + (x_j-μ_j)²·e^{-lv_j} ]
 *
 *                 EM充分统计量（全观测、后验权重w）：
 *                   Σw、Σw·x、Σw·x² → μ=Σwx/Σw，σ²=Σwx²/Σw−μ²
 *                 （原始矩形式使得全观测高斯EM一轮即闭式收敛到样本均值/方差）
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;
use rand::rngs::StdRng;

#[derive(Clone, Default)]
pub(crate) struct NormalRv {
    sum_w: f32,
    sum_wx: Option<Tensor>,
    sum_wx2: Option<Tensor>,
}

impl NormalRv {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl TraitRv for NormalRv {
    fn rv_name(&self) -> &'static str {
        "normal"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Stochastic
    }

    fn own_discrete(&self) -> Option<bool> {
        Some(false)
    }

    fn rebuild_value(
        &self,
        _graph: &mut GraphInner,
        _parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        Err(GraphError::InvalidOperation(
            "normal随机变量的值不能由父变量确定".to_string(),
        ))
    }

    fn build_log_p(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let mean = parent_values[0];
        let log_variance = parent_values[1];
        let d = graph.get_node_value_shape(obs)?[1];

        // 1. 二次项：(x-μ)²·e^{-lv}
        let diff = graph.new_subtract_node(obs, mean, None)?;
        let sq = graph.new_square_node(diff, None)?;
        let neg_lv = graph.new_negate_node(log_variance, None)?;
        let precision = graph.new_exp_node(neg_lv, None)?;
        let quad = graph.new_multiply_node(sq, precision, None)?;

        // 2. 三项相加后乘-½，再对各维求和
        let ln_2pi = graph.new_source_node_with_value(
            &Tensor::fill((2.0 * std::f32::consts::PI).ln(), &[1, d]),
            None,
        )?;
        let inner = graph.new_add_node(&[log_variance, quad, ln_2pi], None)?;
        let scaled = graph.new_scalar_multiply_node(-0.5, inner, None)?;
        graph.new_sum_node(scaled, None)
    }

    fn sample_tensor(
        &self,
        rng: &mut StdRng,
        parent_tensors: &[&Tensor],
    ) -> Result<Tensor, GraphError> {
        let mean = parent_tensors[0];
        let std_dev = parent_tensors[1].map(|lv| (0.5 * lv).exp());
        let z = Tensor::normal_with_rng(0.0, 1.0, mean.shape(), rng);
        Ok(mean + &(&z * &std_dev))
    }

    fn em_epoch_initialize(&mut self, width: usize) {
        self.sum_w = 0.0;
        self.sum_wx = Some(Tensor::zeros(&[1, width]));
        self.sum_wx2 = Some(Tensor::zeros(&[1, width]));
    }

    fn em_accumulate(&mut self, obs: &Tensor, posterior: f32) -> Result<(), GraphError> {
        let (Some(sum_wx), Some(sum_wx2)) = (self.sum_wx.as_mut(), self.sum_wx2.as_mut()) else {
            return Err(GraphError::InvalidOperation(
                "normal随机变量在EM统计累积前必须先初始化epoch".to_string(),
            ));
        };
        self.sum_w += posterior;
        *sum_wx = &*sum_wx + &(obs * posterior);
        *sum_wx2 = &*sum_wx2 + &(&obs.square() * posterior);
        Ok(())
    }

    fn em_update(&mut self) -> Result<Vec<(usize, Tensor)>, GraphError> {
        // 统计量退化（分母非正）时静默保持旧参数
        if self.sum_w <= 0.0 {
            return Ok(Vec::new());
        }
        let (Some(sum_wx), Some(sum_wx2)) = (self.sum_wx.as_ref(), self.sum_wx2.as_ref()) else {
            return Ok(Vec::new());
        };
        let inv_w = 1.0 / self.sum_w;
        let mean = sum_wx * inv_w;
        let variance = &(sum_wx2 * inv_w) - &mean.square();

        let mut updates = vec![(0, mean)];
        if variance.as_slice().iter().all(|&v| v > 0.0) {
            updates.push((1, variance.ln()));
        }
        Ok(updates)
    }
}
