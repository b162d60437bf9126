/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 多项随机变量。父变量：[0]=概率向量p（[1,d]，各元素非负且和为1）。
 *                 观测值约定为one-hot行向量：logP(x) = Σ_j x_j·ln p_j。
 *                 EM充分统计量是共现计数：p_j = Σw·x_j / Σw。
 */

use super::{GraphError, GraphInner, NodeId, RvCategory, TraitRv};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Clone, Default)]
pub(crate) struct MultinomialRv {
    counts: Option<Tensor>,
    total: f32,
}

impl MultinomialRv {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl TraitRv for MultinomialRv {
    fn rv_name(&self) -> &'static str {
        "multinomial"
    }

    fn category(&self) -> RvCategory {
        RvCategory::Stochastic
    }

    fn own_discrete(&self) -> Option<bool> {
        Some(true)
    }

    fn rebuild_value(
        &self,
        _graph: &mut GraphInner,
        _parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        Err(GraphError::InvalidOperation(
            "multinomial随机变量的值不能由父变量确定".to_string(),
        ))
    }

    fn build_log_p(
        &self,
        graph: &mut GraphInner,
        obs: NodeId,
        parent_values: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let probabilities = parent_values[0];
        let log_p = graph.new_log_node(probabilities, None)?;
        let picked = graph.new_multiply_node(obs, log_p, None)?;
        graph.new_sum_node(picked, None)
    }

    fn sample_tensor(
        &self,
        rng: &mut StdRng,
        parent_tensors: &[&Tensor],
    ) -> Result<Tensor, GraphError> {
        let probabilities = parent_tensors[0];
        let u: f32 = rng.gen_range(0.0..1.0);

        // 累积概率反演，末位兜底吸收浮点误差
        let mut one_hot = Tensor::zeros(probabilities.shape());
        let mut cumulative = 0.0;
        let last = probabilities.width() - 1;
        for j in 0..probabilities.width() {
            cumulative += probabilities.get(0, j);
            if u < cumulative || j == last {
                one_hot.set(0, j, 1.0);
                break;
            }
        }
        Ok(one_hot)
    }

    fn em_epoch_initialize(&mut self, width: usize) {
        self.counts = Some(Tensor::zeros(&[1, width]));
        self.total = 0.0;
    }

    fn em_accumulate(&mut self, obs: &Tensor, posterior: f32) -> Result<(), GraphError> {
        let Some(counts) = self.counts.as_mut() else {
            return Err(GraphError::InvalidOperation(
                "multinomial随机变量在EM统计累积前必须先初始化epoch".to_string(),
            ));
        };
        *counts = &*counts + &(obs * posterior);
        self.total += posterior;
        Ok(())
    }

    fn em_update(&mut self) -> Result<Vec<(usize, Tensor)>, GraphError> {
        if self.total <= 0.0 {
            return Ok(Vec::new());
        }
        let Some(counts) = self.counts.as_ref() else {
            return Ok(Vec::new());
        };
        Ok(vec![(0, counts * (1.0 / self.total))])
    }
}
