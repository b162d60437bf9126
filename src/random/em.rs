/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 广义EM训练循环（每次调用四个阶段）：
 *                 1. em_training_initialize：设定各父变量槽位的学习标志并校验；
 *                 2. 每轮：em_epoch_initialize清零累积器，再逐行fprop logP路径、
 *                    累加负对数似然、em_bprop回传充分统计量；
 *                 3. em_update：闭式参数更新写回被学习父变量的源节点
 *                    （em_mark保证两次em_update之间必须隔一次epoch初始化）；
 *                 4. 收敛判定：轮数上限/相对改善阈值/似然变差，
 *                    均受各变量can_stop_em的一票否决约束。
 */

use super::inner::RvNetInner;
use super::raw_rv::{RvCategory, TraitRv};
use super::rv::RvId;
use crate::data::VMat;
use crate::graph::{propagation_path_from_sources, GraphError, NodeArray, NodeId};
use crate::tensor::Tensor;
use std::collections::HashSet;

/// EM训练选项
#[derive(Debug, Clone)]
pub struct EmOptions {
    /// 最大轮数
    pub max_n_iterations: usize,
    /// 相对负对数似然改善低于该阈值即认为收敛
    pub relative_improvement_threshold: f32,
    /// 似然变差时是否继续训练（默认提前停止）
    pub accept_worsening_likelihood: bool,
}

impl Default for EmOptions {
    fn default() -> Self {
        Self {
            max_n_iterations: 100,
            relative_improvement_threshold: 1e-4,
            accept_worsening_likelihood: false,
        }
    }
}

impl RvNetInner {
    /// EM入口。返回最后一轮的总负对数似然。
    pub(crate) fn em(
        &mut self,
        lhs: RvId,
        obs_node: NodeId,
        rhs: &[(RvId, NodeId)],
        parameters_to_learn: &[RvId],
        data: &dyn VMat,
        n_samples: usize,
        options: &EmOptions,
    ) -> Result<f32, GraphError> {
        // 1. 校验数据行与观测变量的宽度一致
        let obs_width = {
            let g = self.graph_rc();
            let shape = g.borrow().get_node_value_shape(obs_node)?;
            shape[0] * shape[1]
        };
        if data.width() != obs_width {
            return Err(GraphError::DimensionMismatch {
                expected: obs_width,
                got: data.width(),
                message: "训练数据的行宽与观测变量的宽度不一致".to_string(),
            });
        }
        if n_samples > data.length() {
            return Err(GraphError::InvalidOperation(format!(
                "要求训练{}条样本，但数据集只有{}行",
                n_samples,
                data.length()
            )));
        }

        // 2. 条件化并运行训练；无论成败都恢复洁净状态
        self.mark_rhs_and_set_known_values(lhs, rhs)?;
        let result = self.run_em(lhs, obs_node, parameters_to_learn, data, n_samples, options);
        self.em_training_finalize(lhs)?;
        self.restore_marks(lhs, rhs)?;
        result
    }

    fn run_em(
        &mut self,
        lhs: RvId,
        obs_node: NodeId,
        parameters_to_learn: &[RvId],
        data: &dyn VMat,
        n_samples: usize,
        options: &EmOptions,
    ) -> Result<f32, GraphError> {
        let logp_node = self.build_log_p(lhs, obs_node)?;

        let param_set: HashSet<RvId> = parameters_to_learn.iter().copied().collect();
        let mut visited = HashSet::new();
        self.em_training_initialize(lhs, &param_set, &mut visited)?;

        // logP路径只算一次：每轮只有源节点（观测与参数）的值在变
        let graph = self.graph_rc();
        let path = {
            let mut g = graph.borrow_mut();
            propagation_path_from_sources(&mut g, &NodeArray::from_ids(vec![logp_node]))?
        };

        let mut row = vec![0.0; data.width()];
        let mut previous_nll = f32::INFINITY;
        let mut final_nll = f32::INFINITY;

        for epoch in 0..options.max_n_iterations {
            let mut visited = HashSet::new();
            self.em_epoch_initialize(lhs, &mut visited)?;

            let mut nll = 0.0;
            for i in 0..n_samples {
                data.get_row(i, &mut row)?;
                let obs = Tensor::new(&row, &[1, row.len()]);
                {
                    let mut g = graph.borrow_mut();
                    g.set_node_value(obs_node, &obs)?;
                    path.fprop(&mut g)?;
                }
                let log_p = graph
                    .borrow()
                    .get_node_value(logp_node)?
                    .to_scalar()
                    .ok_or_else(|| {
                        GraphError::ComputationError("logP节点的值必须是标量".to_string())
                    })?;
                nll -= log_p;
                self.em_bprop(lhs, &obs, 1.0)?;
            }
            self.em_update(lhs)?;
            final_nll = nll;

            // 收敛判定
            let can_stop = self.can_stop_em(lhs, &mut HashSet::new())?;
            if nll > previous_nll {
                if !options.accept_worsening_likelihood && can_stop {
                    eprintln!(
                        "[only_prob 警告] EM第{}轮的负对数似然由{previous_nll}升至{nll}，提前停止",
                        epoch + 1
                    );
                    break;
                }
            } else {
                let improvement =
                    (previous_nll - nll) / previous_nll.abs().max(f32::MIN_POSITIVE);
                if improvement < options.relative_improvement_threshold && can_stop {
                    break;
                }
            }
            previous_nll = nll;
        }
        Ok(final_nll)
    }

    /// 阶段1：设定学习标志并校验。
    /// - 被学习的参数必须本身非随机（致命错误）；
    /// - 随机源不能在兄弟父变量仍是随机时学习参数（致命错误）。
    fn em_training_initialize(
        &mut self,
        id: RvId,
        parameters_to_learn: &HashSet<RvId>,
        visited: &mut HashSet<RvId>,
    ) -> Result<(), GraphError> {
        if !visited.insert(id) {
            return Ok(());
        }
        let parents = self.get_rv(id)?.parents.clone();
        let learn: Vec<bool> = parents
            .iter()
            .map(|p| parameters_to_learn.contains(p))
            .collect();

        for (ix, &p) in parents.iter().enumerate() {
            let parent_random = !self.get_rv(p)?.marked && !self.is_non_random(p)?;
            if learn[ix] && parent_random {
                return Err(GraphError::InvalidOperation(format!(
                    "无法学习参数{}：它本身是随机的",
                    self.get_rv(p)?.name()
                )));
            }
            if !learn[ix] && learn.iter().any(|&b| b) && parent_random {
                return Err(GraphError::InvalidOperation(format!(
                    "无法学习{}的参数：其父变量{}仍是随机的",
                    self.get_rv(id)?.name(),
                    self.get_rv(p)?.name()
                )));
            }
        }

        self.get_rv_mut(id)?.learn_the_parameters = learn.clone();
        for (ix, &p) in parents.iter().enumerate() {
            if !learn[ix] {
                self.em_training_initialize(p, parameters_to_learn, visited)?;
            }
        }
        Ok(())
    }

    /// 阶段2前置：清零各种类的本轮累积器，并清掉上一轮em_update留下的em_mark
    /// （使接下来的em_update能再次生效）。
    fn em_epoch_initialize(
        &mut self,
        id: RvId,
        visited: &mut HashSet<RvId>,
    ) -> Result<(), GraphError> {
        if !visited.insert(id) {
            return Ok(());
        }
        let width = {
            let node = self.get_rv(id)?.value;
            self.graph_rc().borrow().get_node_value_shape(node)?[1]
        };
        {
            let rv = self.get_rv_mut(id)?;
            rv.em_mark = false;
            rv.kind.em_epoch_initialize(width);
        }
        let parents = self.get_rv(id)?.parents.clone();
        for &p in &parents {
            self.em_epoch_initialize(p, visited)?;
        }
        Ok(())
    }

    /// 阶段2：一条观测的充分统计量回传。
    /// 随机源累加自己的累积器；函数型把观测沿数值逆变换传回仍是随机的父变量。
    fn em_bprop(&mut self, id: RvId, obs: &Tensor, posterior: f32) -> Result<(), GraphError> {
        let kind = self.get_rv(id)?.kind.clone();
        let parents = self.get_rv(id)?.parents.clone();

        match kind.category() {
            RvCategory::NonRandom => Ok(()),
            RvCategory::Stochastic => {
                let learning = self.get_rv(id)?.learn_the_parameters.iter().any(|&b| b);
                if learning {
                    self.get_rv_mut(id)?.kind.em_accumulate(obs, posterior)?;
                }
                Ok(())
            }
            RvCategory::Functional => {
                let mut parent_tensors = Vec::with_capacity(parents.len());
                for &p in &parents {
                    parent_tensors.push(self.rv_value_tensor(p)?);
                }
                let refs: Vec<&Tensor> = parent_tensors.iter().collect();
                for (ix, &p) in parents.iter().enumerate() {
                    if self.get_rv(p)?.marked {
                        continue;
                    }
                    match kind.invert_tensor(obs, ix, &refs)? {
                        Some(transformed) => self.em_bprop(p, &transformed, posterior)?,
                        None => {
                            return Err(GraphError::Unsupported(format!(
                                "无法对不可逆的函数型随机变量{}做EM统计回传",
                                self.get_rv(id)?.name()
                            )));
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// 阶段3：闭式参数更新写回被学习父变量的源节点。
    /// em_mark保证每轮每变量恰好更新一次；未经epoch初始化的再次调用是空操作。
    fn em_update(&mut self, id: RvId) -> Result<(), GraphError> {
        if self.get_rv(id)?.em_mark {
            return Ok(());
        }
        self.get_rv_mut(id)?.em_mark = true;

        let parents = self.get_rv(id)?.parents.clone();
        let learn = self.get_rv(id)?.learn_the_parameters.clone();
        let updates = self.get_rv_mut(id)?.kind.em_update()?;
        for (ix, new_value) in updates {
            if learn.get(ix).copied().unwrap_or(false) {
                let parent_node = self.get_rv(parents[ix])?.value;
                self.graph_rc()
                    .borrow_mut()
                    .set_node_value(parent_node, &new_value)?;
            }
        }
        for &p in &parents {
            self.em_update(p)?;
        }
        Ok(())
    }

    /// 收敛一票否决的聚合：对全部祖先的can_stop_em取与
    fn can_stop_em(&self, id: RvId, visited: &mut HashSet<RvId>) -> Result<bool, GraphError> {
        if !visited.insert(id) {
            return Ok(true);
        }
        let rv = self.get_rv(id)?;
        if !rv.kind.can_stop_em() {
            return Ok(false);
        }
        for &p in &rv.parents.clone() {
            if !self.can_stop_em(p, visited)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 阶段4收尾：清除学习标志与em_mark，恢复洁净状态
    fn em_training_finalize(&mut self, id: RvId) -> Result<(), GraphError> {
        let mut visited = HashSet::new();
        self.clear_em_state(id, &mut visited)
    }

    fn clear_em_state(
        &mut self,
        id: RvId,
        visited: &mut HashSet<RvId>,
    ) -> Result<(), GraphError> {
        if !visited.insert(id) {
            return Ok(());
        }
        {
            let rv = self.get_rv_mut(id)?;
            rv.em_mark = false;
            rv.learn_the_parameters.clear();
        }
        let parents = self.get_rv(id)?.parents.clone();
        for &p in &parents {
            self.clear_em_state(p, visited)?;
        }
        Ok(())
    }
}
