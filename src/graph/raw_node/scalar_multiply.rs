/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : ScalarMultiply节点：乘以编译期给定的常数k（如logP中的-0.5系数，
 *                 以及完全观测连续情形的巨常数占位“密度”）。
 */

use super::{check_parent_count, GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct ScalarMultiply {
    k: f32,
}

impl ScalarMultiply {
    pub(crate) fn new(k: f32) -> Self {
        Self { k }
    }
}

impl TraitOp for ScalarMultiply {
    fn op_name(&self) -> &'static str {
        "scalar_multiply"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        check_parent_count("ScalarMultiply", parent_shapes, 1)?;
        Ok(parent_shapes[0].to_vec())
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parent_values[0] * self.k)
    }

    fn grad_to_parent(
        &self,
        _parent_ix: usize,
        _parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream * self.k)
    }
}
