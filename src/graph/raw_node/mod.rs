/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 节点算子目录。每个算子实现形状推导（构造期校验）、
 *                 前向计算（fprop的公式）与对某个父节点的梯度贡献（bprop的公式）。
 *                 这里只保留随机变量层构造logP表达式所需的最小算子集；
 *                 具体的数值层（卷积类、代价函数目录等）不在本引擎范围内，
 *                 外部算子只需实现TraitOp契约即可接入。
 */

mod abs;
mod add;
mod concat;
mod divide;
mod exp;
mod is_equal;
mod log;
mod multiply;
mod negate;
mod scalar_multiply;
mod slice;
mod source;
mod square;
mod subtract;
mod sum;

pub(crate) use abs::Abs;
pub(crate) use add::Add;
pub(crate) use concat::Concat;
pub(crate) use divide::Divide;
pub(crate) use exp::Exp;
pub(crate) use is_equal::IsEqual;
pub(crate) use log::Log;
pub(crate) use multiply::Multiply;
pub(crate) use negate::Negate;
pub(crate) use scalar_multiply::ScalarMultiply;
pub(crate) use slice::Slice;
pub(crate) use source::Source;
pub(crate) use square::Square;
pub(crate) use subtract::Subtract;
pub(crate) use sum::Sum;

use super::error::GraphError;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
#[derive(Clone)]
pub(crate) enum NodeKind {
    Source(Source),
    Add(Add),
    Subtract(Subtract),
    Multiply(Multiply),
    Divide(Divide),
    Negate(Negate),
    Exp(Exp),
    Log(Log),
    Abs(Abs),
    Square(Square),
    Sum(Sum),
    ScalarMultiply(ScalarMultiply),
    Concat(Concat),
    Slice(Slice),
    IsEqual(IsEqual),
}

#[enum_dispatch(NodeKind)]
pub(crate) trait TraitOp {
    fn op_name(&self) -> &'static str;

    /// 由父节点形状推导本节点形状。构造期调用，父节点数量或形状非法时报错，
    /// 此时不会产生任何半成品节点。
    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError>;

    /// 前向：由父节点当前值计算本节点值。父节点值不变时必须幂等。
    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError>;

    /// 反向：给定本节点已累积的上游梯度，计算对第`parent_ix`个父节点的梯度贡献。
    /// 调用方负责把贡献累加（而非覆盖）进父节点的梯度。
    fn grad_to_parent(
        &self,
        parent_ix: usize,
        parent_values: &[&Tensor],
        value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError>;
}

/// 校验父节点个数的通用辅助
pub(in crate::graph) fn check_parent_count(
    op: &str,
    parent_shapes: &[&[usize]],
    expected: usize,
) -> Result<(), GraphError> {
    if parent_shapes.len() != expected {
        return Err(GraphError::InvalidOperation(format!(
            "{op}节点需要正好{expected}个父节点，实际为{}",
            parent_shapes.len()
        )));
    }
    Ok(())
}

/// 校验所有父节点形状一致的通用辅助
pub(in crate::graph) fn check_same_shapes(
    op: &str,
    parent_shapes: &[&[usize]],
) -> Result<(), GraphError> {
    let first = parent_shapes[0];
    for shape in &parent_shapes[1..] {
        if *shape != first {
            return Err(GraphError::ShapeMismatch {
                expected: first.to_vec(),
                got: shape.to_vec(),
                message: format!("{op}节点的父节点形状必须相同"),
            });
        }
    }
    Ok(())
}
