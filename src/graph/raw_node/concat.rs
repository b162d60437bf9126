/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Concat节点：把若干行向量[1,w_i]按列拼接为[1,Σw_i]
 *                 （变长父节点列表算子；联合随机变量的值由它构成）。
 */

use super::{GraphError, TraitOp};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Concat;

impl TraitOp for Concat {
    fn op_name(&self) -> &'static str {
        "concat"
    }

    fn infer_shape(&self, parent_shapes: &[&[usize]]) -> Result<Vec<usize>, GraphError> {
        if parent_shapes.is_empty() {
            return Err(GraphError::InvalidOperation(
                "Concat节点至少需要1个父节点".to_string(),
            ));
        }
        let mut total = 0;
        for shape in parent_shapes {
            if shape[0] != 1 {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![1, shape[1]],
                    got: shape.to_vec(),
                    message: "Concat节点的父节点必须是行向量[1,w]".to_string(),
                });
            }
            total += shape[1];
        }
        Ok(vec![1, total])
    }

    fn compute_value(&self, parent_values: &[&Tensor]) -> Result<Tensor, GraphError> {
        let mut data = Vec::new();
        for v in parent_values {
            data.extend_from_slice(v.as_slice());
        }
        Ok(Tensor::from_row(&data))
    }

    fn grad_to_parent(
        &self,
        parent_ix: usize,
        parent_values: &[&Tensor],
        _value: &Tensor,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // 父节点的梯度是上游梯度中对应的切片
        let offset: usize = parent_values[..parent_ix].iter().map(|v| v.width()).sum();
        let w = parent_values[parent_ix].width();
        Ok(Tensor::from_row(&upstream.as_slice()[offset..offset + w]))
    }
}
