/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 图层（计算图与随机变量图共用）的错误类型。
 *                 所有致命条件（形状错误、模型未支持的推断分支、EM配置错误等）
 *                 都以Err形式中止当前顶层操作，不做重试。
 */

use crate::graph::NodeId;

/// 图操作错误类型
#[derive(Debug, PartialEq)]
pub enum GraphError {
    NodeNotFound(NodeId),
    InvalidOperation(String),
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    DimensionMismatch {
        expected: usize,
        got: usize,
        message: String,
    },
    ComputationError(String),
    DuplicateNodeName(String),
    /// 算法性未完成：基类不该被调用的契约（如一般情形的marginalize）
    Unsupported(String),
}
