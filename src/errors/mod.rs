use thiserror::Error;

/// 张量层的错误类型。
/// 注：张量的二元运算在形状不匹配时直接panic（panic消息即为本错误的Display），
/// 因为图层在节点构造时已做过形状校验，运行期不应再出现此类错误。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },

    #[error("创建张量时数据长度{data_len}与形状{shape:?}不匹配")]
    DataLenShapeMismatch { data_len: usize, shape: Vec<usize> },

    #[error("张量形状必须是[length, width]二维形式，实际为{shape:?}")]
    ShapeMustBe2D { shape: Vec<usize> },

    #[error("张量：未知错误")]
    UnKnown,
}

/// 二元运算符（用于错误消息）
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "相加"),
            Self::Sub => write!(f, "相减"),
            Self::Mul => write!(f, "相乘"),
            Self::Div => write!(f, "相除"),
        }
    }
}
