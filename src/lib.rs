//! # Only Prob
//!
//! `only_prob`项目旨在用纯rust实现一个[PLearn](https://github.com/plearn/plearn)风格的
//! 符号计算图引擎（节点持有值与梯度，支持`fprop`/`bprop`与传播路径提取），
//! 并在其上构建一层有向图模型的随机变量（RandomVariable）抽象，
//! 支持条件对数概率（logP）的符号构造、采样与广义EM训练。
//!

pub mod data;
pub mod errors;
pub mod graph;
pub mod random;
pub mod tensor;
pub mod utils;
