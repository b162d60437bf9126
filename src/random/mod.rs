/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 有向图模型的随机变量层。
 *                 在符号计算图之上再建一层概率依赖DAG：每个随机变量绑定一个值节点，
 *                 推断调用（log_p/p/sample/em）通过标记状态机解析非随机祖先、
 *                 动态重写计算图子图，再交给传播路径引擎执行。
 */

mod em;
mod inner;
mod instance;
mod net;
mod raw_rv;
mod rv;


pub use em::EmOptions;
pub use instance::{ConditionalExpression, RVInstance, RVInstanceArray};
pub use net::{RandomVar, RvNet};
pub use rv::RvId;
