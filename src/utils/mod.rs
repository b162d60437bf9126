//! # 常用接口模块
//!
//! 本模块提供一些常用的操作接口


pub trait FloatTrait {
    fn is_integer(&self) -> bool;
}

impl FloatTrait for f32 {
    fn is_integer(&self) -> bool {
        (self - self.round()).abs() < f32::EPSILON
    }
}
