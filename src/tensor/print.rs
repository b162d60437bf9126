/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : 张量的显示：打印形状与（截断的）元素。
 */

use crate::tensor::Tensor;
use std::fmt;

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "形状: {:?}", self.shape())?;

        let max_rows = self.length().min(6);
        let max_cols = self.width().min(6);
        for i in 0..max_rows {
            for j in 0..max_cols {
                write!(f, "{:8.4} ", self.get(i, j))?;
            }
            if max_cols < self.width() {
                write!(f, "...")?;
            }
            writeln!(f)?;
        }
        if max_rows < self.length() {
            writeln!(f, "...")?;
        }
        Ok(())
    }
}
