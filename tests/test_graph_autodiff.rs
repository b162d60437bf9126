/*
 * @Author       : 老董
 * @Description  : 计算图自动微分的端到端测试：
 *                 用Graph/Var句柄搭一个线性回归，靠forward/backward
 *                 算梯度并手工做梯度下降，验证参数收敛到真实值。
 */

use only_prob::graph::Graph;
use only_prob::tensor::Tensor;

#[test]
fn test_linear_regression_by_gradient_descent() {
    // ==================== 数据准备 ====================
    // 真实模型：y = 3x + 2（无噪声，小学习率下必然收敛）
    let xs = [-1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
    let ys: Vec<f32> = xs.iter().map(|x| 3.0 * x + 2.0).collect();

    // ==================== 构造计算图 ====================
    let g = Graph::new();
    let x = g.source(&Tensor::from_row(&xs), Some("x")).unwrap();
    let y = g.source(&Tensor::from_row(&ys), Some("y")).unwrap();
    let w = g.source(&Tensor::from_row(&[0.0; 6]), Some("w")).unwrap();
    let b = g.source(&Tensor::from_row(&[0.0; 6]), Some("b")).unwrap();

    // loss = Σ (w⊙x + b − y)²
    let pred = &(&w * &x) + &b;
    let loss = (&pred - &y).square().sum();

    // ==================== 训练 ====================
    let learning_rate = 0.02;
    let mut final_loss = f32::INFINITY;
    for _ in 0..500 {
        final_loss = loss.forward().unwrap().to_scalar().unwrap();
        loss.backward().unwrap();

        let new_w = &w.value() - &(&w.gradient() * learning_rate);
        let new_b = &b.value() - &(&b.gradient() * learning_rate);
        w.set_value(&new_w).unwrap();
        b.set_value(&new_b).unwrap();
    }

    // ==================== 验证 ====================
    assert!(final_loss < 1e-3, "最终损失{final_loss}未收敛");
    for (j, &xj) in xs.iter().enumerate() {
        let fitted = w.value().get(0, j) * xj + b.value().get(0, j);
        let target = 3.0 * xj + 2.0;
        assert!(
            (fitted - target).abs() < 0.05,
            "第{j}维拟合值{fitted}偏离目标{target}"
        );
    }
    // 所有推断调用返回后图中无残留标记
    assert!(!g.any_marks_set());
}

#[test]
fn test_composite_expression_gradients() {
    // z = sum(exp(x) / (x² + 1))
    let g = Graph::new();
    let x = g.source(&Tensor::from_row(&[0.5, 1.0]), Some("x")).unwrap();
    let one = g.constant(&Tensor::from_row(&[1.0, 1.0])).unwrap();

    let numerator = x.exp();
    let denominator = &x.square() + &one;
    let z = (&numerator / &denominator).sum();

    let value = z.forward().unwrap().to_scalar().unwrap();
    let f = |v: f32| v.exp() / (v * v + 1.0);
    let expected = f(0.5) + f(1.0);
    assert!((value - expected).abs() < 1e-4);

    // 与中心差分对比
    z.backward().unwrap();
    let h = 1e-3;
    for (j, &xj) in [0.5_f32, 1.0].iter().enumerate() {
        let fd = (f(xj + h) - f(xj - h)) / (2.0 * h);
        let analytic = x.gradient().get(0, j);
        assert!(
            (analytic - fd).abs() < 1e-2,
            "第{j}维解析梯度{analytic}与差分{fd}不符"
        );
    }
}
