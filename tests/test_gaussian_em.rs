/*
 * @Author       : 老董
 * @Description  : 随机变量层的端到端测试：
 *                 先用带种子的网络从真实高斯分布采样造数据，
 *                 再在另一个网络里用广义EM把均值/方差参数学回来，
 *                 最后用学到的参数检查logP的数值。
 */

use only_prob::data::MemoryVMat;
use only_prob::random::{ConditionalExpression, EmOptions, RVInstanceArray, RvNet};
use only_prob::tensor::Tensor;

#[test]
fn test_learn_gaussian_from_sampled_data() {
    // ==================== 数据准备 ====================
    // 真实分布：N(2.0, 0.25)，对数方差ln(0.25)
    let true_mean = 2.0_f32;
    let true_variance = 0.25_f32;
    let n = 500;

    let sampler = RvNet::new_with_seed(2026);
    let mu = sampler.non_random(&Tensor::scalar(true_mean), None).unwrap();
    let lv = sampler
        .non_random(&Tensor::scalar(true_variance.ln()), None)
        .unwrap();
    let source = sampler.normal(&mu, &lv, None).unwrap();

    let mut rows = Vec::with_capacity(n);
    for _ in 0..n {
        rows.push(
            sampler
                .sample(&source, &RVInstanceArray::new())
                .unwrap()
                .to_scalar()
                .unwrap(),
        );
    }
    let data = MemoryVMat::from_rows(&rows, n, 1);

    // ==================== EM训练 ====================
    // 学习网络从糟糕的初值出发
    let net = RvNet::new();
    let mean = net.non_random(&Tensor::scalar(0.0), Some("mu")).unwrap();
    let log_variance = net.non_random(&Tensor::scalar(0.0), Some("lv")).unwrap();
    let x = net.normal(&mean, &log_variance, None).unwrap();

    let ce = ConditionalExpression::unconditional(x.instance(&Tensor::scalar(0.0)).unwrap());
    let nll = net
        .em(
            &ce,
            &[mean.clone(), log_variance.clone()],
            &data,
            n,
            &EmOptions::default(),
        )
        .unwrap();

    // ==================== 验证 ====================
    let learned_mean = mean.value().to_scalar().unwrap();
    let learned_variance = log_variance.value().to_scalar().unwrap().exp();
    assert!(
        (learned_mean - true_mean).abs() < 0.1,
        "学到的均值{learned_mean}偏离真实值{true_mean}"
    );
    assert!(
        (learned_variance - true_variance).abs() < 0.1,
        "学到的方差{learned_variance}偏离真实值{true_variance}"
    );
    assert!(nll.is_finite());
    assert!(!net.any_marks_set());

    // 学到的参数下，均值处的logP应高于远离均值处
    let at_mean = net
        .log_p(&ConditionalExpression::unconditional(
            x.instance(&Tensor::scalar(learned_mean)).unwrap(),
        ))
        .unwrap()
        .forward()
        .unwrap()
        .to_scalar()
        .unwrap();
    let far_away = net
        .log_p(&ConditionalExpression::unconditional(
            x.instance(&Tensor::scalar(learned_mean + 5.0)).unwrap(),
        ))
        .unwrap()
        .forward()
        .unwrap()
        .to_scalar()
        .unwrap();
    assert!(at_mean > far_away);
}

#[test]
fn test_learn_shifted_gaussian() {
    // 观测的是Y = X + 10：EM统计沿可逆链回传给X的参数
    let net = RvNet::new();
    let mean = net.non_random(&Tensor::scalar(0.0), None).unwrap();
    let lv = net.non_random(&Tensor::scalar(0.0), None).unwrap();
    let x = net.normal(&mean, &lv, None).unwrap();
    let shift = net.non_random(&Tensor::scalar(10.0), None).unwrap();
    let y = &x + &shift;

    // Y的样本围绕11.0 → X的均值应学到约1.0
    let rows = [10.2, 10.8, 11.0, 11.2, 11.8];
    let data = MemoryVMat::from_rows(&rows, rows.len(), 1);
    let ce = ConditionalExpression::unconditional(y.instance(&Tensor::scalar(0.0)).unwrap());
    net.em(
        &ce,
        &[mean.clone(), lv.clone()],
        &data,
        rows.len(),
        &EmOptions::default(),
    )
    .unwrap();

    let learned_mean = mean.value().to_scalar().unwrap();
    assert!(
        (learned_mean - 1.0).abs() < 1e-3,
        "学到的均值{learned_mean}应接近1.0"
    );
    assert!(!net.any_marks_set());
}

#[test]
fn test_learn_multinomial_frequencies() {
    let net = RvNet::new();
    let p = net
        .non_random(&Tensor::from_row(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]), None)
        .unwrap();
    let m = net.multinomial(&p, None).unwrap();

    // 6条one-hot观测：3/2/1
    #[rustfmt::skip]
    let rows = [
        1.0, 0.0, 0.0,
        1.0, 0.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
    ];
    let data = MemoryVMat::from_rows(&rows, 6, 3);
    let ce = ConditionalExpression::unconditional(
        m.instance(&Tensor::from_row(&[0.0, 0.0, 0.0])).unwrap(),
    );
    net.em(&ce, &[p.clone()], &data, 6, &EmOptions::default())
        .unwrap();

    let learned = p.value();
    assert!((learned.get(0, 0) - 0.5).abs() < 1e-5);
    assert!((learned.get(0, 1) - 1.0 / 3.0).abs() < 1e-5);
    assert!((learned.get(0, 2) - 1.0 / 6.0).abs() < 1e-5);
}
