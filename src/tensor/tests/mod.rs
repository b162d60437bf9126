/*
 * @Author       : 老董
 * @Description  : 张量单元测试
 *
 * 测试策略：
 * 1. 构造与形状校验（合法/非法形状、数据长度）
 * 2. 访问器与标量/行向量约定
 * 3. 二元运算（逐元素、与标量、形状不匹配时panic）
 * 4. 一元运算与归约（exp/ln/square/sum/all_equal）
 * 5. 随机构造的可重复性（固定种子）
 */

use crate::assert_panic;
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ==================== 构造与形状校验 ====================

#[test]
fn test_new_and_shape() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(t.shape(), &[2, 3]);
    assert_eq!(t.length(), 2);
    assert_eq!(t.width(), 3);
    assert_eq!(t.size(), 6);
    assert_eq!(t.get(0, 0), 1.0);
    assert_eq!(t.get(1, 2), 6.0);
}

#[test]
fn test_new_invalid() {
    // 1. 数据长度与形状不匹配
    assert_panic!(
        Tensor::new(&[1.0, 2.0, 3.0], &[2, 2]),
        "创建张量时数据长度3与形状[2, 2]不匹配"
    );
    // 2. 非二维形状
    assert_panic!(
        Tensor::new(&[1.0], &[1]),
        "张量形状必须是[length, width]二维形式，实际为[1]"
    );
    // 3. 含0维
    assert_panic!(Tensor::zeros(&[0, 3]));
}

#[test]
fn test_scalar_and_row() {
    let s = Tensor::scalar(2.5);
    assert_eq!(s.shape(), &[1, 1]);
    assert!(s.is_scalar());
    assert_eq!(s.to_scalar(), Some(2.5));

    let r = Tensor::from_row(&[1.0, 2.0, 3.0]);
    assert_eq!(r.shape(), &[1, 3]);
    assert!(!r.is_scalar());
    assert_eq!(r.to_scalar(), None);
}

#[test]
fn test_fill_zeros_ones() {
    assert_eq!(Tensor::zeros(&[2, 2]).as_slice(), &[0.0; 4]);
    assert_eq!(Tensor::ones(&[1, 3]).as_slice(), &[1.0; 3]);
    assert_eq!(Tensor::fill(7.0, &[1, 2]).as_slice(), &[7.0, 7.0]);
}

// ==================== 二元运算 ====================

#[test]
fn test_elementwise_binary_ops() {
    let a = Tensor::from_row(&[1.0, 2.0, 3.0]);
    let b = Tensor::from_row(&[4.0, 5.0, 6.0]);

    assert_eq!((&a + &b).as_slice(), &[5.0, 7.0, 9.0]);
    assert_eq!((&b - &a).as_slice(), &[3.0, 3.0, 3.0]);
    assert_eq!((&a * &b).as_slice(), &[4.0, 10.0, 18.0]);
    assert_eq!((&b / &a).as_slice(), &[4.0, 2.5, 2.0]);
}

#[test]
fn test_scalar_binary_ops() {
    let a = Tensor::from_row(&[1.0, 2.0]);
    assert_eq!((&a + 1.0).as_slice(), &[2.0, 3.0]);
    assert_eq!((&a * 3.0).as_slice(), &[3.0, 6.0]);
    assert_eq!((2.0 * &a).as_slice(), &[2.0, 4.0]);
}

#[test]
fn test_binary_op_shape_mismatch() {
    let a = Tensor::from_row(&[1.0, 2.0]);
    let b = Tensor::from_row(&[1.0, 2.0, 3.0]);
    assert_panic!(
        &a + &b,
        "形状不一致，故无法相加：第一个张量的形状为[1, 2]，第二个张量的形状为[1, 3]"
    );
    assert_panic!(&a * &b);
}

// ==================== 一元运算与归约 ====================

#[test]
fn test_unary_ops() {
    let t = Tensor::from_row(&[1.0, 2.0, 3.0]);

    let e = t.exp();
    assert_abs_diff_eq!(e.get(0, 0), 1.0_f32.exp(), epsilon = 1e-6);
    assert_abs_diff_eq!(e.get(0, 2), 3.0_f32.exp(), epsilon = 1e-4);

    assert_abs_diff_eq!(e.ln().get(0, 1), 2.0, epsilon = 1e-6);
    assert_eq!(t.square().as_slice(), &[1.0, 4.0, 9.0]);
    assert_eq!((-&t).abs().as_slice(), &[1.0, 2.0, 3.0]);
    assert_eq!(t.sum(), 6.0);
    assert_eq!(t.mean(), 2.0);
}

#[test]
fn test_all_equal() {
    let a = Tensor::from_row(&[1.0, 2.0]);
    let b = Tensor::from_row(&[1.0, 2.0]);
    let c = Tensor::from_row(&[1.0, 3.0]);
    let d = Tensor::new(&[1.0, 2.0], &[2, 1]);

    assert!(a.all_equal(&b));
    assert!(!a.all_equal(&c));
    // 形状不同即不相等，哪怕数据相同
    assert!(!a.all_equal(&d));
}

// ==================== 随机构造 ====================

#[test]
fn test_uniform_range() {
    let t = Tensor::uniform(-1.0, 1.0, &[10, 10]);
    assert!(t.as_slice().iter().all(|&v| (-1.0..1.0).contains(&v)));
}

#[test]
fn test_seeded_random_reproducible() {
    let mut rng1 = StdRng::seed_from_u64(42);
    let mut rng2 = StdRng::seed_from_u64(42);

    let a = Tensor::normal_with_rng(0.0, 1.0, &[3, 3], &mut rng1);
    let b = Tensor::normal_with_rng(0.0, 1.0, &[3, 3], &mut rng2);
    assert_eq!(a, b);

    let c = Tensor::uniform_with_rng(0.0, 1.0, &[3, 3], &mut rng1);
    let d = Tensor::uniform_with_rng(0.0, 1.0, &[3, 3], &mut rng2);
    assert_eq!(c, d);
}

#[test]
fn test_normal_statistics() {
    let mut rng = StdRng::seed_from_u64(7);
    let t = Tensor::normal_with_rng(3.0, 0.5, &[100, 100], &mut rng);
    // 大样本下均值应接近3.0
    assert_abs_diff_eq!(t.mean(), 3.0, epsilon = 0.05);
}
