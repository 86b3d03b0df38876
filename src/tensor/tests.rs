use super::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_new_and_property() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(t.shape(), &[2, 3]);
    assert_eq!(t.dimension(), 2);
    assert_eq!(t.size(), 6);
    assert_eq!(t[[1, 2]], 6.0);
    assert!(!t.is_scalar());

    let s = Tensor::new(&[7.0], &[1, 1]);
    assert!(s.is_scalar());
    assert_eq!(s.number(), Some(7.0));
}

#[test]
fn test_zeros_ones_and_is_zero() {
    let z = Tensor::zeros(&[2, 2]);
    assert!(z.is_zero());
    let o = Tensor::ones(&[2, 2]);
    assert!(!o.is_zero());
    assert_eq!(o.sum().number(), Some(4.0));
}

#[test]
fn test_elementwise_ops() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = Tensor::new(&[4.0, 3.0, 2.0, 1.0], &[2, 2]);
    assert_eq!(&a + &b, Tensor::new(&[5.0, 5.0, 5.0, 5.0], &[2, 2]));
    assert_eq!(&a - &b, Tensor::new(&[-3.0, -1.0, 1.0, 3.0], &[2, 2]));
    assert_eq!(&a * &b, Tensor::new(&[4.0, 6.0, 6.0, 4.0], &[2, 2]));
    assert_eq!(&a * 2.0, Tensor::new(&[2.0, 4.0, 6.0, 8.0], &[2, 2]));
    assert_eq!(2.0 * &a, Tensor::new(&[2.0, 4.0, 6.0, 8.0], &[2, 2]));
    assert_eq!(&b / 2.0, Tensor::new(&[2.0, 1.5, 1.0, 0.5], &[2, 2]));

    let mut c = a.clone();
    c += &b;
    assert_eq!(c, Tensor::new(&[5.0, 5.0, 5.0, 5.0], &[2, 2]));
    c *= 0.5;
    assert_eq!(c, Tensor::new(&[2.5, 2.5, 2.5, 2.5], &[2, 2]));
}

#[test]
fn test_mat_mul_and_transpose() {
    let x = Tensor::new(&[1.0, 2.0], &[1, 2]);
    let w = Tensor::new(&[1.0, 1.0], &[2, 1]);
    assert_eq!(x.mat_mul(&w), Tensor::new(&[3.0], &[1, 1]));
    assert_eq!(x.transpose(), Tensor::new(&[1.0, 2.0], &[2, 1]));

    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let at = a.transpose();
    assert_eq!(at.shape(), &[3, 2]);
    assert_eq!(at[[2, 1]], 6.0);
}

#[test]
#[should_panic(expected = "形状不一致，故无法相加：第一个张量的形状为[2, 3]，第二个张量的形状为[4]")]
fn test_add_incompatible_shapes() {
    let a = Tensor::ones(&[2, 3]);
    let b = Tensor::ones(&[4]);
    let _ = &a + &b;
}

#[test]
#[should_panic(expected = "形状不一致，故无法自相乘")]
fn test_mul_assign_shape_mismatch() {
    let mut a = Tensor::ones(&[2, 2]);
    a *= &Tensor::ones(&[2, 3]);
}

#[test]
fn test_elementwise_broadcasting() {
    // 行向量广播到矩阵的每一行
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let row = Tensor::new(&[10.0, 20.0], &[1, 2]);
    assert_eq!(&a + &row, Tensor::new(&[11.0, 22.0, 13.0, 24.0], &[2, 2]));
    assert_eq!(&a - &row, Tensor::new(&[-9.0, -18.0, -7.0, -16.0], &[2, 2]));
    assert_eq!(&a * &row, Tensor::new(&[10.0, 40.0, 30.0, 80.0], &[2, 2]));
}

#[test]
#[should_panic(expected = "前一个张量的列数必须等于后一个张量的行数")]
fn test_mat_mul_shape_mismatch() {
    let x = Tensor::new(&[1.0, 2.0], &[1, 2]);
    let w = Tensor::new(&[1.0, 2.0, 3.0], &[3, 1]);
    let _ = x.mat_mul(&w);
}

#[test]
fn test_math_helpers() {
    let t = Tensor::new(&[-3.0, 4.0], &[1, 2]);
    assert_eq!(t.abs(), Tensor::new(&[3.0, 4.0], &[1, 2]));
    assert_abs_diff_eq!(t.frobenius_norm(), 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(t.mean(), 0.5, epsilon = 1e-6);
    assert_eq!(t.clamp(-1.0, 1.0), Tensor::new(&[-1.0, 1.0], &[1, 2]));
    assert_eq!(
        Tensor::new(&[4.0, 9.0], &[1, 2]).sqrt(),
        Tensor::new(&[2.0, 3.0], &[1, 2])
    );
}

#[test]
fn test_finite_detection() {
    let ok = Tensor::new(&[1.0, 2.0], &[1, 2]);
    assert!(ok.is_all_finite());
    let bad = Tensor::new(&[1.0, f32::INFINITY], &[1, 2]);
    assert!(!bad.is_all_finite());
    let nan = Tensor::new(&[f32::NAN, 0.0], &[1, 2]);
    assert!(!nan.is_all_finite());
}

#[test]
fn test_random_seeded_reproducible() {
    let a = Tensor::random_seeded(-1.0, 1.0, &[3, 3], 42);
    let b = Tensor::random_seeded(-1.0, 1.0, &[3, 3], 42);
    assert_eq!(a, b);
    assert!(a.as_slice().iter().all(|x| (-1.0..=1.0).contains(x)));
}

#[test]
fn test_reshape_flatten() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    assert_eq!(t.reshape(&[4, 1]).shape(), &[4, 1]);
    assert_eq!(t.flatten(), Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[1, 4]));
}
