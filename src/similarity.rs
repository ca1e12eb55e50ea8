//! Vector math for centroid similarity. All story centroids and item
//! embeddings are kept unit-norm, so cosine similarity is a plain dot
//! product.

/// Dot product with f64 accumulation. On unit vectors this is the cosine.
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum()
}

/// Scale `v` to unit length in place. The epsilon guards the zero vector;
/// a zero input stays (numerically) zero rather than dividing by zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f64 = v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt() + 1e-12;
    for x in v.iter_mut() {
        *x = (*x as f64 / norm) as f32;
    }
}

/// Norm check used by invariant assertions in tests.
pub fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_yields_unit_norm() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((norm(&v) - 1.0).abs() < 1e-6);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn normalize_tolerates_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert!(v.iter().all(|x| x.is_finite()));
        assert!(norm(&v) < 1e-6);
    }

    #[test]
    fn dot_of_unit_vectors_is_cosine() {
        let a = vec![1.0, 0.0];
        let b = vec![0.6, 0.8];
        assert!((dot(&a, &b) - 0.6).abs() < 1e-9);
        assert!((dot(&b, &b) - 1.0).abs() < 1e-6);
    }
}
