use nalgebra::{Complex, DVector};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Mean over all `j` of `(z_i - z_j) / max(|z_i - z_j|^2, epsilon)`.
///
/// The `j == i` term is zero, so averaging over `n` rather than `n - 1` keeps the magnitude
/// independent of graph size.
pub(crate) fn repulsion(z: &DVector<Complex<f64>>, epsilon: f64) -> DVector<Complex<f64>> {
    let n = z.len();
    let scale = 1.0 / n.max(1) as f64;
    DVector::from_fn(n, |i, _| {
        let zi = z[i];
        let sum = z.iter().fold(Complex::new(0.0, 0.0), |acc, &zj| {
            let d = zi - zj;
            acc + d / d.norm_sqr().max(epsilon)
        });
        sum * scale
    })
}

/// Smoothly compresses each magnitude `r` to `speed * tanh(r)`, keeping directions.
pub(crate) fn limit(forces: &mut DVector<Complex<f64>>, speed: f64, epsilon: f64) {
    for f in forces.iter_mut() {
        let r = f.norm().max(epsilon);
        *f *= speed * r.tanh() / r;
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub(crate) fn speed_schedule(count: usize, start: f64, end: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut out: Vec<f64> = (0..count).map(|k| start + step * k as f64).collect();
            out[count - 1] = end;
            out
        }
    }
}

/// One standard normal draw.
pub(crate) fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}
