//! Continuous relaxations of boolean activation, inhibition, AND and OR
//!
//! Parameter combinations for which `2·EC50^n − 1` vanishes, or for which `beta − 1` is
//! negative, make [`activation`] return NaN (or a meaningless value). These are left in place
//! rather than clamped, see [`crate::ode::system::OdeSystem::numeric_hazards`].

/// Normalized Hill activation
///
/// Negative `x` is floored to 0, and the result is capped at `w`. The curve passes through
/// `w/2` at `x = EC50` and reaches `w` at `x = 1`.
pub fn activation(x: f64, w: f64, n: f64, ec50: f64) -> f64 {
    let x = if x < 0. { 0. } else { x };
    let (beta, k) = hill_constants(n, ec50);
    let f = w * beta * x.powf(n) / (k.powf(n) + x.powf(n));
    // Comparison rather than f64::min so a NaN is not replaced by w
    if f > w {
        w
    } else {
        f
    }
}

/// Normalized Hill inhibition, `w − activation(x)`
pub fn inhibition(x: f64, w: f64, n: f64, ec50: f64) -> f64 {
    w - activation(x, w, n, ec50)
}

/// Continuous OR, `a + b − a·b`
pub fn or(a: f64, b: f64) -> f64 {
    a + b - a * b
}

/// Continuous AND of the terms of one reaction with weight `w`
///
/// Returns `product(terms) / w^(k−2)`. For a unit weight, saturated terms give back 1.
pub fn and(w: f64, terms: &[f64]) -> f64 {
    and_of_product(w, terms.iter().product(), terms.len())
}

/// [`and`] given the product of its `k` terms
pub(crate) fn and_of_product(w: f64, product: f64, k: usize) -> f64 {
    if w == 0. {
        return 0.;
    }
    product / w.powi(k as i32 - 2)
}

/// `beta` and `K` of the normalized Hill function
pub(crate) fn hill_constants(n: f64, ec50: f64) -> (f64, f64) {
    let ec50_n = ec50.powf(n);
    let beta = (ec50_n - 1.) / (2. * ec50_n - 1.);
    let k = (beta - 1.).powf(1. / n);
    (beta, k)
}
