use nalgebra::DVector;

use netflux_core::logic_model::model::Model;
use netflux_core::logic_model::reaction::Reaction;
use netflux_core::logic_model::species::Species;

/// Fixed-step fourth order Runge-Kutta, returning the state after `steps` steps of size `dt`
pub fn rk4<F>(f: F, y0: &DVector<f64>, t0: f64, dt: f64, steps: usize) -> DVector<f64>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    let mut y = y0.clone();
    for i in 0..steps {
        let t = t0 + i as f64 * dt;
        let k1 = f(t, &y);
        let k2 = f(t + dt / 2., &(&y + &k1 * (dt / 2.)));
        let k3 = f(t + dt / 2., &(&y + &k2 * (dt / 2.)));
        let k4 = f(t + dt, &(&y + &k3 * dt));
        y += (k1 + k2 * 2. + k3 * 2. + k4) * (dt / 6.);
    }
    y
}

/// Same as [`rk4`], also returning the state after every step
pub fn rk4_trajectory<F>(
    f: F,
    y0: &DVector<f64>,
    t0: f64,
    dt: f64,
    steps: usize,
) -> Vec<DVector<f64>>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    let mut trajectory = Vec::with_capacity(steps);
    let mut y = y0.clone();
    for i in 0..steps {
        y = rk4(&f, &y, t0 + i as f64 * dt, dt, 1);
        trajectory.push(y.clone());
    }
    trajectory
}

pub fn species(ids: &[&str]) -> Vec<Species> {
    ids.iter()
        .map(|id| Species::new(id, None, 0., 1., 1.).unwrap())
        .collect()
}

/// The three species network: an input drives A, A activates B, and A without B drives C
pub fn example_model() -> Model {
    let reactions = vec![
        Reaction::new("r1", "=> A", 1., 1., 0.5).unwrap(),
        Reaction::new("r2", "A => B", 1., 1.4, 0.5).unwrap(),
        Reaction::new("r3", "A & !B => C", 1., 1.4, 0.5).unwrap(),
    ];
    Model::new(
        Some("exampleNet".to_string()),
        species(&["A", "B", "C"]),
        reactions,
    )
    .unwrap()
}
