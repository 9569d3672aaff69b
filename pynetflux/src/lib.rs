use netflux_core::logic_model::model::Model;
use netflux_core::ode::system::{OdeParameters, OdeSystem};

use nalgebra::DVector;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Parameters in the order returned by `LogicModel.load_params`:
/// species ids, y0, ymax, tau, w, n, EC50
type ParamTuple = (
    Vec<String>,
    Vec<f64>,
    Vec<f64>,
    Vec<f64>,
    Vec<f64>,
    Vec<f64>,
    Vec<f64>,
);

fn value_error<E: std::fmt::Display>(err: E) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A logic-based network together with its generated ODE system
#[pyclass]
struct LogicModel {
    model: Model,
    system: OdeSystem,
}

impl LogicModel {
    fn wrap(model: Model) -> Self {
        let system = model.ode_system();
        LogicModel { model, system }
    }
}

#[pymethods]
impl LogicModel {
    #[staticmethod]
    fn from_json(path: String) -> PyResult<Self> {
        Model::read_json(path)
            .map(LogicModel::wrap)
            .map_err(value_error)
    }

    #[staticmethod]
    #[pyo3(signature = (id, species, reactions))]
    fn from_csv(id: Option<String>, species: String, reactions: String) -> PyResult<Self> {
        Model::read_csv(id, species, reactions)
            .map(LogicModel::wrap)
            .map_err(value_error)
    }

    fn species_ids(&self) -> Vec<String> {
        self.model.species_ids()
    }

    fn load_params(&self) -> ParamTuple {
        let params = self.model.load_params();
        (
            params.species_ids,
            params.y0.as_slice().to_vec(),
            params.ode.ymax.as_slice().to_vec(),
            params.ode.tau.as_slice().to_vec(),
            params.ode.w.as_slice().to_vec(),
            params.ode.n.as_slice().to_vec(),
            params.ode.ec50.as_slice().to_vec(),
        )
    }

    /// Evaluate dy/dt at time `t` and state `y`
    #[allow(clippy::too_many_arguments)]
    fn rhs(
        &self,
        t: f64,
        y: Vec<f64>,
        ymax: Vec<f64>,
        tau: Vec<f64>,
        w: Vec<f64>,
        n: Vec<f64>,
        ec50: Vec<f64>,
    ) -> PyResult<Vec<f64>> {
        let params = OdeParameters {
            ymax: DVector::from_vec(ymax),
            tau: DVector::from_vec(tau),
            w: DVector::from_vec(w),
            n: DVector::from_vec(n),
            ec50: DVector::from_vec(ec50),
        };
        let mut dydt = vec![0.; y.len()];
        self.system
            .rhs_into(t, &y, &params, &mut dydt)
            .map_err(value_error)?;
        Ok(dydt)
    }

    fn ode_source(&self) -> String {
        self.system.to_source()
    }

    fn to_xgmml(&self) -> PyResult<String> {
        self.model.network().to_xgmml().map_err(value_error)
    }
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<LogicModel>()?;
    Ok(())
}
