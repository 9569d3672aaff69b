//! Provides the OdeSystem struct, the normalized rate equations of a whole Model
use std::fmt::{Display, Formatter};

use log::{info, warn};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic_model::model::Model;
use crate::ode::expression::{synthesize, LogicExpr};
use crate::ode::logic::hill_constants;

/// Parameters passed to the right-hand side alongside the state
///
/// Species vectors are aligned with the species order of the model, reaction vectors with
/// its reaction order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OdeParameters {
    pub ymax: DVector<f64>,
    pub tau: DVector<f64>,
    pub w: DVector<f64>,
    pub n: DVector<f64>,
    pub ec50: DVector<f64>,
}

/// Everything needed to start a simulation of a Model, see [`Model::load_params`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub species_ids: Vec<String>,
    /// Initial state
    pub y0: DVector<f64>,
    pub ode: OdeParameters,
}

/// System of logic-based ODEs, `dy[s]/dt = (E_s(y)·ymax[s] − y[s]) / tau[s]`
///
/// The system holds no state between calls, so one instance may be evaluated from any number
/// of threads, and an integration can be continued simply by calling it again with the final
/// state of the previous run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OdeSystem {
    /// Id of the Model the system was generated from
    pub(crate) id: Option<String>,
    pub(crate) species_ids: Vec<String>,
    pub(crate) reaction_ids: Vec<String>,
    /// Drive `E_s` of each species, None for species no reaction produces
    pub(crate) equations: Vec<Option<LogicExpr>>,
}

impl OdeSystem {
    /// Generate the ODE system of a Model
    ///
    /// Hazardous parameters of the model itself (see [`OdeSystem::numeric_hazards`]) are
    /// logged as warnings, they do not prevent generation.
    pub fn generate(model: &Model) -> OdeSystem {
        let equations: Vec<Option<LogicExpr>> = (0..model.num_species())
            .map(|s| synthesize(model, s))
            .collect();
        let system = OdeSystem {
            id: model.id.clone(),
            species_ids: model.species_ids(),
            reaction_ids: model.reaction_ids(),
            equations,
        };
        info!(
            "generated ODE system with {} equations ({} driven)",
            system.num_species(),
            system.equations.iter().filter(|e| e.is_some()).count()
        );
        if let Ok(hazards) = system.numeric_hazards(&model.load_params().ode) {
            for hazard in hazards {
                warn!("{}", hazard);
            }
        }
        system
    }

    // region Accessors
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn species_ids(&self) -> &[String] {
        &self.species_ids
    }

    pub fn reaction_ids(&self) -> &[String] {
        &self.reaction_ids
    }

    pub fn num_species(&self) -> usize {
        self.species_ids.len()
    }

    pub fn num_reactions(&self) -> usize {
        self.reaction_ids.len()
    }

    /// Drive expression of species row `species`, None if nothing produces it
    pub fn equation(&self, species: usize) -> Option<&LogicExpr> {
        self.equations.get(species).and_then(|e| e.as_ref())
    }
    // endregion Accessors

    // region Evaluation
    /// Evaluate the drive `E_s(y)` of species row `species`, 0 if nothing produces it
    pub fn drive(
        &self,
        species: usize,
        y: &[f64],
        params: &OdeParameters,
    ) -> Result<f64, OdeError> {
        if species >= self.num_species() {
            return Err(OdeError::InvalidIndex {
                kind: "species".to_string(),
                index: species,
            });
        }
        self.check_dimensions(params)?;
        self.check_length("y", y.len(), self.num_species())?;
        Ok(self.eval_drive(species, y, params))
    }

    fn eval_drive(&self, species: usize, y: &[f64], params: &OdeParameters) -> f64 {
        match self.equation(species) {
            Some(expr) => expr.eval(y, params),
            None => 0.,
        }
    }

    /// Evaluate the right-hand side into `dydt`
    ///
    /// `t` is accepted for integrator compatibility, the system is autonomous.
    pub fn rhs_into(
        &self,
        _t: f64,
        y: &[f64],
        params: &OdeParameters,
        dydt: &mut [f64],
    ) -> Result<(), OdeError> {
        self.check_dimensions(params)?;
        self.check_length("y", y.len(), self.num_species())?;
        self.check_length("dydt", dydt.len(), self.num_species())?;
        self.eval_into(y, params, dydt);
        Ok(())
    }

    /// Evaluate the right-hand side, `F(t, y, ymax, tau, w, n, EC50)`
    ///
    /// # Examples
    /// ```rust
    /// use netflux_core::logic_model::model::Model;
    /// use netflux_core::logic_model::reaction::Reaction;
    /// use netflux_core::logic_model::species::SpeciesBuilder;
    /// let species = vec![SpeciesBuilder::default().id("A").build().unwrap()];
    /// let reactions = vec![Reaction::new("input", "=> A", 1., 1.4, 0.5).unwrap()];
    /// let model = Model::new(None, species, reactions).unwrap();
    /// let params = model.load_params();
    /// let dydt = model.ode_system().rhs(0., &params.y0, &params.ode).unwrap();
    /// assert_eq!(dydt[0], 1.);
    /// ```
    pub fn rhs(
        &self,
        t: f64,
        y: &DVector<f64>,
        params: &OdeParameters,
    ) -> Result<DVector<f64>, OdeError> {
        let mut dydt = DVector::zeros(self.num_species());
        self.rhs_into(t, y.as_slice(), params, dydt.as_mut_slice())?;
        Ok(dydt)
    }

    /// Bind a parameter set, returning the right-hand side as a closure for an integrator
    ///
    /// The parameter dimensions and the length of the initial state `y0` are checked once
    /// here. The closure must then be called with states of that same length, which any
    /// integrator started from `y0` does.
    pub fn rhs_fn(
        &self,
        params: OdeParameters,
        y0: &DVector<f64>,
    ) -> Result<impl Fn(f64, &DVector<f64>) -> DVector<f64> + '_, OdeError> {
        self.check_dimensions(&params)?;
        self.check_length("y0", y0.len(), self.num_species())?;
        Ok(move |_t: f64, y: &DVector<f64>| {
            let mut dydt = DVector::zeros(self.num_species());
            self.eval_into(y.as_slice(), &params, dydt.as_mut_slice());
            dydt
        })
    }

    fn eval_into(&self, y: &[f64], params: &OdeParameters, dydt: &mut [f64]) {
        for (s, out) in dydt.iter_mut().enumerate() {
            let drive = self.eval_drive(s, y, params);
            *out = (drive * params.ymax[s] - y[s]) / params.tau[s];
        }
    }
    // endregion Evaluation

    // region Validation
    /// Check that parameter vectors match the species and reaction counts
    pub fn check_dimensions(&self, params: &OdeParameters) -> Result<(), OdeError> {
        self.check_length("ymax", params.ymax.len(), self.num_species())?;
        self.check_length("tau", params.tau.len(), self.num_species())?;
        self.check_length("w", params.w.len(), self.num_reactions())?;
        self.check_length("n", params.n.len(), self.num_reactions())?;
        self.check_length("EC50", params.ec50.len(), self.num_reactions())
    }

    fn check_length(&self, name: &str, found: usize, expected: usize) -> Result<(), OdeError> {
        if found != expected {
            return Err(OdeError::DimensionMismatch {
                name: name.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Check that every index in the equations refers to an existing species or reaction
    ///
    /// Always true for generated systems, used when a system is read back from disk.
    pub fn validate(&self) -> Result<(), OdeError> {
        self.check_length("equations", self.equations.len(), self.num_species())?;
        for expr in self.equations.iter().flatten() {
            check_indices(expr, self.num_species(), self.num_reactions())?;
        }
        Ok(())
    }

    /// Find reactions whose activation parameters make the Hill function degenerate
    ///
    /// Only reactions with at least one reactant are checked, input reactions never evaluate
    /// the Hill function. The hazards are reported, the right-hand side is left unchanged and
    /// will produce NaN or non-normalized values for these reactions.
    pub fn numeric_hazards(&self, params: &OdeParameters) -> Result<Vec<NumericHazard>, OdeError> {
        self.check_dimensions(params)?;
        let mut reactions: Vec<usize> = Vec::new();
        for expr in self.equations.iter().flatten() {
            collect_hill_reactions(expr, &mut reactions);
        }
        reactions.sort_unstable();
        reactions.dedup();
        Ok(reactions
            .into_iter()
            .filter_map(|j| {
                hill_hazard(params.n[j], params.ec50[j]).map(|kind| NumericHazard {
                    reaction_id: self.reaction_ids[j].clone(),
                    kind,
                })
            })
            .collect())
    }
    // endregion Validation

    /// Render the equations as text, one line per species
    ///
    /// ```text
    /// dydt[B] = (act(y[A],w[1],n[1],EC50[1])*ymax[B] - y[B])/tau[B]
    /// ```
    pub fn to_source(&self) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(self.num_species() + 1);
        if let Some(ref id) = self.id {
            lines.push(format!("# {}", id));
        }
        for (s, species) in self.species_ids.iter().enumerate() {
            let drive = match self.equation(s) {
                Some(expr) => expr.to_string_ids(&self.species_ids),
                None => "0".to_string(),
            };
            lines.push(format!(
                "dydt[{s}] = ({drive}*ymax[{s}] - y[{s}])/tau[{s}]",
                s = species,
                drive = drive
            ));
        }
        lines.join("\n")
    }
}

fn collect_hill_reactions(expr: &LogicExpr, out: &mut Vec<usize>) {
    match expr {
        LogicExpr::Input { .. } => {}
        LogicExpr::Activation { reaction, .. } | LogicExpr::Inhibition { reaction, .. } => {
            out.push(*reaction)
        }
        LogicExpr::And { terms, .. } => terms.iter().for_each(|t| collect_hill_reactions(t, out)),
        LogicExpr::Or { left, right } => {
            collect_hill_reactions(left, out);
            collect_hill_reactions(right, out);
        }
    }
}

fn check_indices(expr: &LogicExpr, species: usize, reactions: usize) -> Result<(), OdeError> {
    let out_of_range = |kind: &str, index: usize, len: usize| {
        if index >= len {
            Err(OdeError::InvalidIndex {
                kind: kind.to_string(),
                index,
            })
        } else {
            Ok(())
        }
    };
    match expr {
        LogicExpr::Input { reaction } => out_of_range("reaction", *reaction, reactions),
        LogicExpr::Activation { species: s, reaction }
        | LogicExpr::Inhibition { species: s, reaction } => {
            out_of_range("species", *s, species)?;
            out_of_range("reaction", *reaction, reactions)
        }
        LogicExpr::And { reaction, terms } => {
            out_of_range("reaction", *reaction, reactions)?;
            terms
                .iter()
                .try_for_each(|t| check_indices(t, species, reactions))
        }
        LogicExpr::Or { left, right } => {
            check_indices(left, species, reactions)?;
            check_indices(right, species, reactions)
        }
    }
}

fn hill_hazard(n: f64, ec50: f64) -> Option<HazardKind> {
    if !n.is_finite() || n <= 0. {
        return Some(HazardKind::InvalidHillCoefficient);
    }
    if 2. * ec50.powf(n) - 1. == 0. {
        return Some(HazardKind::SingularBeta);
    }
    let (beta, _) = hill_constants(n, ec50);
    // Also catches a NaN beta
    if !(beta - 1. > 0.) {
        return Some(HazardKind::NegativeHillBase);
    }
    None
}

/// A reaction whose parameters make its activation function degenerate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumericHazard {
    pub reaction_id: String,
    pub kind: HazardKind,
}

impl Display for NumericHazard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reaction {}: {}", self.reaction_id, self.kind)
    }
}

/// Kinds of degenerate activation parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HazardKind {
    /// `2·EC50^n − 1 == 0`, beta is infinite
    SingularBeta,
    /// `beta − 1 <= 0`, so `K = (beta − 1)^(1/n)` is NaN, zero or negative
    NegativeHillBase,
    /// `n` is not a positive finite number
    InvalidHillCoefficient,
}

impl Display for HazardKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HazardKind::SingularBeta => write!(f, "EC50^n equals 0.5, the Hill constant is singular"),
            HazardKind::NegativeHillBase => {
                write!(f, "EC50^n exceeds 0.5, the Hill constant is not a real number")
            }
            HazardKind::InvalidHillCoefficient => write!(f, "Hill coefficient is not positive"),
        }
    }
}

/// Errors raised when evaluating an OdeSystem
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OdeError {
    #[error("Vector {name} has length {found}, expected {expected}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Equation refers to {kind} {index}, which does not exist")]
    InvalidIndex { kind: String, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic_model::reaction::Reaction;
    use crate::logic_model::species::{Species, SpeciesBuilder};
    use approx::assert_relative_eq;

    fn setup_model(ids: &[&str], reactions: &[(&str, f64, f64, f64)]) -> Model {
        let species: Vec<Species> = ids
            .iter()
            .map(|id| SpeciesBuilder::default().id(*id).build().unwrap())
            .collect();
        let reactions = reactions
            .iter()
            .enumerate()
            .map(|(i, (rule, w, n, ec50))| {
                Reaction::new(&format!("r{}", i + 1), rule, *w, *n, *ec50).unwrap()
            })
            .collect();
        Model::new(Some("test".to_string()), species, reactions).unwrap()
    }

    fn example_model() -> Model {
        setup_model(
            &["A", "B", "C"],
            &[
                ("=> A", 1., 1., 0.5),
                ("A => B", 1., 1.4, 0.5),
                ("A & !B => C", 1., 1.4, 0.5),
            ],
        )
    }

    #[test]
    fn rhs_values() {
        let model = example_model();
        let system = model.ode_system();
        let params = model.load_params();
        let dydt = system.rhs(0., &params.y0, &params.ode).unwrap();
        assert_eq!(dydt, DVector::from_vec(vec![1., 0., 0.]));

        let y = DVector::from_vec(vec![1., 0.5, 0.25]);
        let dydt = system.rhs(3., &y, &params.ode).unwrap();
        assert_relative_eq!(dydt[0], 0., epsilon = 1e-12);
        assert_relative_eq!(dydt[1], 1. - 0.5, epsilon = 1e-12);
        // act(A=1) * inhib(B=0.5) = 1 * 0.5
        assert_relative_eq!(dydt[2], 0.5 - 0.25, epsilon = 1e-12);
    }

    #[test]
    fn rhs_uses_ymax_and_tau() {
        let model = example_model();
        let system = model.ode_system();
        let mut params = model.load_params().ode;
        params.ymax[0] = 0.5;
        params.tau[0] = 4.;
        let y = DVector::from_vec(vec![0.1, 0., 0.]);
        let dydt = system.rhs(0., &y, &params).unwrap();
        assert_relative_eq!(dydt[0], (0.5 - 0.1) / 4., epsilon = 1e-15);
    }

    #[test]
    fn undriven_species_decay() {
        let model = setup_model(&["A", "B"], &[("=> A", 1., 1.4, 0.5)]);
        let system = model.ode_system();
        assert!(system.equation(1).is_none());
        let params = model.load_params();
        let y = DVector::from_vec(vec![0., 0.6]);
        let dydt = system.rhs(0., &y, &params.ode).unwrap();
        assert_eq!(dydt.len(), 2);
        assert_relative_eq!(dydt[1], -0.6, epsilon = 1e-15);
    }

    #[test]
    fn parameter_overrides() {
        let model = example_model();
        let system = model.ode_system();
        let mut params = model.load_params();
        params.ode.w[0] = 0.;
        let dydt = system.rhs(0., &params.y0, &params.ode).unwrap();
        assert_eq!(dydt[0], 0.);
    }

    #[test]
    fn repeated_generation_is_bit_identical() {
        let model = example_model();
        let params = model.load_params();
        let y = DVector::from_vec(vec![0.3, 0.7, 0.2]);
        let first = OdeSystem::generate(&model).rhs(0., &y, &params.ode).unwrap();
        let second = OdeSystem::generate(&model).rhs(0., &y, &params.ode).unwrap();
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn closure_matches_rhs() {
        let model = example_model();
        let system = model.ode_system();
        let params = model.load_params();
        let y = DVector::from_vec(vec![0.3, 0.7, 0.2]);
        let expected = system.rhs(1., &y, &params.ode).unwrap();
        let f = system.rhs_fn(params.ode.clone(), &params.y0).unwrap();
        assert_eq!(f(1., &y), expected);
    }

    #[test]
    fn dimension_mismatch() {
        let model = example_model();
        let system = model.ode_system();
        let mut params = model.load_params();
        let short = DVector::from_vec(vec![0., 0.]);
        assert_eq!(
            system.rhs(0., &short, &params.ode),
            Err(OdeError::DimensionMismatch {
                name: "y".to_string(),
                expected: 3,
                found: 2
            })
        );
        params.ode.ec50 = DVector::from_vec(vec![0.5]);
        assert!(matches!(
            system.rhs(0., &params.y0, &params.ode),
            Err(OdeError::DimensionMismatch { .. })
        ));
        assert!(system.rhs_fn(params.ode, &params.y0).is_err());
    }

    #[test]
    fn closure_checks_initial_state() {
        let model = example_model();
        let system = model.ode_system();
        let params = model.load_params();
        let short = DVector::from_vec(vec![0., 0.]);
        assert_eq!(
            system.rhs_fn(params.ode, &short).err(),
            Some(OdeError::DimensionMismatch {
                name: "y0".to_string(),
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn drive_checks_lengths() {
        let model = example_model();
        let system = model.ode_system();
        let params = model.load_params();
        assert_eq!(
            system.drive(0, &[], &params.ode),
            Err(OdeError::DimensionMismatch {
                name: "y".to_string(),
                expected: 3,
                found: 0
            })
        );
        assert_eq!(
            system.drive(3, &[0., 0., 0.], &params.ode),
            Err(OdeError::InvalidIndex {
                kind: "species".to_string(),
                index: 3
            })
        );
        let mut short_w = params.ode.clone();
        short_w.w = DVector::from_vec(vec![1.]);
        assert!(matches!(
            system.drive(1, &[1., 0., 0.], &short_w),
            Err(OdeError::DimensionMismatch { .. })
        ));
        assert_eq!(system.drive(0, &[0., 0., 0.], &params.ode), Ok(1.));
    }

    #[test]
    fn numeric_hazards() {
        let model = example_model();
        let system = model.ode_system();
        let mut params = model.load_params().ode;
        // The input reaction has EC50^n == 0.5 but never evaluates the Hill function
        assert!(system.numeric_hazards(&params).unwrap().is_empty());

        params.n[1] = 1.;
        params.ec50[2] = 0.9;
        let hazards = system.numeric_hazards(&params).unwrap();
        assert_eq!(
            hazards,
            vec![
                NumericHazard {
                    reaction_id: "r2".to_string(),
                    kind: HazardKind::SingularBeta
                },
                NumericHazard {
                    reaction_id: "r3".to_string(),
                    kind: HazardKind::NegativeHillBase
                },
            ]
        );
        // The hazards stay observable in the right-hand side
        let y = DVector::from_vec(vec![0.5, 0.5, 0.5]);
        let dydt = system.rhs(0., &y, &params).unwrap();
        assert!(!dydt[1].is_finite());
        assert!(dydt[2].is_nan());
    }

    #[test]
    fn source_rendering() {
        let model = example_model();
        let source = model.ode_system().to_source();
        let lines: Vec<&str> = source.lines().collect();
        assert_eq!(lines[0], "# test");
        assert_eq!(lines[1], "dydt[A] = (w[0]*ymax[A] - y[A])/tau[A]");
        assert_eq!(
            lines[2],
            "dydt[B] = (act(y[A],w[1],n[1],EC50[1])*ymax[B] - y[B])/tau[B]"
        );
        assert_eq!(
            lines[3],
            "dydt[C] = (AND(w[2],[act(y[A],w[2],n[2],EC50[2]),inhib(y[B],w[2],n[2],EC50[2])])*ymax[C] - y[C])/tau[C]"
        );
    }

    #[test]
    fn validate_indices() {
        let model = example_model();
        let mut system = model.ode_system();
        assert!(system.validate().is_ok());
        system.equations[1] = Some(LogicExpr::Activation {
            species: 7,
            reaction: 1,
        });
        assert_eq!(
            system.validate(),
            Err(OdeError::InvalidIndex {
                kind: "species".to_string(),
                index: 7
            })
        );
    }
}
