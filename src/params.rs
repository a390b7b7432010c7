//! Run configuration.
use super::errors::Error;

/// What the recalculation kernels project through after truncation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Only the kept states (the conventional scheme).
    Kept,
    /// Every computed state; discarded-state matrix elements stay
    /// available to downstream consumers.
    All,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Kept
    }
}

/// All knobs of one run.  `Default` gives a small but sensible
/// single-channel configuration; `validate` rejects inconsistent values
/// before any work is done.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Symmetry type: `"U1"`, `"QSZ"`, or `"QS"`.
    pub symtype: String,
    pub channels: usize,
    /// Logarithmic discretization parameter `Λ > 1`.
    pub lambda: f64,
    /// Dimensionless inverse temperature of the thermodynamic traces.
    pub betabar: f64,
    /// Index of the last site; the chain has `nmax + 1` sites.
    pub nmax: usize,
    /// Iterations before the first truncation; everything is kept while
    /// `n < ninit`.
    pub ninit: usize,
    /// Hard cap on the number of kept states (multiplicity-weighted).
    pub keep: usize,
    /// Keep all states below this rescaled energy (0 disables the cutoff).
    pub keepenergy: f64,
    /// Floor: never truncate below this many states.
    pub keepmin: usize,
    /// Minimal rescaled-energy gap allowed at the truncation boundary.
    pub safeguard: f64,
    /// Budget of extra states the safeguard may pull in.
    pub safeguardmax: usize,
    pub strategy: Strategy,
    /// Retry a shortfallen iteration with a larger diagonalization ratio.
    pub restart: bool,
    /// Multiplier applied to `diagratio` on each restart.
    pub restartfactor: f64,
    /// Fraction of the spectrum to compute per subspace (1 computes all).
    pub diagratio: f64,
    /// Compute and keep the full spectrum on the last iteration.
    pub lastall: bool,
    pub verbose: bool,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            symtype: "QS".to_owned(),
            channels: 1,
            lambda: 2.0,
            betabar: 1.0,
            nmax: 10,
            ninit: 0,
            keep: 100,
            keepenergy: 0.0,
            keepmin: 0,
            safeguard: 1e-5,
            safeguardmax: 200,
            strategy: Strategy::default(),
            restart: true,
            restartfactor: 2.0,
            diagratio: 1.0,
            lastall: false,
            verbose: false,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), Error> {
        if self.lambda <= 1.0 {
            return Err(Error::InvalidParam(
                "lambda",
                format!("must exceed 1, got {}", self.lambda),
            ));
        }
        if self.betabar <= 0.0 {
            return Err(Error::InvalidParam(
                "betabar",
                format!("must be positive, got {}", self.betabar),
            ));
        }
        if self.keep == 0 {
            return Err(Error::InvalidParam(
                "keep",
                "must be positive".to_owned(),
            ));
        }
        if self.keepmin > self.keep {
            return Err(Error::InvalidParam(
                "keepmin",
                format!("{} exceeds keep = {}", self.keepmin, self.keep),
            ));
        }
        if self.keepenergy < 0.0 {
            return Err(Error::InvalidParam(
                "keepenergy",
                format!("must be nonnegative, got {}", self.keepenergy),
            ));
        }
        if self.safeguard < 0.0 {
            return Err(Error::InvalidParam(
                "safeguard",
                format!("must be nonnegative, got {}", self.safeguard),
            ));
        }
        if !(self.diagratio > 0.0 && self.diagratio <= 1.0) {
            return Err(Error::InvalidParam(
                "diagratio",
                format!("must lie in (0, 1], got {}", self.diagratio),
            ));
        }
        if self.restart && self.restartfactor <= 1.0 {
            return Err(Error::InvalidParam(
                "restartfactor",
                format!("must exceed 1, got {}", self.restartfactor),
            ));
        }
        Ok(())
    }
}
