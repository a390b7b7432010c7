//! Iteration bookkeeping and Wilson-chain coefficients.
use super::errors::Error;

/// Position within the chain: site `n` of `nmax + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub n: usize,
    pub nmax: usize,
}

impl Step {
    pub fn last(&self) -> bool {
        self.n == self.nmax
    }

    /// Characteristic energy scale `Λ^{−(n−1)/2}` of the iteration, in
    /// units of the half bandwidth.
    pub fn scale(&self, lambda: f64) -> f64 {
        lambda.powf(-(self.n as f64 - 1.0) / 2.0)
    }
}

/// Hopping (`ξ`) and on-site (`ζ`) coefficients of the discretized chain,
/// one sequence per channel, in rescaled units where `ξ_n → 1` far down
/// the chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainCoefs {
    xi: Vec<Vec<f64>>,
    zeta: Vec<Vec<f64>>,
}

impl ChainCoefs {
    pub fn new(xi: Vec<Vec<f64>>, zeta: Vec<Vec<f64>>)
               -> Result<Self, Error> {
        if xi.len() != zeta.len() {
            return Err(Error::InvalidParam(
                "coefs",
                format!("{} xi channel(s) but {} zeta channel(s)",
                        xi.len(), zeta.len()),
            ));
        }
        for ch in 0 .. xi.len() {
            if xi[ch].len() != zeta[ch].len() {
                return Err(Error::InvalidParam(
                    "coefs",
                    format!("channel {}: {} xi but {} zeta entries",
                            ch, xi[ch].len(), zeta[ch].len()),
                ));
            }
        }
        Ok(ChainCoefs { xi, zeta })
    }

    /// Analytic coefficients of a flat particle-hole symmetric band.
    pub fn flat_band(lambda: f64, channels: usize, len: usize) -> Self {
        assert!(lambda > 1.0);
        let xi_n: Vec<f64> = (0 .. len)
            .map(|n| {
                let n = n as f64;
                (1.0 - lambda.powf(-n - 1.0))
                    / ((1.0 - lambda.powf(-2.0 * n - 1.0)).sqrt()
                       * (1.0 - lambda.powf(-2.0 * n - 3.0)).sqrt())
            })
            .collect();
        ChainCoefs {
            xi: vec![xi_n; channels],
            zeta: vec![vec![0.0; len]; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.xi.len()
    }

    pub fn len(&self) -> usize {
        self.xi.first().map(Vec::len).unwrap_or(0)
    }

    pub fn xi(&self, n: usize, ch: usize) -> f64 {
        self.xi[ch][n]
    }

    pub fn zeta(&self, n: usize, ch: usize) -> f64 {
        self.zeta[ch][n]
    }
}
