//! Checkpoint persistence.
//!
//! A checkpoint captures everything a resumed run needs to continue
//! bit-identically: the iteration counter, the subspace registry, the
//! chain-extension blocks, the tracked operators, and the thermodynamic
//! rows collected so far.  Parameters and chain coefficients are *not*
//! stored; the caller supplies them again on reload, which keeps the
//! format independent of configuration plumbing.
use std::io::{Read, Write};
use bincode;
use super::errors::Error;
use super::linalg::Scalar;
use super::nrg::{Run, TrackedOp};
use super::params::Params;
use super::stats::TdPoint;
use super::step::ChainCoefs;
use super::subspaces::{DiagInfo, Opch};

const MAGIC: u32 = 0x4e52_4743;
const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Checkpoint<T> {
    magic: u32,
    version: u32,
    n: usize,
    egs: f64,
    diag: DiagInfo<T>,
    opch: Opch<T>,
    ops: std::collections::BTreeMap<String, TrackedOp<T>>,
    td: Vec<TdPoint>,
}

pub fn save<T: Scalar, W: Write>(run: &Run<T>, w: W) -> Result<(), Error> {
    let checkpoint = Checkpoint {
        magic: MAGIC,
        version: VERSION,
        n: run.n,
        egs: run.egs,
        diag: run.diag.clone(),
        opch: run.opch.clone(),
        ops: run.ops.clone(),
        td: run.td.clone(),
    };
    bincode::serialize_into(w, &checkpoint)?;
    Ok(())
}

pub fn load<T: Scalar, R: Read>(
    params: Params,
    coefs: ChainCoefs,
    r: R,
) -> Result<Run<T>, Error> {
    let checkpoint: Checkpoint<T> = bincode::deserialize_from(r)?;
    if checkpoint.magic != MAGIC {
        return Err(Error::CheckpointMagic(checkpoint.magic));
    }
    if checkpoint.version != VERSION {
        return Err(Error::CheckpointVersion(checkpoint.version, VERSION));
    }
    let mut run = Run::new(params, coefs)?;
    run.n = checkpoint.n;
    run.egs = checkpoint.egs;
    run.diag = checkpoint.diag;
    run.opch = checkpoint.opch;
    run.ops = checkpoint.ops;
    run.td = checkpoint.td;
    Ok(run)
}
