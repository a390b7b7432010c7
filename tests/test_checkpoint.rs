//! Checkpoint round trips: a reloaded run must continue exactly where the
//! original left off, producing bit-identical registries and traces.
#[macro_use]
extern crate kondo;

use std::collections::BTreeMap;
use kondo::errors::Error;
use kondo::io;
use kondo::mat::Mat;
use kondo::nrg::Run;
use kondo::params::Params;
use kondo::step::ChainCoefs;
use kondo::symmetry::OpKind;

fn params() -> Params {
    let mut p = Params::default();
    p.symtype = "U1".to_owned();
    p.channels = 1;
    p.lambda = 2.0;
    p.nmax = 6;
    p.keep = 16;
    p
}

#[test]
fn reload_resumes_bit_identically() {
    let coefs = ChainCoefs::flat_band(2.0, 1, 8);
    let mut run: Run<f64> = Run::new(params(), coefs.clone()).unwrap();
    let mut seed = BTreeMap::new();
    seed.insert((invar![0], invar![0]), Mat::zero(1, 1));
    run.track("Qtot", OpKind::Global("Qtot".to_owned()), seed);
    for _ in 0 .. 3 {
        run.step().unwrap();
    }

    let mut buf = Vec::new();
    io::save(&run, &mut buf).unwrap();
    run.run().unwrap();

    let mut resumed: Run<f64> =
        io::load(params(), coefs, &buf[..]).unwrap();
    assert_eq!(resumed.n, 3);
    resumed.run().unwrap();

    assert_eq!(run.n, resumed.n);
    assert_eq!(run.td, resumed.td);
    assert_eq!(run.diag, resumed.diag);
    assert_eq!(run.opch, resumed.opch);
    assert_eq!(run.ops.get("Qtot").unwrap().elements,
               resumed.ops.get("Qtot").unwrap().elements);
}

#[test]
fn garbage_is_rejected() {
    let coefs = ChainCoefs::flat_band(2.0, 1, 8);
    let bytes = vec![0u8; 64];
    match io::load::<f64, _>(params(), coefs, &bytes[..]) {
        Err(Error::CheckpointMagic(found)) => assert_eq!(found, 0),
        other => panic!("expected CheckpointMagic, got {:?}",
                        other.err()),
    }
}

#[test]
fn future_format_versions_are_rejected() {
    let coefs = ChainCoefs::flat_band(2.0, 1, 8);
    let mut run: Run<f64> = Run::new(params(), coefs.clone()).unwrap();
    run.step().unwrap();
    let mut buf = Vec::new();
    io::save(&run, &mut buf).unwrap();
    // the version field sits right after the magic number
    buf[4] = 0xff;
    match io::load::<f64, _>(params(), coefs, &buf[..]) {
        Err(Error::CheckpointVersion(found, expected)) => {
            assert_eq!(found, 0xff);
            assert_eq!(expected, 1);
        }
        other => panic!("expected CheckpointVersion, got {:?}",
                        other.err()),
    }
}
