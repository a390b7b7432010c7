//! Error taxonomy shared across the crate.
//!
//! Configuration problems and recoverable run failures are reported through
//! `Error`; violations of internal invariants (missing coefficient tables,
//! unknown global operator names) panic instead, because they indicate a bug
//! rather than bad input.
use std::io;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        /// The symmetry type named in the configuration is not one of the
        /// supported ones.
        UnknownSymmetry(name: String) {
            display("unknown symmetry type: {:?}", name)
        }
        /// The symmetry exists but does not support the requested number of
        /// channels.
        UnsupportedChannels(sym: &'static str, channels: usize) {
            display("symmetry {} does not support {} channel(s)", sym, channels)
        }
        /// A configuration parameter failed validation.
        InvalidParam(name: &'static str, reason: String) {
            display("invalid parameter `{}`: {}", name, reason)
        }
        /// The eigensolver reported a nonzero status code.
        Diag(code: i32) {
            display("eigensolver failed with status {}", code)
        }
        /// Truncation demanded more states than were computed and the restart
        /// budget is exhausted (or restarts are disabled).
        TruncationShortfall(wanted: usize, computed: usize) {
            display("truncation wants {} states but only {} were computed",
                    wanted, computed)
        }
        Io(err: io::Error) {
            from()
            display("i/o error: {}", err)
        }
        Checkpoint(err: bincode::Error) {
            from()
            display("checkpoint error: {}", err)
        }
        /// The data does not start with the checkpoint magic number.
        CheckpointMagic(found: u32) {
            display("not a checkpoint (magic {:#010x})", found)
        }
        /// The checkpoint was written by an incompatible version of the
        /// on-disk format.
        CheckpointVersion(found: u32, expected: u32) {
            display("checkpoint format version {} (expected {})",
                    found, expected)
        }
    }
}
