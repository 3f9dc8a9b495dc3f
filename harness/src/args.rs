use std::path::PathBuf;
use structopt::StructOpt;

/// # Turnstile Command-Line Interface
///
/// Exercises the ephemeral counter program across the base chain and the
/// ephemeral rollup: either the whole flow end to end, or one operation at a
/// time.
#[derive(StructOpt, Debug)]
#[structopt(name = "turnstile", rename_all = "kebab-case")]
pub enum HarnessCommand {
    /// ## Run
    ///
    /// Runs the whole counter flow end to end: initialize, increase on the
    /// base chain, delegate, increase on the rollup, commit, increase again,
    /// then commit and undelegate.
    Run {
        /// The path to the harness configuration file.
        #[structopt(parse(from_os_str))]
        config: PathBuf,
    },
    /// ## Initialize
    ///
    /// Creates the counter record on the base chain.
    Initialize {
        #[structopt(parse(from_os_str))]
        config: PathBuf,
    },
    /// ## Increase
    ///
    /// Increases the counter on the base chain, or on the rollup with
    /// `--ephemeral` (the record must be delegated first).
    Increase {
        #[structopt(parse(from_os_str))]
        config: PathBuf,
        /// The amount to add to the counter.
        #[structopt(long, default_value = "1")]
        amount: u64,
        /// Send the request to the ephemeral rollup instead of the base chain.
        #[structopt(long)]
        ephemeral: bool,
    },
    /// ## Delegate
    ///
    /// Hands the counter record over to the ephemeral rollup.
    Delegate {
        #[structopt(parse(from_os_str))]
        config: PathBuf,
    },
    /// ## Commit
    ///
    /// Publishes the rollup's counter state back to the base chain, keeping
    /// the delegation in place.
    Commit {
        #[structopt(parse(from_os_str))]
        config: PathBuf,
    },
    /// ## Undelegate
    ///
    /// Publishes the rollup's counter state back to the base chain and
    /// returns ownership to it.
    Undelegate {
        #[structopt(parse(from_os_str))]
        config: PathBuf,
    },
    /// ## Status
    ///
    /// Prints the payer balance and the counter record's state on both
    /// layers.
    Status {
        #[structopt(parse(from_os_str))]
        config: PathBuf,
    },
}
