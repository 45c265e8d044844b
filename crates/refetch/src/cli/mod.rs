mod args;

pub use args::{Args, FreshnessArg, HashArg};
