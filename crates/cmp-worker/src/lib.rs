// cmp-worker is the long-running comparison service: a collector polls the
// platform for comparison jobs, a pool of processors executes them, and a
// reporter periodically publishes aggregate statistics.

pub mod job;
pub mod logging;
pub mod options;
pub mod pipeline;
pub mod queue;
pub mod rest;
pub mod stats;
