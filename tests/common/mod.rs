#![allow(dead_code)]
#![allow(unused_imports)]

pub use jobrun_test_utils::{builders, fake_jobs, init_tracing};
