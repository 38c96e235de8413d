#![allow(dead_code)]

pub use inotools_test_utils::builders::{split_at_offsets, FrameBuilder};
pub use inotools_test_utils::{init_tracing, mock_session};

pub type TestResult = anyhow::Result<()>;
