//! Submit bank-statement processing jobs and follow them from the terminal.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use flow_watch_lib::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that talks to the real terminal and process.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
