use std::io::Write;

/// The process surroundings a command runs in.
///
/// Commands print dashboards and summaries through `output`, report failures
/// through `error`, and end the process through `exit` when a watched task
/// does not succeed.
pub trait Host: Send + Sync {
    /// Where dashboards, task ids, and export notices go.
    fn output(&mut self) -> impl Write;

    /// Where validation failures go.
    fn error(&mut self) -> impl Write;

    /// End the process with `code`.
    fn exit(&mut self, code: i32);
}

/// Captures everything a command writes, plus the exit code it asked for.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
    pub exit_code: Option<i32>,
}

#[cfg(test)]
impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    pub fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

#[cfg(test)]
impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}
