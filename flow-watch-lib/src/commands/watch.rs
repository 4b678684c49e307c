use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Identifier of the task to follow, as returned when it was submitted
    #[arg(value_name = "TASK_ID")]
    pub task_id: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub async fn watch_task<H: Host>(host: &mut H, args: &WatchArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;
    let outcome = common.watch(&args.task_id).await?;
    common.finish(&outcome)
}
