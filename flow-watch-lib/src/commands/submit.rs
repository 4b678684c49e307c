use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::api::{Credentials, DEFAULT_RANGE_DAYS, ProcessRequest};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct SubmitArgs {
    /// Mailbox address whose statements should be processed
    #[arg(long, value_name = "EMAIL", env = "FLOW_WATCH_EMAIL")]
    pub email: String,

    /// Mailbox app password
    #[arg(long, value_name = "PASSWORD", env = "FLOW_WATCH_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Password protecting the statement PDFs
    #[arg(long, value_name = "PASSWORD", env = "FLOW_WATCH_PDF_PASSWORD", hide_env_values = true)]
    pub pdf_password: String,

    /// First day of the statement range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "to_date", conflicts_with = "days", help_heading = "Date Range")]
    pub from_date: Option<NaiveDate>,

    /// Last day of the statement range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "from_date", conflicts_with = "days", help_heading = "Date Range")]
    pub to_date: Option<NaiveDate>,

    /// Process the given number of days up to today [default: 365]
    #[arg(long, value_name = "N", help_heading = "Date Range")]
    pub days: Option<u64>,

    /// Submit the task without waiting for it to finish
    #[arg(long)]
    pub no_watch: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl SubmitArgs {
    fn process_request(&self, today: NaiveDate) -> Result<ProcessRequest> {
        match (self.from_date, self.to_date) {
            (Some(from_date), Some(to_date)) => ProcessRequest::new(from_date, to_date, self.pdf_password.as_str()),
            _ => ProcessRequest::for_last_days(self.days.unwrap_or(DEFAULT_RANGE_DAYS), today, self.pdf_password.as_str()),
        }
    }
}

pub async fn submit_task<H: Host>(host: &mut H, args: &SubmitArgs) -> Result<()> {
    let request = args.process_request(Local::now().date_naive())?;
    let credentials = Credentials {
        email: args.email.trim().to_string(),
        password: args.password.clone(),
    };

    let mut common = Common::new(host, &args.common)?;
    common.client.authenticate(&credentials).await?;

    let task_id = common.client.submit(&request).await?;
    let _ = writeln!(common.host().output(), "Submitted task {task_id}");

    if args.no_watch {
        return Ok(());
    }

    let outcome = common.watch(&task_id).await?;
    common.finish(&outcome)
}
