use async_trait::async_trait;
use clap::{ArgMatches, Command};

use libdatadrop::error::DropError;

pub mod drop;
pub use drop::DropCmd;

#[async_trait]
pub trait RunCmd {
    fn name(&self) -> &str;
    fn args(&self) -> Command;
    async fn run(&self, args: &ArgMatches) -> Result<(), DropError>;
}
