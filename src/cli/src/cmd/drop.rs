use std::path::PathBuf;

use async_trait::async_trait;
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use futures::StreamExt;

use libdatadrop::error::DropError;
use libdatadrop::opts::{DirtyPolicy, DropOpts};
use libdatadrop::repositories::drop::{self, DropContext};

use crate::cmd::RunCmd;
use crate::render;

pub const NAME: &str = "drop";
pub struct DropCmd;

pub fn drop_args() -> Command {
    Command::new(NAME)
        .about("Drop the local content of files, keeping their history and pointers")
        .arg(
            Arg::new("paths")
                .help("Files or directories to drop content from")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("dataset")
                .long("dataset")
                .short('d')
                .help("Dataset to operate on, relative paths are taken from its root"),
        )
        .arg(
            Arg::new("recursive")
                .long("recursive")
                .short('r')
                .help("Also drop content in sub-datasets")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recursion-limit")
                .long("recursion-limit")
                .short('R')
                .help("How many levels of sub-datasets to descend into")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("nocheck")
                .long("nocheck")
                .help("Do not verify that enough copies exist elsewhere before dropping")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("if-dirty")
                .long("if-dirty")
                .help("What to do with datasets that have unsaved changes")
                .value_parser(PossibleValuesParser::new(DirtyPolicy::VARIANTS))
                .default_value(DirtyPolicy::SaveBefore.as_str()),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Report paths without a content store as impossible")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON record per line")
                .action(ArgAction::SetTrue),
        )
}

pub fn opts_from_args(args: &ArgMatches) -> Result<DropOpts, DropError> {
    let paths: Vec<PathBuf> = args
        .get_many::<String>("paths")
        .map(|paths| paths.map(PathBuf::from).collect())
        .unwrap_or_default();
    let if_dirty = match args.get_one::<String>("if-dirty") {
        Some(policy) => policy.parse::<DirtyPolicy>()?,
        None => DirtyPolicy::default(),
    };

    Ok(DropOpts {
        paths,
        dataset: args.get_one::<String>("dataset").map(PathBuf::from),
        recursive: args.get_flag("recursive"),
        recursion_limit: args.get_one::<usize>("recursion-limit").copied(),
        check: !args.get_flag("nocheck"),
        if_dirty,
        no_content_store_is_error: args.get_flag("strict"),
    })
}

#[async_trait]
impl RunCmd for DropCmd {
    fn name(&self) -> &str {
        NAME
    }

    fn args(&self) -> Command {
        drop_args()
    }

    async fn run(&self, args: &ArgMatches) -> Result<(), DropError> {
        let opts = opts_from_args(args)?;
        let json = args.get_flag("json");

        let mut records = drop::run(opts, DropContext::local());
        let mut failures = 0;
        while let Some(item) = records.next().await {
            let record = item?;
            if record.status.is_failure() {
                failures += 1;
            }
            println!("{}", render::render_record(&record, json)?);
        }

        if failures > 0 {
            return Err(DropError::basic_str(format!(
                "{failures} path(s) could not be dropped"
            )));
        }
        Ok(())
    }
}
