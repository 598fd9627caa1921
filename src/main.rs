#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # hdlgrade
//! ## Introduction
//!
//! Grades nand2tetris hardware projects from the command line.
//!
//! ## Usage
//!
//! `hdlgrade grade path/to/submission RAM8` copies the submission into a
//! fresh workspace, runs `RAM8.tst` from the fixture store through the
//! hardware simulator, and prints the feedback. `hdlgrade projects` prints the
//! chips expected for every project.
//!
//! Directories default to `grader/temp` and `grader/tests`; they can be set
//! with `HDLGRADE_*` variables (a `.env` file is read too) or with flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use hdlgrade::{
    config::GraderConfig,
    grade::GradeRequest,
    hdl::{HdlProject, NandToolchain},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Arguments of the `grade` subcommand.
#[derive(Debug, Clone)]
struct GradeArgs {
    /// Project number, when it should not be inferred from the chip
    project:        Option<u8>,
    /// Print the report as JSON
    json:           bool,
    /// Print a summary table to stderr
    table:          bool,
    /// Leave the workspace on disk
    keep_workspace: bool,
    /// Overrides the temp root
    temp_dir:       Option<PathBuf>,
    /// Overrides the fixture root
    fixtures:       Option<PathBuf>,
    /// Overrides the simulator tools directory
    tools:          Option<PathBuf>,
    /// Submission directory
    submission:     PathBuf,
    /// Chip to grade
    test:           String,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade one chip of a submission
    Grade(GradeArgs),
    /// Print the project catalog
    Projects,
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Options {
    /// Log at DEBUG instead of INFO
    verbose: bool,
    /// What to do
    cmd:     Cmd,
}

/// Parse the command line arguments and return the `Options`
fn options() -> Options {
    /// parses a directory override
    fn dir(name: &'static str, help: &'static str) -> impl Parser<Option<PathBuf>> {
        long(name).help(help).argument::<PathBuf>("DIR").optional()
    }

    let project = long("project")
        .help("Project the chip belongs to (inferred when omitted)")
        .argument::<u8>("N")
        .optional();
    let json = long("json").help("Print the report as JSON").switch();
    let table = long("table")
        .help("Print a summary table of the findings to stderr")
        .switch();
    let keep_workspace = long("keep-workspace")
        .help("Leave the workspace on disk after grading")
        .switch();
    let temp_dir = dir("temp-dir", "Directory for per-request workspaces");
    let fixtures = dir("fixtures", "Directory holding the p<N> fixture sets");
    let tools = dir("tools", "Directory holding the simulator scripts");
    let submission = positional::<PathBuf>("SUBMISSION").help("Submission directory");
    let test = positional::<String>("TEST").help("Name of the chip to grade, e.g. RAM8");

    let grade = construct!(GradeArgs {
        project,
        json,
        table,
        keep_workspace,
        temp_dir,
        fixtures,
        tools,
        submission,
        test
    })
    .to_options()
    .command("grade")
    .help("Grade one chip of a submission")
    .map(Cmd::Grade);

    let projects = pure(Cmd::Projects)
        .to_options()
        .command("projects")
        .help("Prints a JSON description of every project's chips");

    let verbose = short('v')
        .long("verbose")
        .help("Print debug logs")
        .switch();
    let cmd = construct!([grade, projects]);

    construct!(Options { verbose, cmd })
        .to_options()
        .descr("Autograder for nand2tetris hardware projects")
        .run()
}

/// Grades the submission named by `args` and prints the outcome.
async fn grade(args: GradeArgs) -> Result<()> {
    let mut config = GraderConfig::from_env();
    if let Some(dir) = args.temp_dir {
        config = config.with_temp_root(dir);
    }
    if let Some(dir) = args.fixtures {
        config = config.with_fixture_root(dir);
    }
    if let Some(dir) = args.tools {
        config = config.with_tools_dir(dir);
    }
    if args.keep_workspace {
        config = config.with_keep_workspace(true);
    }

    let toolchain =
        NandToolchain::new(config.tools_dir().map(Path::to_path_buf), config.simulator_timeout());
    let report = GradeRequest::builder()
        .submission(args.submission)
        .tests(vec![args.test])
        .maybe_project(args.project)
        .build()
        .run(&config, &toolchain)
        .await
        .context("Grading failed")?;

    if args.table
        && let Some(table) = report.entry_table()
    {
        eprintln!("{table}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.feedback);
        eprintln!("Grade: {}", report.grade);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match opts.cmd {
        Cmd::Grade(args) => grade(args).await?,
        Cmd::Projects => println!("{}", serde_json::to_string_pretty(&HdlProject::all())?),
    };

    Ok(())
}
