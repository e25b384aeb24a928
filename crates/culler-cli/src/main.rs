mod cli;
mod config;
mod discovery;
mod tracing;

use clap::Parser;
use culler_core::{
    globs::WalkdirGlobExpander, issues::IssueKind, parser::StubParser, plugin::NoopPlugin,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::Args::parse();
    tracing::init(args.verbosity);

    let exit_code = run(args);
    std::process::exit(exit_code);
}

fn run(args: cli::Args) -> i32 {
    let resolved_config = match config::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            return 2;
        }
    };

    let registry = match discovery::build(&resolved_config.working_directory) {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            return 2;
        }
    };

    let expander = WalkdirGlobExpander::new(resolved_config.exclude_patterns.clone());
    let plugins: Vec<Box<dyn culler_core::plugin::EntryPointPlugin>> = vec![Box::new(NoopPlugin)];

    let (report_selectors, issues_by_type, counters) = culler_core::analyze(
        &resolved_config,
        &registry,
        &expander,
        &plugins,
        StubParser::default(),
        true,
    );

    if args.json {
        let payload = serde_json::json!({
            "issues": issues_by_type,
            "counters": counters,
            "files": report_selectors,
        });
        println!("{}", serde_json::to_string_pretty(&payload).expect("issue map is serializable"));
    } else {
        print_report(&issues_by_type, counters);
    }

    let issue_count: usize = issues_by_type.values().map(Vec::len).sum();
    if issue_count > 0 {
        1
    } else {
        0
    }
}

fn print_report(
    issues_by_type: &std::collections::BTreeMap<IssueKind, Vec<culler_core::issues::Issue>>,
    counters: culler_core::issues::Counters,
) {
    let issue_count: usize = issues_by_type.values().map(Vec::len).sum();
    println!("{}", tracing::summary_line(counters.processed, counters.total, issue_count));

    for (kind, issues) in issues_by_type {
        if issues.is_empty() {
            continue;
        }
        println!("\n{kind:?} ({})", issues.len());
        for issue in issues {
            println!("  {} - {}", issue.file_path, issue.symbol);
        }
    }
}
