use clap::Parser;
use mimir::search::grounding::DeleteRelaxedProblemExplorator;
use mimir::search::axioms::AxiomEvaluator;
use mimir::search::heuristics::HeuristicName;
use mimir::search::match_tree::MatchTreeOptions;
use mimir::search::search_engines::{SearchEngineName, SearchResult, TerminationCondition};
use mimir::search::{SearchMode, StateRepository};
use mimir::Task;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

#[derive(Parser)]
#[command(version, about = "A classical-planning toolbox for PDDL tasks", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "DOMAIN")]
    domain: PathBuf,
    #[arg(short, long, value_name = "PROBLEM")]
    problem: PathBuf,
    #[arg(long, value_enum, default_value = "grounded")]
    mode: SearchMode,
    #[arg(short, long, value_enum, default_value = "gbfs")]
    search_engine: SearchEngineName,
    #[arg(long, value_enum, default_value = "hff")]
    heuristic: HeuristicName,
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<u64>,
    #[arg(long, help = "Dump the action match tree in dot format")]
    dump_match_tree: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let task = Rc::new(Task::from_path(&args.domain, &args.problem));
    let explorator = Rc::new(DeleteRelaxedProblemExplorator::new(task.clone()));

    let mut options = MatchTreeOptions::default();
    if let Some(path) = &args.dump_match_tree {
        options.enable_dump_dot_file = true;
        options.output_dot_file = path.clone();
    }

    let axiom_evaluator = match AxiomEvaluator::new(
        &task,
        explorator.grounder().axioms(),
        &MatchTreeOptions::default(),
    ) {
        Ok(evaluator) => Rc::new(evaluator),
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };
    let mut repository = StateRepository::new(task.clone(), axiom_evaluator);
    let mut generator = args.mode.create(task.clone(), &explorator, options);

    let termination = TerminationCondition::new(args.time_limit.map(Duration::from_secs));
    let result = args.search_engine.search(
        task,
        &explorator,
        generator.as_mut(),
        &mut repository,
        args.heuristic,
        &termination,
    );

    match result {
        SearchResult::Success(plan) => {
            println!("{plan}");
            ExitCode::SUCCESS
        }
        SearchResult::ProvablyUnsolvable => {
            eprintln!("the task is provably unsolvable");
            ExitCode::FAILURE
        }
        SearchResult::TimeLimitExceeded => {
            eprintln!("time limit exceeded");
            ExitCode::FAILURE
        }
    }
}
