//! Solve command - Solve a start position and report the result

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::{CommonConfig, RulesConfig},
        output::{
            create_spinner, format_number, format_score, print_kv, print_section,
            print_subsection,
        },
    },
    game::GameState,
    solver::{LineOutcome, Solution, Solver, best_child},
};

#[derive(Parser, Debug)]
#[command(about = "Solve every position reachable from a start position")]
pub struct SolveArgs {
    /// Start position as `a,b|c,d|p`
    #[arg(long, short = 's', default_value = "1,1|1,1|1")]
    pub start: String,

    #[command(flatten)]
    pub rules: RulesConfig,

    /// Print every solved position
    #[arg(long)]
    pub table: bool,

    /// Longest principal line to print
    #[arg(long, default_value_t = 100)]
    pub max_plies: usize,

    /// Print the statistics as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: SolveArgs, common: &CommonConfig) -> Result<()> {
    let start = GameState::from_label(&args.start)
        .with_context(|| format!("Invalid --start position '{}'", args.start))?;
    let config = args.rules.solver_config()?;

    let spinner = common
        .progress
        .then(|| create_spinner(&format!("Solving {start} ({} rules)", config.ruleset)));
    let solution = Solver::new(config).solve(start);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let solution = solution.context("Solve failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(solution.stats())?);
        return Ok(());
    }

    print_summary(&solution);
    print_line(&solution, args.max_plies);
    if args.table {
        print_table(&solution);
    }
    Ok(())
}

fn print_summary(solution: &Solution) {
    let stats = solution.stats();
    print_section(&format!("Solution for {}", solution.start()));
    print_kv("Rules", &stats.ruleset.to_string());
    print_kv("Positions", &format_number(stats.nodes));
    print_kv("Leaves", &format_number(stats.leaves));
    print_kv("Raw cycles", &format_number(stats.raw_cycles));
    print_kv(
        "Loop components",
        &format!(
            "{} ({} positions)",
            format_number(stats.components),
            format_number(stats.loop_members)
        ),
    );
    if let Some((min, max)) = stats.leaf_depths {
        print_kv("Leaf depths", &format!("{min}..={max}"));
    }
    print_kv("Root score", &format_score(stats.root_score));

    match solution.best_move(&solution.start()) {
        Ok(best) => print_kv("Best move", &format!("{} -> {}", best.mv, best.next)),
        Err(err) => print_kv("Best move", &format!("none ({err})")),
    }
}

fn print_line(solution: &Solution, max_plies: usize) {
    let line = solution.principal_line(max_plies);
    print_subsection("Principal line");
    for (ply, (mv, position)) in line.moves.iter().zip(line.positions.iter().skip(1)).enumerate()
    {
        println!("  {:>3}. {:<16} {position}", ply + 1, mv.to_string());
    }
    let ending = match line.outcome {
        LineOutcome::Win(player) => format!("{player} wins"),
        LineOutcome::Repetition => "position repeats".to_string(),
        LineOutcome::Truncated => "line truncated".to_string(),
    };
    print_kv("Outcome", &ending);
}

fn print_table(solution: &Solution) {
    let graph = solution.graph();
    print_subsection("Positions");
    println!(
        "  {:<12} {:>7} {:>6} {:>5}  best move",
        "position", "score", "rank", "loop"
    );
    for (id, node) in graph.nodes() {
        let score = node
            .score()
            .map_or_else(|| "-".to_string(), |score| format!("{score:+.3}"));
        let rank = node.rank().map_or_else(|| "-".to_string(), |rank| rank.to_string());
        let loops = node
            .loops()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let best = best_child(graph, id)
            .map(|(mv, child)| format!("{mv} -> {}", graph.label(child)))
            .unwrap_or_default();
        println!(
            "  {:<12} {score:>7} {rank:>6} {loops:>5}  {best}",
            node.state().encode()
        );
    }
}
