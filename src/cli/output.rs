//! Output formatting and progress bars for CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::{game::Player, solver::Score};

/// Create a progress bar for a batch of games
pub fn create_game_progress(total_games: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_games);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({msg})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb
}

/// Create a spinner for the solve phases
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

const SECTION_WIDTH: usize = 60;
const SUBSECTION_WIDTH: usize = 40;
const KEY_WIDTH: usize = 20;

/// Header block for one report: the title between two full-width rules
pub fn section_header(title: &str) -> String {
    let rule = "=".repeat(SECTION_WIDTH);
    format!("\n{rule}\n{title}\n{rule}")
}

pub fn print_section(title: &str) {
    println!("{}", section_header(title));
}

pub fn print_subsection(title: &str) {
    println!("\n{title}\n{}", "-".repeat(SUBSECTION_WIDTH));
}

/// Position and cycle counts grouped in thousands
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let lead = match digits.len() % 3 {
        0 => 3,
        rem => rem,
    };
    let mut grouped = digits[..lead].to_string();
    for chunk in digits.as_bytes()[lead..].chunks(3) {
        grouped.push(',');
        grouped.extend(chunk.iter().map(|&b| char::from(b)));
    }
    grouped
}

/// One `key: value` line of a report, keys aligned
pub fn kv_line(key: &str, value: &str) -> String {
    let key = format!("{key}:");
    format!("  {key:<KEY_WIDTH$} {value}")
}

pub fn print_kv(key: &str, value: &str) {
    println!("{}", kv_line(key, value));
}

/// Score from player one's perspective with its verdict
pub fn format_score(score: Score) -> String {
    let verdict = if score >= 1.0 {
        format!("{} wins", Player::One)
    } else if score <= -1.0 {
        format!("{} wins", Player::Two)
    } else if score == 0.0 {
        "draw".to_string()
    } else {
        "heuristic".to_string()
    };
    format!("{score:+.3} ({verdict})")
}
