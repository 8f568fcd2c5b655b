use std::sync::Arc;
use std::time::Duration;

use colored::*;
use devtree_common::tree::{AliasGroup, DomainNode, HostTree};

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

pub fn print(msg: &str) {
    println!("{msg}");
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    let output: String = format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    );
    print(&output);
}

/// Renders every host tree followed by a one-line summary.
pub fn host_trees(trees: &[Arc<HostTree>], total_time: Duration) {
    if trees.is_empty() {
        header("no reachable hosts");
        return;
    }

    header("device trees");
    for (idx, tree) in trees.iter().enumerate() {
        tree_head(idx, &tree.value);
        let mut lines: Vec<Line> = Vec::new();
        if let Some(group) = tree.aliases() {
            alias_lines(group, &mut lines);
        }
        for domain in tree.domains() {
            domain_lines(domain, &mut lines);
        }
        draw(&lines);
        if idx + 1 != trees.len() {
            print("");
        }
    }

    let devices: usize = trees.iter().map(|tree| tree.members().count()).sum();
    let hosts: ColoredString = format!("{} hosts", trees.len()).bold().green();
    let devices: ColoredString = format!("{devices} devices").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    fat_separator();
    print(&format!(
        "{}",
        format!("Trees Complete: {hosts} and {devices} in {total_time}").color(colors::TEXT_DEFAULT)
    ));
}

/// One line per node: depth, then the rendered label.
type Line = (usize, String);

fn alias_lines(group: &AliasGroup, lines: &mut Vec<Line>) {
    lines.push((0, group.value.color(colors::TEXT_DEFAULT).to_string()));
    for alias in &group.data {
        lines.push((
            1,
            format!(
                "{} {} {}",
                alias.value.color(colors::ALIAS),
                "→".color(colors::SEPARATOR),
                alias.device_name.color(colors::DEVICE)
            ),
        ));
    }
}

fn domain_lines(domain: &DomainNode, lines: &mut Vec<Line>) {
    lines.push((0, domain.value.color(colors::PRIMARY).to_string()));
    for family in &domain.data {
        lines.push((1, family.value.color(colors::TEXT_DEFAULT).to_string()));
        for member in &family.data {
            lines.push((2, member.value.color(colors::DEVICE).to_string()));
        }
    }
}

/// Draws depth-tagged lines with box-drawing branches.
fn draw(lines: &[Line]) {
    let depths: Vec<usize> = lines.iter().map(|(depth, _)| *depth).collect();

    for (idx, (depth, label)) in lines.iter().enumerate() {
        let mut prefix = String::new();
        for level in 0..*depth {
            let continues = has_sibling_after(&depths, idx, level);
            prefix.push_str(if continues { " │  " } else { "    " });
        }
        let branch: ColoredString = if has_sibling_after(&depths, idx, *depth) {
            "├─".bright_black()
        } else {
            "└─".bright_black()
        };
        print(&format!("{}{} {}", prefix.bright_black(), branch, label));
    }
}

/// Whether another node at `depth` follows `idx` before the tree climbs
/// above `depth`.
fn has_sibling_after(depths: &[usize], idx: usize, depth: usize) -> bool {
    depths[idx + 1..]
        .iter()
        .take_while(|next| **next >= depth)
        .any(|next| *next == depth)
}
