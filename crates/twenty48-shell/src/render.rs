use twenty48_core::{MoveOutcome, Snapshot};

/// Text board with a score header, e.g.
///
/// ```text
/// score: 8  best: 120
///    2   |       |       |
/// -------------------------------
/// ...
/// ```
pub fn render_board(snapshot: &Snapshot, cell_width: usize) -> String {
    let mut out = format!("score: {}  best: {}\n", snapshot.score, snapshot.best_score);
    out.push_str(&format!("{:width$}", snapshot.grid, width = cell_width.max(1)));
    if snapshot.over {
        out.push_str(&game_over_banner(snapshot));
        out.push('\n');
    }
    out
}

pub fn game_over_banner(snapshot: &Snapshot) -> String {
    format!("Game over! Final score: {}", snapshot.score)
}

/// One line per slide/merge/spawn, for `render.show_events`.
pub fn render_events(outcome: &MoveOutcome) -> String {
    let slides = outcome
        .slides
        .iter()
        .chain(&outcome.settles)
        .map(|s| format!("  slide {} {} -> {}\n", s.value, s.from, s.to));
    let merges = outcome
        .merges
        .iter()
        .map(|m| format!("  merge {} -> {} = {}\n", m.from, m.into, m.value));
    let spawn = outcome
        .spawned
        .map(|s| format!("  spawn {} at {}\n", s.value, s.at));
    slides.chain(merges).chain(spawn).collect()
}
