use nback_core::stimulus::grid_side;
use nback_core::{Cue, GamePhase};
use nback_game::{GameSnapshot, GameSummary};

/// Text for one cue: the grid with the lit cell, or the spoken letter.
pub fn render_cue(cue: Cue, grid_size: u8) -> String {
    match cue {
        Cue::Spoken(letter) => format!("  ♪  {letter}"),
        Cue::Grid { row, col } => {
            let side = grid_side(grid_size);
            let mut out = String::new();
            for r in 0..side {
                out.push_str("  ");
                for c in 0..side {
                    out.push_str(if (r, c) == (row, col) { "[#]" } else { "[ ]" });
                }
                if r + 1 < side {
                    out.push('\n');
                }
            }
            out
        }
    }
}

/// Highscore while idle, the running score during play.
pub fn status_line(snapshot: &GameSnapshot) -> String {
    let config = &snapshot.config;
    let header = match snapshot.phase {
        GamePhase::Running => format!("Score: {}", snapshot.score.score),
        GamePhase::NotStarted | GamePhase::Finished => {
            format!("Highscore: {}", snapshot.score.highscore)
        }
    };
    format!(
        "{header} | {:?} | N = {} | Time = {}s | Events = {}",
        snapshot.state.game_type, config.n_back, config.interval_seconds, config.event_count
    )
}

pub fn summary_report(summary: &GameSummary) -> String {
    let mut lines = vec![
        format!(
            "Game over: score {} ({})",
            summary.score,
            if summary.new_highscore {
                "new highscore!".to_string()
            } else {
                format!("highscore {}", summary.previous_highscore)
            }
        ),
        format!(
            "Hits {}, misses {}, false alarms {}, correct rejections {}",
            summary.hits, summary.misses, summary.false_alarms, summary.correct_rejections
        ),
    ];
    if let Some(accuracy) = summary.accuracy() {
        lines.push(format!("Accuracy {:.1}%", accuracy * 100.0));
    }
    if let Some(mean) = summary.mean_reaction_ms {
        lines.push(format!("Mean reaction time {mean:.0} ms"));
    }
    lines.join("\n")
}
