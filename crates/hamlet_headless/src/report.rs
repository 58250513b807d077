//! Console status report for headless runs.
//!
//! Renders a fixed-width box-drawing table on stdout (logs go to stderr)
//! and redraws it in place with an ANSI cursor-up sequence, so a long run
//! shows a single live-updating table instead of scrolling. Defeated
//! players are struck through.

use std::fmt::Write as _;
use std::io::Write;
use std::time::Duration;

use hamlet_core::player::StatisticType;
use hamlet_core::world::GameWorld;

const NAME_WIDTH: usize = 14;
const STRIKETHROUGH: &str = "\x1b[9m";
const STRIKETHROUGH_OFF: &str = "\x1b[29m";

/// Live status table writer.
///
/// The first `print` draws the table; later calls move the cursor back up
/// over it and draw again. Keep unrelated stdout writes away while a
/// report is live.
#[derive(Debug, Default)]
pub struct StatusReport {
    printed_lines: usize,
}

impl StatusReport {
    /// A report that has not drawn anything yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { printed_lines: 0 }
    }

    /// Number of terminal lines one table occupies for this world.
    #[must_use]
    pub fn height(world: &GameWorld) -> usize {
        6 + world.num_players()
    }

    /// Render the table as plain text (with per-row strikethrough codes,
    /// without any cursor movement).
    #[must_use]
    pub fn render(world: &GameWorld, wall: Duration) -> String {
        let gf = world.current_gf();
        let game_clock = world.settings().speed.game_clock(gf);
        let gf_per_sec = if wall.as_secs_f64() > 0.0 {
            f64::from(gf) / wall.as_secs_f64()
        } else {
            0.0
        };

        let mut out = String::new();
        let status = format!(
            " GF {gf:>8}  game {}  wall {}  {gf_per_sec:>7.0} GF/s",
            format_duration(game_clock),
            format_duration(wall),
        );
        let inner_width = NAME_WIDTH + 2 + 9 + 11 + 10 + 12 + 4; // columns plus separators

        let _ = writeln!(out, "┌{}┐", "─".repeat(inner_width));
        let _ = writeln!(out, "│{status:<inner_width$}│");
        let _ = writeln!(
            out,
            "├{}┬{}┬{}┬{}┬{}┤",
            "─".repeat(NAME_WIDTH + 2),
            "─".repeat(9),
            "─".repeat(11),
            "─".repeat(10),
            "─".repeat(12),
        );
        let _ = writeln!(
            out,
            "│ {:<NAME_WIDTH$} │ {:>7} │ {:>9} │ {:>8} │ {:>10} │",
            "Player", "Country", "Buildings", "Military", "Gold",
        );
        let _ = writeln!(
            out,
            "├{}┼{}┼{}┼{}┼{}┤",
            "─".repeat(NAME_WIDTH + 2),
            "─".repeat(9),
            "─".repeat(11),
            "─".repeat(10),
            "─".repeat(12),
        );
        for player in world.players() {
            let mut name = player.name.clone();
            name.truncate(NAME_WIDTH);
            let row = format!(
                " {:<NAME_WIDTH$} │ {:>7} │ {:>9} │ {:>8} │ {:>10} ",
                name,
                player.statistic_current(StatisticType::Country),
                player.statistic_current(StatisticType::Buildings),
                player.statistic_current(StatisticType::Military),
                player.statistic_current(StatisticType::Gold),
            );
            if player.is_defeated() {
                let _ = writeln!(out, "│{STRIKETHROUGH}{row}{STRIKETHROUGH_OFF}│");
            } else {
                let _ = writeln!(out, "│{row}│");
            }
        }
        let _ = writeln!(
            out,
            "└{}┴{}┴{}┴{}┴{}┘",
            "─".repeat(NAME_WIDTH + 2),
            "─".repeat(9),
            "─".repeat(11),
            "─".repeat(10),
            "─".repeat(12),
        );
        out
    }

    /// Draw (or redraw in place) the table on the given writer.
    pub fn print<W: Write>(
        &mut self,
        world: &GameWorld,
        wall: Duration,
        writer: &mut W,
    ) -> std::io::Result<()> {
        if self.printed_lines > 0 {
            write!(writer, "\x1b[{}A", self.printed_lines)?;
        }
        let table = Self::render(world, wall);
        writer.write_all(table.as_bytes())?;
        writer.flush()?;
        self.printed_lines = Self::height(world);
        Ok(())
    }
}

/// Format a duration as `HH:MM:SS`.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
