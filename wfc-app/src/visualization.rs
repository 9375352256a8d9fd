//! Text rendering of grids.

use crate::config::SudokuDisplay;
use anyhow::Result;
use colored::{ColoredString, Colorize};
use std::fmt::Write as _;
use std::io::Write;
use wfc_core::{Cell, PossibilityGrid};
use wfc_rules::{Digit, Symbol, Tile};

/// Turns a grid into lines of text.
pub trait GridRenderer<S: Symbol>: Send {
    /// Text for one cell.
    fn cell(&self, cell: &Cell<S>) -> String;

    /// Characters between cells on a row.
    fn separator(&self) -> &'static str {
        ""
    }

    /// One line per grid row, no trailing blank line.
    fn render_rows(&self, grid: &PossibilityGrid<S>) -> Vec<String> {
        (0..grid.height)
            .map(|y| {
                (0..grid.width)
                    .filter_map(|x| grid.get(x, y))
                    .map(|cell| self.cell(cell))
                    .collect::<Vec<_>>()
                    .join(self.separator())
            })
            .collect()
    }

    fn render(&self, grid: &PossibilityGrid<S>) -> String {
        let mut out = String::new();
        for row in self.render_rows(grid) {
            let _ = writeln!(out, "{row}");
        }
        out
    }
}

/// Terrain maps as two-character blocks.
///
/// Resolved tiles are colored blocks, or two-character glyphs when color is
/// off. Unresolved cells show their option mask in hex.
#[derive(Debug, Clone, Copy)]
pub struct TerrainRenderer {
    /// Colored blocks when set, plain glyphs otherwise.
    pub color: bool,
}

impl TerrainRenderer {
    /// Renderer for the terminal.
    pub fn colored() -> Self {
        Self { color: true }
    }

    /// Renderer for files and tests.
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn block(tile: Tile) -> ColoredString {
        let block = "██";
        match tile {
            Tile::Water => block.cyan(),
            Tile::Sand => block.yellow(),
            Tile::Grass => block.green(),
            Tile::Stone => block.black(),
        }
    }

    fn glyph(tile: Tile) -> &'static str {
        match tile {
            Tile::Water => "~~",
            Tile::Sand => "..",
            Tile::Grass => ",,",
            Tile::Stone => "##",
        }
    }
}

/// `n` in hex, left aligned in two columns.
pub fn hex_mask(mask: u8) -> String {
    format!("{mask:<2x}")
}

impl GridRenderer<Tile> for TerrainRenderer {
    fn cell(&self, cell: &Cell<Tile>) -> String {
        match (cell.value(), self.color) {
            (Some(tile), true) => Self::block(tile).to_string(),
            (Some(tile), false) => Self::glyph(tile).to_string(),
            (None, color) => {
                let hex = hex_mask(Tile::mask_of(cell.options()));
                if color {
                    hex.red().to_string()
                } else {
                    hex
                }
            }
        }
    }
}

/// Sudoku boards, one character per cell.
#[derive(Debug, Clone, Copy)]
pub struct SudokuRenderer {
    /// Values or option counts.
    pub display: SudokuDisplay,
}

impl GridRenderer<Digit> for SudokuRenderer {
    fn cell(&self, cell: &Cell<Digit>) -> String {
        match (self.display, cell.value()) {
            (SudokuDisplay::Values, Some(digit)) => digit.to_string(),
            (SudokuDisplay::Values, None) => "?".to_string(),
            (SudokuDisplay::Counts, Some(_)) => "*".to_string(),
            (SudokuDisplay::Counts, None) => cell.option_count().to_string(),
        }
    }

    fn separator(&self) -> &'static str {
        " "
    }
}

/// Renders several grids of equal height next to each other.
pub fn render_side_by_side<S: Symbol, R: GridRenderer<S>>(
    renderer: &R,
    grids: &[PossibilityGrid<S>],
) -> String {
    let rendered: Vec<Vec<String>> = grids.iter().map(|g| renderer.render_rows(g)).collect();
    let height = rendered.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = String::new();
    for y in 0..height {
        let line: Vec<&str> = rendered
            .iter()
            .map(|rows| rows.get(y).map_or("", String::as_str))
            .collect();
        let _ = writeln!(out, "{}", line.join("  "));
    }
    out
}

/// Every 4-bit mask with the tiles it stands for.
pub fn mask_legend() -> String {
    let mut out = String::new();
    for mask in 0..16u8 {
        let names: Vec<&str> = Tile::from_mask(mask)
            .unwrap_or_default()
            .into_iter()
            .map(Tile::name)
            .collect();
        let _ = writeln!(out, "{} = [{}]", hex_mask(mask), names.join(", "));
    }
    out
}

/// Trait for types that show the state of a grid.
///
/// Implementors define how the grid is presented, such as terminal output or
/// a snapshot file.
pub trait Visualizer<S: Symbol>: Send {
    /// Displays or updates the visualization based on the current state of the grid.
    fn display_state(&mut self, grid: &PossibilityGrid<S>) -> Result<()>;
}

/// Writes rendered grids to a stream, stdout by default.
pub struct TerminalVisualizer<R, W = std::io::Stdout> {
    renderer: R,
    out: W,
}

impl<R> TerminalVisualizer<R> {
    /// Prints to stdout.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            out: std::io::stdout(),
        }
    }
}

impl<R, W: Write> TerminalVisualizer<R, W> {
    /// Prints to `out`.
    pub fn with_writer(renderer: R, out: W) -> Self {
        Self { renderer, out }
    }

    pub fn into_writer(self) -> W {
        self.out
    }
}

impl<S, R, W> Visualizer<S> for TerminalVisualizer<R, W>
where
    S: Symbol,
    R: GridRenderer<S>,
    W: Write + Send,
{
    fn display_state(&mut self, grid: &PossibilityGrid<S>) -> Result<()> {
        writeln!(self.out, "{}", self.renderer.render(grid))?;
        self.out.flush()?;
        Ok(())
    }
}
