//! PNG rendering of a board with its laser paths.
//!
//! Each doubled-lattice unit is `SCALE` pixels, so a block cell spans
//! `2 * SCALE` pixels and lattice point `(x, y)` sits at pixel
//! `(x * SCALE, y * SCALE)` offset by the margin.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::blocks::{Block, Cell};
use crate::error::RenderError;
use crate::geometry::{CellIndex, Point};
use crate::grid::Board;
use crate::tracer::{Laser, Trace};

/// Pixels per doubled-lattice unit.
pub const SCALE: u32 = 20;

/// Blank border around the board, in pixels.
const MARGIN: u32 = SCALE;

/// Largest board side, in cells, that will be rendered.
const MAX_CELLS: usize = 256;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const VOID: Rgba<u8> = Rgba([0, 0, 0, 255]);
const EMPTY: Rgba<u8> = Rgba([225, 225, 225, 255]);
const CELL_BORDER: Rgba<u8> = Rgba([128, 128, 128, 255]);
const PLACED_BORDER: Rgba<u8> = Rgba([20, 20, 20, 255]);
const BEAM: Rgba<u8> = Rgba([220, 20, 20, 255]);
const TARGET: Rgba<u8> = Rgba([255, 170, 0, 255]);

/// Returns the fill colour for a block kind.
fn block_color(block: Block) -> Rgba<u8> {
    match block {
        Block::Reflective => Rgba([70, 130, 180, 255]), // steel blue
        Block::Opaque => Rgba([112, 128, 144, 255]),    // slate grey
        Block::Refractive => Rgba([50, 205, 50, 255]),  // lime green
    }
}

/// Converts a lattice point to pixel space; `None` if it falls off-canvas.
fn to_pixel(point: Point) -> Option<(u32, u32)> {
    let x = u32::try_from(point.x).ok()?;
    let y = u32::try_from(point.y).ok()?;
    Some((MARGIN + x * SCALE, MARGIN + y * SCALE))
}

fn fill_rect(image: &mut RgbaImage, x0: u32, y0: u32, width: u32, height: u32, color: Rgba<u8>) {
    for y in y0..(y0 + height).min(image.height()) {
        for x in x0..(x0 + width).min(image.width()) {
            image.put_pixel(x, y, color);
        }
    }
}

fn outline_rect(image: &mut RgbaImage, x0: u32, y0: u32, size: u32, thickness: u32, color: Rgba<u8>) {
    fill_rect(image, x0, y0, size, thickness, color);
    fill_rect(image, x0, y0 + size - thickness, size, thickness, color);
    fill_rect(image, x0, y0, thickness, size, color);
    fill_rect(image, x0 + size - thickness, y0, thickness, size, color);
}

/// Paints a square of side `size` centred on `point`.
fn mark(image: &mut RgbaImage, point: Point, size: u32, color: Rgba<u8>) {
    if let Some((x, y)) = to_pixel(point) {
        let half = size / 2;
        fill_rect(image, x.saturating_sub(half), y.saturating_sub(half), size, size, color);
    }
}

/// Draws a 3px line between two lattice points one unit step apart.
///
/// Consecutive trace points are always one lattice step apart (or equal),
/// so interpolating `SCALE` pixels along the step covers the segment.
fn draw_step(image: &mut RgbaImage, from: Point, to: Point) {
    let (Some((x0, y0)), Some((x1, y1))) = (to_pixel(from), to_pixel(to)) else {
        return;
    };
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);

    for t in 0..=steps {
        let x = x0 + (x1 - x0) * t / steps;
        let y = y0 + (y1 - y0) * t / steps;
        for (ox, oy) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (px, py) = (x + ox, y + oy);
            if px >= 0 && py >= 0 && (px as u32) < image.width() && (py as u32) < image.height() {
                image.put_pixel(px as u32, py as u32, BEAM);
            }
        }
    }
}

/// Renders `board`, every trace segment, laser origins and targets.
pub fn draw(
    board: &impl Board,
    lasers: &[Laser],
    traces: &[Trace],
    targets: &[Point],
) -> Result<RgbaImage, RenderError> {
    if board.rows() > MAX_CELLS || board.columns() > MAX_CELLS {
        return Err(RenderError::TooLarge {
            rows: board.rows(),
            columns: board.columns(),
        });
    }

    let width = 2 * MARGIN + board.width() as u32 * SCALE;
    let height = 2 * MARGIN + board.height() as u32 * SCALE;
    let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);
    let cell_size = 2 * SCALE;

    for row in 0..board.rows() {
        for col in 0..board.columns() {
            let cell = board.cell(CellIndex::new(row, col));
            let x0 = MARGIN + col as u32 * cell_size;
            let y0 = MARGIN + row as u32 * cell_size;

            let fill = match cell {
                Cell::Void => VOID,
                Cell::Empty => EMPTY,
                Cell::Fixed(block) | Cell::Placed(block) => block_color(block),
            };
            fill_rect(&mut image, x0, y0, cell_size, cell_size, fill);

            // placed blocks get a heavier outline than the puzzle's own
            let (border, thickness) = match cell {
                Cell::Placed(_) => (PLACED_BORDER, 3),
                _ => (CELL_BORDER, 1),
            };
            outline_rect(&mut image, x0, y0, cell_size, thickness, border);
        }
    }

    for trace in traces {
        for segment in trace.segments() {
            for pair in segment.windows(2) {
                draw_step(&mut image, pair[0], pair[1]);
            }
        }
    }

    for laser in lasers {
        mark(&mut image, laser.origin, SCALE / 2, BEAM);
    }
    for &target in targets {
        mark(&mut image, target, SCALE / 2, TARGET);
        mark(&mut image, target, SCALE / 4, BACKGROUND);
    }

    Ok(image)
}

/// Renders and saves a PNG to `path`.
pub fn render_png(
    board: &impl Board,
    lasers: &[Laser],
    traces: &[Trace],
    targets: &[Point],
    path: impl AsRef<Path>,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    let image = draw(board, lasers, traces, targets)?;
    image.save(path).map_err(|source| RenderError::Save {
        path: path.to_path_buf(),
        source,
    })
}
