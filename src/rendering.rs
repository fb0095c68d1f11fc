use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::geometry::{Ellipse, Polygon};
use crate::types::{Rect, Vector2D};

pub const BACKGROUND: Color = Color::Grey;

/// Drawing context handed to bodies each frame. Coordinates are in
/// play-area pixels.
pub trait Surface {
    fn fill_polygon(&mut self, polygon: &Polygon, color: Color);
    fn stroke_polygon(&mut self, polygon: &Polygon, color: Color);
    fn fill_ellipse(&mut self, ellipse: &Ellipse, color: Color);
}

fn glyph(color: Color) -> char {
    match color {
        Color::Green => '#',
        Color::Black => '+',
        Color::DarkGrey => 'o',
        _ => '*',
    }
}

/// In-memory terminal used by headless runs: a character grid and a cursor.
/// Colour commands have no effect on it.
pub struct ScreenBuffer {
    rows: Vec<Vec<char>>,
    cursor: (u16, u16),
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            rows: vec![vec![' '; width as usize]; height as usize],
            cursor: (0, 0),
        }
    }

    #[cfg(test)]
    pub fn row(&self, y: u16) -> String {
        self.rows
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(' ');
        }
        self.cursor = (0, 0);
    }

    pub fn log_frame(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.rows {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

// Text past the right edge or below the last row is dropped.
impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let (mut x, y) = self.cursor;
        if let Some(row) = self.rows.get_mut(y as usize) {
            for c in String::from_utf8_lossy(buf).chars() {
                if let Some(cell) = row.get_mut(x as usize) {
                    *cell = c;
                }
                x = x.saturating_add(1);
            }
        }
        self.cursor.0 = x;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where frames go: the real terminal, or a `ScreenBuffer` for debug runs.
/// Terminal output is queued and only reaches the screen on `flush`.
pub enum OutputTarget {
    Terminal(io::Stdout),
    Headless(ScreenBuffer),
}

impl OutputTarget {
    pub fn move_cursor(&mut self, x: u16, y: u16) -> io::Result<()> {
        match self {
            OutputTarget::Terminal(out) => queue!(out, MoveTo(x, y)),
            OutputTarget::Headless(screen) => {
                screen.cursor = (x, y);
                Ok(())
            }
        }
    }

    pub fn apply(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Terminal(out) => queue!(out, command),
            OutputTarget::Headless(_) => Ok(()),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Terminal(out) => out.write(buf),
            OutputTarget::Headless(screen) => screen.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Terminal(out) => out.flush(),
            OutputTarget::Headless(screen) => screen.flush(),
        }
    }
}

// --- GameGrid: rasterizes the pixel play area onto terminal cells ---
pub struct GameGrid {
    pub grid: Vec<Vec<Option<Color>>>,
    pub width: u16,
    pub height: u16,
    cell_width: f64,
    cell_height: f64,
}

impl GameGrid {
    pub fn new(width: u16, height: u16, play_width: f64, play_height: f64) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        GameGrid {
            grid: vec![vec![None; width as usize]; height as usize],
            width,
            height,
            cell_width: play_width / width as f64,
            cell_height: play_height / height as f64,
        }
    }

    #[cfg(test)]
    pub fn cell(&self, x: u16, y: u16) -> Option<Color> {
        self.grid
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .flatten()
    }

    pub fn set_cell(&mut self, x: u16, y: u16, color: Color) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = Some(color);
        }
    }

    pub fn clear(&mut self) {
        self.grid = vec![vec![None; self.width as usize]; self.height as usize];
    }

    fn cell_at(&self, point: Vector2D) -> Option<(u16, u16)> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let x = (point.x / self.cell_width).floor();
        let y = (point.y / self.cell_height).floor();
        if x < self.width as f64 && y < self.height as f64 {
            Some((x as u16, y as u16))
        } else {
            None
        }
    }

    fn cell_center(&self, x: u16, y: u16) -> Vector2D {
        Vector2D::new(
            (x as f64 + 0.5) * self.cell_width,
            (y as f64 + 0.5) * self.cell_height,
        )
    }

    // Fills every cell whose centre lies inside the shape. Shapes smaller
    // than a cell still mark the cell holding their centre.
    fn fill_where(&mut self, bounds: Rect, color: Color, contains: impl Fn(Vector2D) -> bool) {
        let col_start = (bounds.x / self.cell_width).floor().max(0.0) as u16;
        let row_start = (bounds.y / self.cell_height).floor().max(0.0) as u16;
        let col_end = ((bounds.right() / self.cell_width).ceil().max(0.0) as u16).min(self.width);
        let row_end = ((bounds.bottom() / self.cell_height).ceil().max(0.0) as u16).min(self.height);

        let mut filled = false;
        for y in row_start..row_end {
            for x in col_start..col_end {
                if contains(self.cell_center(x, y)) {
                    self.set_cell(x, y, color);
                    filled = true;
                }
            }
        }
        if !filled {
            let center = Vector2D::new(bounds.x + bounds.width / 2.0, bounds.y + bounds.height / 2.0);
            if let Some((x, y)) = self.cell_at(center) {
                self.set_cell(x, y, color);
            }
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget, top: u16) -> io::Result<()> {
        stdout.apply(SetBackgroundColor(BACKGROUND))?;
        for y in 0..self.height {
            stdout.move_cursor(0, top + y)?;
            let mut current: Option<Color> = None;
            let mut run = String::new();
            for cell in &self.grid[y as usize] {
                if *cell != current && !run.is_empty() {
                    Self::flush_run(stdout, current, &run)?;
                    run.clear();
                }
                current = *cell;
                run.push(cell.map(glyph).unwrap_or(' '));
            }
            Self::flush_run(stdout, current, &run)?;
        }
        stdout.apply(ResetColor)?;
        Ok(())
    }

    fn flush_run(stdout: &mut OutputTarget, color: Option<Color>, run: &str) -> io::Result<()> {
        if let Some(color) = color {
            stdout.apply(SetForegroundColor(color))?;
        }
        write!(stdout, "{}", run)
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget, terminal_width: u16, terminal_height: u16) -> io::Result<()> {
        stdout.apply(ResetColor)?;
        for y in 0..terminal_height {
            stdout.move_cursor(0, y)?;
            write!(stdout, "{}", " ".repeat(terminal_width as usize))?;
        }
        stdout.move_cursor(0, 0)?;
        Ok(())
    }
}

impl Surface for GameGrid {
    fn fill_polygon(&mut self, polygon: &Polygon, color: Color) {
        self.fill_where(polygon.bounds(), color, |p| polygon.contains_point(p));
    }

    fn stroke_polygon(&mut self, polygon: &Polygon, color: Color) {
        let step = self.cell_width.min(self.cell_height) / 2.0;
        for (a, b) in polygon.edges() {
            let length = b.sub(a).length_squared().sqrt();
            let steps = (length / step).ceil().max(1.0) as u32;
            for i in 0..=steps {
                let point = a.add(b.sub(a).scale(i as f64 / steps as f64));
                if let Some((x, y)) = self.cell_at(point) {
                    self.set_cell(x, y, color);
                }
            }
        }
    }

    fn fill_ellipse(&mut self, ellipse: &Ellipse, color: Color) {
        self.fill_where(ellipse.bounds(), color, |p| ellipse.contains_point(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_ellipse_marks_covered_cells() {
        // 10x10 pixel cells.
        let mut grid = GameGrid::new(10, 10, 100.0, 100.0);
        grid.fill_ellipse(&Ellipse::new(20.0, 20.0, 40.0, 40.0), Color::DarkGrey);
        assert_eq!(grid.cell(4, 4), Some(Color::DarkGrey));
        assert_eq!(grid.cell(2, 2), None);
        assert_eq!(grid.cell(8, 8), None);
    }

    #[test]
    fn test_tiny_shape_still_visible() {
        let mut grid = GameGrid::new(10, 10, 100.0, 100.0);
        grid.fill_ellipse(&Ellipse::new(31.0, 31.0, 2.0, 2.0), Color::DarkGrey);
        assert_eq!(grid.cell(3, 3), Some(Color::DarkGrey));
    }

    #[test]
    fn test_stroke_then_fill_keeps_border_outside() {
        let mut grid = GameGrid::new(10, 10, 100.0, 100.0);
        let square = Polygon::new(vec![
            Vector2D::new(10.0, 10.0),
            Vector2D::new(60.0, 10.0),
            Vector2D::new(60.0, 60.0),
            Vector2D::new(10.0, 60.0),
        ]);
        grid.stroke_polygon(&square, Color::Black);
        grid.fill_polygon(&square, Color::Green);
        assert_eq!(grid.cell(3, 3), Some(Color::Green));
        assert_eq!(grid.cell(6, 3), Some(Color::Black));
    }

    #[test]
    fn test_render_into_screen_buffer() {
        let mut grid = GameGrid::new(4, 2, 40.0, 20.0);
        grid.set_cell(1, 0, Color::Green);
        grid.set_cell(3, 1, Color::DarkGrey);
        let mut target = OutputTarget::Headless(ScreenBuffer::new(4, 3));
        grid.render(&mut target, 1).unwrap();
        let OutputTarget::Headless(sb) = target else {
            panic!("expected screen buffer");
        };
        assert_eq!(sb.row(0), "    ");
        assert_eq!(sb.row(1), " #  ");
        assert_eq!(sb.row(2), "   o");
    }

    #[test]
    fn test_screen_buffer_clips_and_clears() {
        let mut screen = ScreenBuffer::new(3, 2);
        write!(screen, "abcdef").unwrap();
        assert_eq!(screen.row(0), "abc");
        screen.cursor = (1, 1);
        write!(screen, "z").unwrap();
        assert_eq!(screen.row(1), " z ");
        screen.clear();
        assert_eq!(screen.row(0), "   ");
        assert_eq!(screen.row(5), "");
    }
}
