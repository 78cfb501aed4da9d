#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the snake autoplay workspace.
//!
//! This crate defines the vocabulary that connects adapters, the session that
//! owns the control loop, and the pure systems. Adapters implement
//! [`FrameSource`] to hand over captured [`Frame`] values and [`KeySink`] to
//! receive [`Key`] presses. Systems turn frames into [`Observation`] values and
//! observations into [`Direction`] choices without touching the outside world.

use std::{collections::BTreeSet, error::Error as StdError, fmt, str::FromStr};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length in pixels of a single grid cell in the stock game rendering.
pub const DEFAULT_GRID_PITCH: u32 = 20;

/// Three-channel pixel buffer captured from the game window.
pub type Frame = RgbImage;

/// Cardinal movement directions available to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in canonical search order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector expressed as `(column delta, row delta)`.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction whose vector is the exact negation of this one.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction of a single cardinal step from `from` to `to`, if they are adjacent.
    #[must_use]
    pub fn between(from: GridPosition, to: GridPosition) -> Option<Self> {
        let delta = (to.column - from.column, to.row - from.row);
        Self::ALL
            .into_iter()
            .find(|direction| direction.offset() == delta)
    }

    /// Lowercase name used in configuration files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a direction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown direction `{0}`; expected one of up, down, left, right")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|direction| direction.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseDirectionError(trimmed.to_owned()))
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that a projected step past the top or left edge
/// remains representable; such positions are simply out of bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPosition {
    column: i32,
    row: i32,
}

impl GridPosition {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Position reached by moving one cell along `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            column: self.column.saturating_add(dx),
            row: self.row.saturating_add(dy),
        }
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPosition) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Dimensions of the playfield measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells covered by the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let columns = usize::try_from(self.columns).unwrap_or(0);
        let rows = usize::try_from(self.rows).unwrap_or(0);
        columns.saturating_mul(rows)
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub fn contains(&self, position: GridPosition) -> bool {
        self.index(position).is_some()
    }

    /// Row-major index of the position, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, position: GridPosition) -> Option<usize> {
        let column = u32::try_from(position.column()).ok()?;
        let row = u32::try_from(position.row()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Iterator over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> {
        let columns = i32::try_from(self.columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.rows).unwrap_or(i32::MAX);
        (0..rows).flat_map(move |row| {
            (0..columns).map(move |column| GridPosition::new(column, row))
        })
    }
}

/// Maps between pixel space and the cell grid of the rendered game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pitch: u32,
}

impl GridGeometry {
    /// Creates a geometry whose cells are `pitch` pixels square.
    pub fn new(pitch: u32) -> Result<Self, GeometryError> {
        if pitch == 0 {
            return Err(GeometryError::ZeroPitch);
        }

        Ok(Self { pitch })
    }

    /// Side length of a single cell in pixels.
    #[must_use]
    pub const fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Cell containing the pixel at `(x, y)`.
    #[must_use]
    pub fn cell_at(&self, x: u32, y: u32) -> GridPosition {
        let column = i32::try_from(x / self.pitch).unwrap_or(i32::MAX);
        let row = i32::try_from(y / self.pitch).unwrap_or(i32::MAX);
        GridPosition::new(column, row)
    }

    /// Pixel coordinates of the upper-left corner of a cell.
    ///
    /// Returns `None` for cells with negative coordinates or whose origin does
    /// not fit in pixel space.
    #[must_use]
    pub fn cell_origin(&self, position: GridPosition) -> Option<(u32, u32)> {
        let column = u32::try_from(position.column()).ok()?;
        let row = u32::try_from(position.row()).ok()?;
        Some((column.checked_mul(self.pitch)?, row.checked_mul(self.pitch)?))
    }

    /// Grid dimensions that fit inside a frame of the given pixel size.
    #[must_use]
    pub const fn size_for(&self, width: u32, height: u32) -> GridSize {
        GridSize::new(width / self.pitch, height / self.pitch)
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            pitch: DEFAULT_GRID_PITCH,
        }
    }
}

/// Errors raised when describing the grid geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A zero pitch would map every pixel to an undefined cell.
    #[error("grid pitch must be positive")]
    ZeroPitch,
}

/// Game state reconstructed from a single captured frame.
///
/// Observations are produced fresh every tick and never mutated afterwards.
/// A `None` head or food means detection could not locate the object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Observation {
    head: Option<GridPosition>,
    body: BTreeSet<GridPosition>,
    food: Option<GridPosition>,
}

impl Observation {
    /// Creates an observation from detected objects.
    #[must_use]
    pub fn new(
        head: Option<GridPosition>,
        body: BTreeSet<GridPosition>,
        food: Option<GridPosition>,
    ) -> Self {
        Self { head, body, food }
    }

    /// Cell containing the snake head, if detected.
    #[must_use]
    pub const fn head(&self) -> Option<GridPosition> {
        self.head
    }

    /// Cells occupied by detected body segments.
    #[must_use]
    pub const fn body(&self) -> &BTreeSet<GridPosition> {
        &self.body
    }

    /// Cell containing the food, if detected.
    #[must_use]
    pub const fn food(&self) -> Option<GridPosition> {
        self.food
    }
}

/// Key presses the autoplayer can inject into the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow key steering the snake.
    Direction(Direction),
    /// Key that starts a new game after game over.
    Restart,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direction(direction) => write!(f, "{direction}"),
            Self::Restart => f.write_str("restart"),
        }
    }
}

/// Rectangle expressed in absolute screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenRegion {
    /// Horizontal coordinate of the left edge.
    pub left: i32,
    /// Vertical coordinate of the top edge.
    pub top: i32,
    /// Width of the region in pixels.
    pub width: u32,
    /// Height of the region in pixels.
    pub height: u32,
}

/// Produces frames of the game window on demand.
pub trait FrameSource {
    /// Captures the current contents of the game region.
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

/// Receives key presses destined for the foreground game.
pub trait KeySink {
    /// Injects a single key press; delivery is not acknowledged.
    fn press(&mut self, key: Key) -> Result<(), DispatchError>;
}

/// Failure to obtain a frame from the screen.
#[derive(Debug, Error)]
#[error("frame capture failed: {message}")]
pub struct CaptureError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl CaptureError {
    /// Creates an error carrying only a description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping the underlying platform failure.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Failure to inject a key press.
#[derive(Debug, Error)]
#[error("key dispatch failed for `{key}`: {message}")]
pub struct DispatchError {
    key: Key,
    message: String,
}

impl DispatchError {
    /// Creates an error for the key that could not be delivered.
    #[must_use]
    pub fn new(key: Key, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = GridPosition::new(1, 1);
        let destination = GridPosition::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn reverse_negates_every_offset() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            assert_eq!(direction.reverse().offset(), (-dx, -dy));
            assert_eq!(direction.reverse().reverse(), direction);
        }
    }

    #[test]
    fn between_recognises_adjacent_cells_only() {
        let origin = GridPosition::new(3, 3);
        for direction in Direction::ALL {
            assert_eq!(
                Direction::between(origin, origin.step(direction)),
                Some(direction)
            );
        }
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, GridPosition::new(4, 4)), None);
    }

    #[test]
    fn directions_parse_case_insensitively() {
        assert_eq!("Down".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!(" left ".parse::<Direction>(), Ok(Direction::Left));
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn grid_size_rejects_positions_outside_bounds() {
        let size = GridSize::new(10, 8);
        assert!(size.contains(GridPosition::new(0, 0)));
        assert!(size.contains(GridPosition::new(9, 7)));
        assert!(!size.contains(GridPosition::new(10, 7)));
        assert!(!size.contains(GridPosition::new(9, 8)));
        assert!(!size.contains(GridPosition::new(-1, 0)));
        assert!(!size.contains(GridPosition::new(0, 0).step(Direction::Up)));
        assert_eq!(size.index(GridPosition::new(2, 1)), Some(12));
        assert_eq!(size.positions().count(), size.cell_count());
    }

    #[test]
    fn geometry_floor_divides_pixels() {
        let geometry = GridGeometry::new(20).expect("positive pitch");
        assert_eq!(geometry.cell_at(0, 0), GridPosition::new(0, 0));
        assert_eq!(geometry.cell_at(19, 39), GridPosition::new(0, 1));
        assert_eq!(geometry.cell_at(109, 60), GridPosition::new(5, 3));
        assert_eq!(geometry.cell_origin(GridPosition::new(5, 3)), Some((100, 60)));
        assert_eq!(geometry.cell_origin(GridPosition::new(-1, 3)), None);
        assert_eq!(geometry.size_for(800, 575), GridSize::new(40, 28));
    }

    #[test]
    fn geometry_rejects_zero_pitch() {
        assert_eq!(GridGeometry::new(0), Err(GeometryError::ZeroPitch));
    }
    #[test]
    fn capture_error_keeps_the_platform_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "screen locked");
        let error = CaptureError::with_source("monitor capture failed", cause);

        assert_eq!(error.to_string(), "frame capture failed: monitor capture failed");
        let source = error.source().expect("cause is kept");
        assert_eq!(source.to_string(), "screen locked");
        assert!(CaptureError::new("script is empty").source().is_none());
    }

    #[test]
    fn dispatch_error_names_the_key() {
        let error = DispatchError::new(Key::Direction(Direction::Left), "device busy");
        assert_eq!(error.to_string(), "key dispatch failed for `left`: device busy");
    }
}
