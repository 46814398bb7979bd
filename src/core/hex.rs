//! Cube-coordinate hex positions
//!
//! Board spaces are addressed with cube coordinates `(q, r, s)` where
//! `q + r + s == 0`. The wire form is `"q,r,s"`.

use crate::{EngineError, Result};
use nom::{
    character::complete::{char, i32 as signed, space0},
    combinator::all_consuming,
    sequence::{delimited, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexPosition {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

/// The six cube directions, clockwise from east-north-east
const DIRECTIONS: [(i32, i32, i32); 6] = [
    (1, -1, 0),
    (1, 0, -1),
    (0, 1, -1),
    (-1, 1, 0),
    (-1, 0, 1),
    (0, -1, 1),
];

impl HexPosition {
    pub fn new(q: i32, r: i32, s: i32) -> Self {
        HexPosition { q, r, s }
    }

    /// Build from axial coordinates, deriving `s`
    pub fn from_axial(q: i32, r: i32) -> Self {
        HexPosition { q, r, s: -q - r }
    }

    pub fn is_valid(&self) -> bool {
        self.q + self.r + self.s == 0
    }

    pub fn neighbors(&self) -> [HexPosition; 6] {
        DIRECTIONS.map(|(dq, dr, ds)| HexPosition::new(self.q + dq, self.r + dr, self.s + ds))
    }

    pub fn is_adjacent(&self, other: &HexPosition) -> bool {
        self.neighbors().contains(other)
    }
}

impl fmt::Display for HexPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.q, self.r, self.s)
    }
}

fn coordinate(input: &str) -> IResult<&str, i32> {
    delimited(space0, signed, space0)(input)
}

fn cube(input: &str) -> IResult<&str, (i32, i32, i32)> {
    let (input, (q, _, r, _, s)) =
        tuple((coordinate, char(','), coordinate, char(','), coordinate))(input)?;
    Ok((input, (q, r, s)))
}

impl FromStr for HexPosition {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let (_, (q, r, s_coord)) = all_consuming(cube)(s)
            .map_err(|e| EngineError::ParseError(format!("invalid hex '{s}': {e}")))?;

        let position = HexPosition::new(q, r, s_coord);
        if !position.is_valid() {
            return Err(EngineError::ParseError(format!(
                "invalid cube coordinates '{s}': q+r+s must equal 0"
            )));
        }
        Ok(position)
    }
}
