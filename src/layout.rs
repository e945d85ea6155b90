//! Pitch geometry: maps a formation to normalized icon coordinates.
//!
//! Coordinates are percentages on a 100x100 pitch with (0, 0) at the top
//! left, goalkeeper end up. The renderer scales them into whatever `Rect`
//! the pitch panel was given.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, anyhow};

pub const PITCH_WIDTH: f32 = 100.0;
pub const PITCH_HEIGHT: f32 = 100.0;

const KEEPER_TOP: f32 = 10.0;
const DEFENDER_TOP: f32 = 30.0;
const MIDFIELDER_TOP: f32 = 50.0;
const FORWARD_TOP: f32 = 70.0;

/// One icon slot on the pitch, in percent of the pitch area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchSpot {
    pub left: f32,
    pub top: f32,
}

/// Outfield player distribution, e.g. 4-4-2. The goalkeeper is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formation {
    pub defenders: u8,
    pub midfielders: u8,
    pub forwards: u8,
}

/// Legal fantasy formations offered by the form, backend default first.
pub const FORMATION_PRESETS: [Formation; 8] = [
    Formation::new(3, 4, 3),
    Formation::new(3, 5, 2),
    Formation::new(4, 3, 3),
    Formation::new(4, 4, 2),
    Formation::new(4, 5, 1),
    Formation::new(5, 2, 3),
    Formation::new(5, 3, 2),
    Formation::new(5, 4, 1),
];

impl Formation {
    pub const fn new(defenders: u8, midfielders: u8, forwards: u8) -> Self {
        Self {
            defenders,
            midfielders,
            forwards,
        }
    }

    pub fn outfield(&self) -> u8 {
        self.defenders + self.midfielders + self.forwards
    }

    pub fn is_valid_eleven(&self) -> bool {
        self.outfield() == 10
    }

    /// Icon coordinates, goalkeeper first, then defenders, midfielders and
    /// forwards in row order. Each row splits the pitch width into
    /// (count + 1) segments; player i sits at segment boundary i.
    ///
    /// Does not validate that the counts describe an eleven. The caller is
    /// expected to zip these against its player list, so surplus players
    /// simply never get a slot.
    pub fn positions(&self) -> Vec<PitchSpot> {
        let mut spots = Vec::with_capacity(1 + self.outfield() as usize);
        spots.push(PitchSpot {
            left: PITCH_WIDTH / 2.0,
            top: KEEPER_TOP,
        });
        push_row(&mut spots, self.defenders, DEFENDER_TOP);
        push_row(&mut spots, self.midfielders, MIDFIELDER_TOP);
        push_row(&mut spots, self.forwards, FORWARD_TOP);
        spots
    }

    pub fn next_preset(&self) -> Formation {
        cycle_preset(self, 1)
    }

    pub fn prev_preset(&self) -> Formation {
        cycle_preset(self, FORMATION_PRESETS.len() - 1)
    }
}

fn push_row(spots: &mut Vec<PitchSpot>, count: u8, top: f32) {
    let spacing = PITCH_WIDTH / (count as f32 + 1.0);
    for i in 1..=count {
        spots.push(PitchSpot {
            left: i as f32 * spacing,
            top,
        });
    }
}

fn cycle_preset(current: &Formation, step: usize) -> Formation {
    let idx = FORMATION_PRESETS
        .iter()
        .position(|preset| preset == current)
        .unwrap_or(0);
    FORMATION_PRESETS[(idx + step) % FORMATION_PRESETS.len()]
}

impl Default for Formation {
    fn default() -> Self {
        FORMATION_PRESETS[0]
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.defenders, self.midfielders, self.forwards
        )
    }
}

impl FromStr for Formation {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut counts = [0u8; 3];
        let mut parts = raw.trim().split('-');
        for slot in &mut counts {
            let part = parts
                .next()
                .ok_or_else(|| anyhow!("formation {raw:?} needs three dash-separated counts"))?;
            *slot = part
                .trim()
                .parse::<u8>()
                .with_context(|| format!("invalid count {part:?} in formation {raw:?}"))?;
        }
        if parts.next().is_some() {
            return Err(anyhow!("formation {raw:?} has more than three counts"));
        }
        Ok(Formation::new(counts[0], counts[1], counts[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_four_two_matches_expected_geometry() {
        let spots = Formation::new(4, 4, 2).positions();
        assert_eq!(spots.len(), 11);
        assert_eq!(spots[0], PitchSpot { left: 50.0, top: 10.0 });

        for (i, spot) in spots[1..5].iter().enumerate() {
            assert_eq!(spot.top, 30.0);
            assert!((spot.left - 20.0 * (i + 1) as f32).abs() < 1e-4);
        }
        for (i, spot) in spots[5..9].iter().enumerate() {
            assert_eq!(spot.top, 50.0);
            assert!((spot.left - 20.0 * (i + 1) as f32).abs() < 1e-4);
        }
        assert_eq!(spots[9].top, 70.0);
        assert!((spots[9].left - 100.0 / 3.0).abs() < 1e-3);
        assert!((spots[10].left - 200.0 / 3.0).abs() < 1e-3);
    }

    #[test]
    fn row_lefts_increase_and_stay_inside_the_pitch() {
        let cases = [
            Formation::new(5, 4, 1),
            Formation::new(3, 5, 2),
            Formation::new(0, 10, 0),
            Formation::new(1, 0, 9),
        ];
        for formation in cases {
            let spots = formation.positions();
            assert_eq!(spots.len(), 1 + formation.outfield() as usize);

            let mut offset = 1;
            for count in [
                formation.defenders,
                formation.midfielders,
                formation.forwards,
            ] {
                let row = &spots[offset..offset + count as usize];
                for pair in row.windows(2) {
                    assert!(pair[0].left < pair[1].left);
                }
                for spot in row {
                    assert!(spot.left > 0.0 && spot.left < 100.0);
                }
                offset += count as usize;
            }
        }
    }

    #[test]
    fn positions_do_not_validate_the_sum() {
        // A short row set still produces coordinates; the caller's zip
        // decides which players get drawn.
        let spots = Formation::new(2, 2, 1).positions();
        assert_eq!(spots.len(), 6);
    }

    #[test]
    fn parses_and_displays_formation_strings() {
        let formation: Formation = "4-4-2".parse().expect("valid formation should parse");
        assert_eq!(formation, Formation::new(4, 4, 2));
        assert_eq!(formation.to_string(), "4-4-2");
        assert!(formation.is_valid_eleven());

        assert!("4-4".parse::<Formation>().is_err());
        assert!("4-4-2-1".parse::<Formation>().is_err());
        assert!("a-b-c".parse::<Formation>().is_err());
    }

    #[test]
    fn presets_cycle_in_both_directions() {
        let start = FORMATION_PRESETS[0];
        assert_eq!(start.next_preset(), FORMATION_PRESETS[1]);
        assert_eq!(FORMATION_PRESETS[1].prev_preset(), start);
        assert_eq!(
            FORMATION_PRESETS[FORMATION_PRESETS.len() - 1].next_preset(),
            start
        );
        // Unknown formations fall back to the head of the list.
        assert_eq!(
            Formation::new(2, 2, 6).next_preset(),
            FORMATION_PRESETS[1]
        );
    }
}
