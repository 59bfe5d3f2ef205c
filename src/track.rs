use crate::error::GeometryError;
use rand::Rng;
use std::collections::VecDeque;
use std::ops::Range;

/// Shape of the corridor: screen width, half-width of the road, the
/// safety margin kept between the road edge and the screen edge, and the
/// largest row-to-row shift of the center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TrackGeometry {
    pub(crate) width: i32,
    pub(crate) half_width: i32,
    pub(crate) margin: i32,
    pub(crate) step_bound: i32,
}

impl TrackGeometry {
    pub(crate) fn new(
        width: i32,
        half_width: i32,
        margin: i32,
        step_bound: i32,
    ) -> Result<Self, GeometryError> {
        if half_width < 1 {
            return Err(GeometryError::InvalidParameter("half width must be at least 1"));
        }
        if margin < 0 {
            return Err(GeometryError::InvalidParameter("margin cannot be negative"));
        }
        if step_bound < 0 {
            return Err(GeometryError::InvalidParameter("step bound cannot be negative"));
        }
        let required = Self::min_width(half_width, margin);
        if width < required {
            return Err(GeometryError::TooNarrow { width, required });
        }
        Ok(Self {
            width,
            half_width,
            margin,
            step_bound,
        })
    }

    /// Narrowest screen that still leaves one legal center column.
    pub(crate) fn min_width(half_width: i32, margin: i32) -> i32 {
        2 * (half_width + margin) + 1
    }

    /// Half-open range of legal center columns.
    pub(crate) fn center_range(&self) -> Range<i32> {
        let edge = self.half_width + self.margin;
        edge..self.width - edge
    }

    pub(crate) fn clamp_center(&self, c: i32) -> i32 {
        let r = self.center_range();
        c.clamp(r.start, r.end - 1)
    }

    pub(crate) fn mid_center(&self) -> i32 {
        self.clamp_center(self.width / 2)
    }
}

/// Random walk over center columns. Each value is the previous one plus a
/// uniform step in `-step..=step`, clamped (never reflected) into the
/// legal center range on both sides.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BoundedWalk {
    lo: i32,
    hi: i32,
    mid: i32,
    step: i32,
}

impl BoundedWalk {
    pub(crate) fn new(geometry: &TrackGeometry) -> Self {
        let r = geometry.center_range();
        Self {
            lo: r.start,
            hi: r.end - 1,
            mid: geometry.mid_center(),
            step: geometry.step_bound,
        }
    }

    /// `None` means no previous row has been seen yet; the walk then
    /// starts from mid-screen.
    pub(crate) fn apply(&self, prev: Option<i32>, delta: i32) -> i32 {
        let prev = prev.unwrap_or(self.mid);
        prev.saturating_add(delta).clamp(self.lo, self.hi)
    }

    pub(crate) fn next<R: Rng + ?Sized>(&self, prev: Option<i32>, rng: &mut R) -> i32 {
        let delta = if self.step == 0 {
            0
        } else {
            rng.gen_range(-self.step..=self.step)
        };
        self.apply(prev, delta)
    }
}

/// Initial corridor shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Seed {
    Flat(i32),
    Sine {
        center: i32,
        amplitude: f64,
        period: f64,
    },
}

impl Seed {
    /// Gentle S-bend around `center`: five columns of swing every six rows.
    pub(crate) fn curvy(center: i32) -> Self {
        Seed::Sine {
            center,
            amplitude: 5.0,
            period: 6.0,
        }
    }

    fn center_for_row(&self, row: usize) -> i32 {
        match *self {
            Seed::Flat(c) => c,
            Seed::Sine {
                center,
                amplitude,
                period,
            } => {
                let period = if period.abs() < f64::EPSILON { 1.0 } else { period };
                center + (amplitude * (row as f64 / period).sin()) as i32
            }
        }
    }
}

/// Scrolling corridor. Row 0 is the far end (top of the screen); rows
/// move toward higher indices as the road scrolls past the player.
#[derive(Clone, Debug)]
pub(crate) struct RoadTrack {
    geometry: TrackGeometry,
    walk: BoundedWalk,
    centers: VecDeque<i32>,
}

impl RoadTrack {
    pub(crate) fn create(
        rows: i32,
        geometry: TrackGeometry,
        seed: Seed,
    ) -> Result<Self, GeometryError> {
        if rows < 1 {
            return Err(GeometryError::TooShort { rows, required: 1 });
        }
        let mut track = Self {
            geometry,
            walk: BoundedWalk::new(&geometry),
            centers: VecDeque::with_capacity(rows as usize),
        };
        track.centers.resize(rows as usize, geometry.mid_center());
        track.seed(seed);
        Ok(track)
    }

    pub(crate) fn seed(&mut self, seed: Seed) {
        let geometry = self.geometry;
        for (row, c) in self.centers.iter_mut().enumerate() {
            *c = geometry.clamp_center(seed.center_for_row(row));
        }
    }

    pub(crate) fn reseed_flat(&mut self) {
        self.seed(Seed::Flat(self.geometry.mid_center()));
    }

    /// Drops the nearest row, shifts everything one row closer and walks
    /// a new far row from the previous far row.
    pub(crate) fn scroll_and_generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let prev = self.centers.front().copied();
        let next = self.walk.next(prev, rng);
        self.centers.pop_back();
        self.centers.push_front(next);
    }

    /// True when `column` is strictly between the two road edges of `row`.
    /// Rows outside the track read the nearest valid row.
    pub(crate) fn contains(&self, row: i32, column: i32) -> bool {
        let (left, right) = self.edges(row);
        left < column && column < right
    }

    pub(crate) fn center_at(&self, row: i32) -> i32 {
        let last = self.centers.len() as i32 - 1;
        self.centers[row.clamp(0, last) as usize]
    }

    /// Border columns of `row`. Both are off-road.
    pub(crate) fn edges(&self, row: i32) -> (i32, i32) {
        let c = self.center_at(row);
        (c - self.geometry.half_width, c + self.geometry.half_width)
    }

    pub(crate) fn centers(&self) -> impl Iterator<Item = i32> + '_ {
        self.centers.iter().copied()
    }

    pub(crate) fn rows(&self) -> usize {
        self.centers.len()
    }

    pub(crate) fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }
}
