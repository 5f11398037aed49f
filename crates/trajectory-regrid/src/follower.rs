//! Following a trajectory through a forecast.
//!
//! [`TrajectoryFollower`] drives the whole procedure. On the first lead time
//! it builds a fixed-size window around the trajectory (unless a grid was
//! supplied) and records the window's reference centre. Every lead time the
//! window is moved to the current trajectory position, always starting from
//! the untranslated window, and the forecast fields are regridded onto it.
//!
//! ```text
//! Initializing ──first step──► Steady { translator } ──exhausted/error──► Finished
//! ```
//!
//! The follower is an [`Iterator`]: each `next()` reads one lead time from
//! the forecast source and yields one [`RegriddedFrame`]. Any error ends the
//! sequence.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use field_common::{
    lead_hours, CoordAxis, Field, FieldCollection, FieldError, ForecastSource, ForecastStep, Grid,
};

use crate::builder::GridBuilder;
use crate::config::RegridConfig;
use crate::error::{RegridError, Result};
use crate::regrid::ConservativeRegridder;
use crate::trajectory::Trajectory;
use crate::translate::GridTranslator;

/// How the moving window is defined.
#[derive(Debug, Clone)]
pub enum Window {
    /// Build the window on the first lead time from a circle of this
    /// diameter (km) around the trajectory position.
    Diameter(f64),
    /// Use this grid; its coordinate centroid is the reference centre.
    Grid(Grid),
}

/// The regridded fields of one forecast lead time.
#[derive(Debug, Clone)]
pub struct RegriddedFrame {
    pub valid_time: DateTime<Utc>,
    pub lead_time: Duration,
    /// The translated window the fields were regridded onto.
    pub grid: Grid,
    pub fields: FieldCollection,
}

impl RegriddedFrame {
    /// Whole hours since the forecast start.
    pub fn lead_hours(&self) -> i64 {
        lead_hours(self.lead_time)
    }
}

enum State {
    Initializing { diameter_km: f64 },
    Steady { translator: GridTranslator },
    Finished,
}

/// Lazily regrids each forecast lead time onto a window following a
/// trajectory.
pub struct TrajectoryFollower<S: ForecastSource> {
    forecast: S,
    trajectory: Trajectory,
    builder: GridBuilder,
    regridder: ConservativeRegridder,
    reference_field: String,
    state: State,
    frames: usize,
}

impl<S: ForecastSource> TrajectoryFollower<S> {
    pub fn new(
        forecast: S,
        trajectory: Trajectory,
        window: Window,
        config: &RegridConfig,
    ) -> Result<Self> {
        config.validate().map_err(RegridError::config)?;

        let state = match window {
            Window::Diameter(diameter_km) => {
                if !(diameter_km > 0.0) {
                    return Err(RegridError::config(format!(
                        "window diameter must be positive, got {}",
                        diameter_km
                    )));
                }
                State::Initializing { diameter_km }
            }
            Window::Grid(grid) => {
                let center = grid.centroid();
                debug!(
                    x0 = center.0,
                    y0 = center.1,
                    ny = grid.shape().0,
                    nx = grid.shape().1,
                    "Using supplied window grid"
                );
                State::Steady {
                    translator: GridTranslator::new(&grid, center)?,
                }
            }
        };

        Ok(Self {
            forecast,
            trajectory,
            builder: GridBuilder::from_config(config),
            regridder: ConservativeRegridder::from_config(config),
            reference_field: config.reference_field.clone(),
            state,
            frames: 0,
        })
    }

    /// The forecast source being followed.
    pub fn forecast(&self) -> &S {
        &self.forecast
    }

    /// The untranslated window, once it exists.
    pub fn base_grid(&self) -> Option<&Grid> {
        match &self.state {
            State::Steady { translator } => Some(translator.base()),
            _ => None,
        }
    }

    /// Number of frames produced so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    fn process(&mut self, step: ForecastStep) -> Result<RegriddedFrame> {
        let position = self.trajectory.position_at(step.valid_time)?;

        if let State::Initializing { diameter_km } = self.state {
            let large_grid = self.reference_grid(&step.fields)?;
            let window =
                self.builder
                    .build(large_grid, position.0, position.1, diameter_km)?;
            info!(
                field = %large_grid.name(),
                x0 = position.0,
                y0 = position.1,
                diameter_km,
                ny = window.shape().0,
                nx = window.shape().1,
                "Built window around trajectory start"
            );
            self.state = State::Steady {
                translator: GridTranslator::new(&window, position)?,
            };
        }

        let State::Steady { translator } = &self.state else {
            return Err(RegridError::config("trajectory follower already finished"));
        };

        let (dx, dy) = translator.offset(position);
        let grid = translator.translate_to(position)?;
        let fields = self.regridder.regrid(&step.fields, &grid)?;

        info!(
            valid_time = %step.valid_time,
            lead_hours = step.lead_hours(),
            lon = position.0,
            lat = position.1,
            dx,
            dy,
            fields = fields.len(),
            "Regridded lead time"
        );

        Ok(RegriddedFrame {
            valid_time: step.valid_time,
            lead_time: step.lead_time,
            grid,
            fields,
        })
    }

    /// The configured reference field, or the first field with both
    /// horizontal coordinates.
    fn reference_grid<'a>(&self, fields: &'a FieldCollection) -> Result<&'a Field> {
        if let Some(field) = fields.get(&self.reference_field) {
            return Ok(field);
        }
        let fallback = fields.iter().find(|f| {
            f.ndim() > 1
                && f.coord_by_axis(CoordAxis::X).is_some()
                && f.coord_by_axis(CoordAxis::Y).is_some()
        });
        match fallback {
            Some(field) => {
                debug!(
                    wanted = %self.reference_field,
                    using = %field.name(),
                    "Reference field missing; using first horizontal field"
                );
                Ok(field)
            }
            None => Err(FieldError::FieldNotFound(self.reference_field.clone()).into()),
        }
    }
}

impl<S: ForecastSource> Iterator for TrajectoryFollower<S> {
    type Item = Result<RegriddedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, State::Finished) {
            return None;
        }

        let step = match self.forecast.next_step() {
            None => {
                debug!(frames = self.frames, "Forecast exhausted");
                self.state = State::Finished;
                return None;
            }
            Some(Err(err)) => {
                self.state = State::Finished;
                return Some(Err(RegridError::forecast(err)));
            }
            Some(Ok(step)) => step,
        };

        match self.process(step) {
            Ok(frame) => {
                self.frames += 1;
                Some(Ok(frame))
            }
            Err(err) => {
                self.state = State::Finished;
                Some(Err(err))
            }
        }
    }
}
