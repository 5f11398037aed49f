//! Column water budget of moisture tracers, split by quantile.
//!
//! Input is a collection of area-mean diagnostics on (time, quantile[, z]).
//! Each budget term `<term>_mean` becomes a per-quantile time series:
//! three-dimensional terms are integrated over the column with the air density
//! and differenced in time, giving the change in column water between outputs;
//! two-dimensional terms (accumulated rain) are negated so that removal of
//! water counts as a negative tendency.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use field_common::{CoordAxis, Field, FieldCollection};

use crate::error::{DiagnosticsError, Result};
use crate::series::{negated, slices_over, time_tendency, time_window};
use crate::vertical::{column_integral, DEFAULT_Z_NAMES};

/// Moisture tracer terms of the column budget.
pub const BUDGET_TERMS: [&str; 4] = [
    "specific_humidity",
    "advection_only_q",
    "boundary_layer_q",
    "stratiform_rainfall_amount",
];

/// Suffix of the area-mean diagnostic for each term.
pub const MEAN_SUFFIX: &str = "_mean";

/// Area-mean air density used to weight column integrals.
pub const DENSITY_FIELD: &str = "air_density_mean";

/// Options for [`column_budget`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetOptions {
    /// Names tried, in order, for the vertical coordinate.
    pub z_names: Vec<String>,
    /// Coordinate the series are split over.
    pub quantile_coord: String,
    /// Inclusive range of time coordinate values to keep.
    pub time_range: Option<(f64, f64)>,
}

impl Default for BudgetOptions {
    fn default() -> Self {
        Self {
            z_names: DEFAULT_Z_NAMES.iter().map(|s| s.to_string()).collect(),
            quantile_coord: "quartile".to_string(),
            time_range: None,
        }
    }
}

/// One term's series for one quantile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileSeries {
    pub quantile: f64,
    pub times: Vec<f64>,
    pub values: Vec<f32>,
}

/// All quantile series of one budget term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermBudget {
    pub term: String,
    /// Whether the series is a column tendency (true) or a negated amount.
    pub column_tendency: bool,
    pub series: Vec<QuantileSeries>,
}

/// Column budget of every requested term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBudget {
    /// Units of the time values, taken from the density field.
    pub time_units: Option<String>,
    pub terms: Vec<TermBudget>,
}

impl ColumnBudget {
    pub fn term(&self, name: &str) -> Option<&TermBudget> {
        self.terms.iter().find(|t| t.term == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Compute the column budget of `terms` from the diagnostics in `collection`.
pub fn column_budget(
    collection: &FieldCollection,
    terms: &[&str],
    options: &BudgetOptions,
) -> Result<ColumnBudget> {
    let z_names: Vec<&str> = options.z_names.iter().map(String::as_str).collect();

    let rho = windowed(collection.extract(DENSITY_FIELD)?, options)?;
    let time_units = rho
        .coord_by_axis(CoordAxis::T)
        .and_then(|(_, t)| t.units())
        .map(str::to_string);

    let terms = terms
        .iter()
        .map(|&term| {
            let name = format!("{}{}", term, MEAN_SUFFIX);
            let field = windowed(collection.extract(&name)?, options)?;

            let column_tendency = field.ndim() == 3;
            let series_field = if column_tendency {
                time_tendency(&column_integral(&field, &rho, &z_names)?)?
            } else {
                negated(&field)?
            };

            let series = quantile_series(&series_field, &options.quantile_coord)?;
            debug!(
                term = %term,
                quantiles = series.len(),
                column_tendency,
                "Computed budget term"
            );

            Ok(TermBudget {
                term: term.to_string(),
                column_tendency,
                series,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(terms = terms.len(), "Computed column budget");
    Ok(ColumnBudget { time_units, terms })
}

fn windowed(field: &Field, options: &BudgetOptions) -> Result<Field> {
    match options.time_range {
        Some((start, end)) => time_window(field, start, end),
        None => Ok(field.clone()),
    }
}

fn quantile_series(field: &Field, quantile_coord: &str) -> Result<Vec<QuantileSeries>> {
    slices_over(field, quantile_coord)?
        .into_iter()
        .map(|(quantile, slice)| {
            if slice.ndim() != 1 {
                return Err(DiagnosticsError::invalid_input(format!(
                    "'{}' should reduce to a time series per {}, got shape {:?}",
                    field.name(),
                    quantile_coord,
                    slice.shape()
                )));
            }
            let (_, t) = slice.require_axis(CoordAxis::T)?;
            Ok(QuantileSeries {
                quantile,
                times: t.points().to_vec(),
                values: slice.data().iter().copied().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_common::DimCoord;
    use ndarray::{ArrayD, IxDyn};

    fn time() -> DimCoord {
        DimCoord::new("time", CoordAxis::T, vec![0.0, 1.0, 2.0])
            .with_units("hours since 2020-02-01")
    }

    fn quartile() -> DimCoord {
        DimCoord::new("quartile", CoordAxis::Other, vec![1.0, 2.0, 3.0, 4.0])
    }

    fn altitude() -> DimCoord {
        DimCoord::new("altitude", CoordAxis::Z, vec![0.0, 10.0])
    }

    fn profile<F: Fn(usize, usize, usize) -> f32>(name: &str, f: F) -> Field {
        let data = ArrayD::from_shape_fn(IxDyn(&[3, 4, 2]), |ix| f(ix[0], ix[1], ix[2]));
        Field::new(name, data, vec![(time(), 0), (quartile(), 1), (altitude(), 2)]).unwrap()
    }

    fn collection() -> FieldCollection {
        let rain = ArrayD::from_shape_fn(IxDyn(&[3, 4]), |ix| ix[0] as f32 * 0.5);
        vec![
            profile("air_density_mean", |_, _, _| 1.0),
            // Two 10 m levels, so column water is 20 * (t + q).
            profile("specific_humidity_mean", |t, q, _| (t + q) as f32),
            Field::new(
                "stratiform_rainfall_amount_mean",
                rain,
                vec![(time(), 0), (quartile(), 1)],
            )
            .unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_three_dimensional_term_is_column_tendency() {
        let budget = column_budget(
            &collection(),
            &["specific_humidity"],
            &BudgetOptions::default(),
        )
        .unwrap();

        let term = budget.term("specific_humidity").unwrap();
        assert!(term.column_tendency);
        assert_eq!(term.series.len(), 4);
        for series in &term.series {
            assert_eq!(series.times, vec![1.0, 2.0]);
            assert_eq!(series.values, vec![20.0, 20.0]);
        }
        assert_eq!(budget.time_units.as_deref(), Some("hours since 2020-02-01"));
    }

    #[test]
    fn test_two_dimensional_term_is_negated() {
        let budget = column_budget(
            &collection(),
            &["stratiform_rainfall_amount"],
            &BudgetOptions::default(),
        )
        .unwrap();

        let term = budget.term("stratiform_rainfall_amount").unwrap();
        assert!(!term.column_tendency);
        assert_eq!(term.series[2].quantile, 3.0);
        assert_eq!(term.series[2].values, vec![-0.0, -0.5, -1.0]);
    }

    #[test]
    fn test_time_range_restricts_series() {
        let options = BudgetOptions {
            time_range: Some((1.0, 2.0)),
            ..Default::default()
        };
        let budget = column_budget(&collection(), &["specific_humidity"], &options).unwrap();
        assert_eq!(budget.terms[0].series[0].times, vec![2.0]);
    }

    #[test]
    fn test_missing_term_is_an_error() {
        let result = column_budget(&collection(), &["boundary_layer_q"], &BudgetOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_budget_json_round_trip() {
        let budget = column_budget(
            &collection(),
            &["specific_humidity", "stratiform_rainfall_amount"],
            &BudgetOptions::default(),
        )
        .unwrap();
        let parsed = ColumnBudget::from_json(&budget.to_json().unwrap()).unwrap();
        assert_eq!(parsed, budget);
    }
}
