/// Quality filter for one week partition of trips.
///
/// Three stages run in a fixed order, each on the output of the previous one:
/// derived-time, stop identifiers, then distance imputation and validation.
/// The derived time and distance sums stay in the output frame; the parsed
/// distance floats only ever live inside the stage-3 predicate.
use polars::prelude::*;

use crate::error::{LakeError, Result};
use crate::schema::{derived, distance, stops, timing, REQUIRED};

/// Row counts recorded while a partition goes through the filter stages.
///
/// Report labels: `n_inicial`, `n_filtrados_tiempo`, `n_filtrados_paraderos`,
/// `n_filtrados_dist`, `n_final`, `pct_retenido`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub initial: usize,
    pub removed_by_time: usize,
    pub removed_by_stops: usize,
    pub removed_by_distance: usize,
    pub retained: usize,
}

impl FilterStats {
    pub fn after_time(&self) -> usize {
        self.initial - self.removed_by_time
    }

    pub fn after_stops(&self) -> usize {
        self.after_time() - self.removed_by_stops
    }

    /// Share of the initial rows that survived every stage, in percent.
    /// Zero for an empty partition.
    pub fn retained_pct(&self) -> f64 {
        if self.initial == 0 {
            0.0
        } else {
            self.retained as f64 / self.initial as f64 * 100.0
        }
    }

    /// Add another partition's counters to this one.
    pub fn absorb(&mut self, other: &FilterStats) {
        self.initial += other.initial;
        self.removed_by_time += other.removed_by_time;
        self.removed_by_stops += other.removed_by_stops;
        self.removed_by_distance += other.removed_by_distance;
        self.retained += other.retained;
    }
}

// ── Expressions ─────────────────────────────────────────────────────────────

/// Sum of the given integer columns with nulls counted as zero.
fn null_safe_sum(columns: &[&str]) -> Expr {
    columns
        .iter()
        .fold(lit(0i64), |acc, name| acc + col(*name).fill_null(lit(0i64)))
}

/// Lenient float parse: anything that does not parse becomes null.
fn parsed_float(column: &str) -> Expr {
    col(column).cast(DataType::Float64)
}

fn present_and_positive(expr: Expr) -> Expr {
    expr.clone().is_not_null().and(expr.gt(lit(0)))
}

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(LakeError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

// ── Stages ──────────────────────────────────────────────────────────────────

fn time_stage(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .with_columns([
            null_safe_sum(&timing::VEHICLE).alias(derived::T_VEHICULO_TOTAL_SEG),
            null_safe_sum(&timing::TOTAL).alias(derived::T_TOTAL_CALCULADO_SEG),
            null_safe_sum(&distance::VEHICLE_EUCLIDEAN).alias(derived::D_VEHICULO_EUCL_TOTAL_M),
        ])
        .filter(
            col(derived::T_VEHICULO_TOTAL_SEG)
                .gt(lit(0))
                .and(col(derived::T_TOTAL_CALCULADO_SEG).gt(lit(0))),
        )
        .collect()
}

fn stop_stage(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .filter(
            col(stops::PARADERO_INICIO_VIAJE)
                .is_not_null()
                .and(col(stops::PARADERO_FIN_VIAJE).is_not_null()),
        )
        .collect()
}

fn distance_stage(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .with_column(
            when(col(distance::DVEH_EUCFINAL).is_null())
                .then(col(derived::D_VEHICULO_EUCL_TOTAL_M))
                .otherwise(col(distance::DVEH_EUCFINAL))
                .alias(distance::DVEH_EUCFINAL),
        )
        .filter(
            present_and_positive(parsed_float(distance::DISTANCIA_RUTA))
                .and(present_and_positive(parsed_float(distance::DISTANCIA_EUCL)))
                .and(present_and_positive(col(distance::DVEH_EUCFINAL))),
        )
        .collect()
}

/// Run all filter stages over a partition.
///
/// Takes the frame by value: each intermediate is consumed by the next stage,
/// so at most two copies of the partition are alive at any time.
pub fn apply_filters(df: DataFrame) -> Result<(DataFrame, FilterStats)> {
    require_columns(&df, &REQUIRED)?;
    let initial = df.height();

    let df = time_stage(df)?;
    let after_time = df.height();

    let df = stop_stage(df)?;
    let after_stops = df.height();

    let df = distance_stage(df)?;
    let retained = df.height();

    let stats = FilterStats {
        initial,
        removed_by_time: initial - after_time,
        removed_by_stops: after_time - after_stops,
        removed_by_distance: after_stops - retained,
        retained,
    };

    Ok((df, stats))
}
