#![allow(dead_code)]

use std::path::Path;

use polars::prelude::*;
use trip_lake::partition::data_file;
use trip_lake::schema::{distance, stops, timing};
use trip_lake::{LocalStorage, OutputCompression, Storage};

/// How a fixture trip should fare in the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trip {
    Valid,
    /// Valid with a null final distance that must be imputed.
    NeedsImputation,
    NoVehicleTime,
    NoDestination,
    BadRouteDistance,
}

pub fn trips_frame(trips: &[Trip]) -> DataFrame {
    let n = trips.len();
    let ints = |name: &str, f: &dyn Fn(Trip) -> Option<i64>| {
        Column::new(name.into(), trips.iter().map(|t| f(*t)).collect::<Vec<_>>())
    };
    let strs = |name: &str, f: &dyn Fn(Trip) -> Option<&'static str>| {
        Column::new(name.into(), trips.iter().map(|t| f(*t)).collect::<Vec<_>>())
    };

    let mut columns = vec![Column::new("id_viaje".into(), (0..n as i64).collect::<Vec<_>>())];
    for name in timing::VEHICLE {
        columns.push(ints(name, &|t| match (t, name) {
            (Trip::NoVehicleTime, _) => None,
            (_, timing::TV1) => Some(540),
            _ => None,
        }));
    }
    for name in timing::TOTAL {
        if timing::VEHICLE.contains(&name) {
            continue;
        }
        columns.push(ints(name, &|_| if name == timing::TE0 { Some(120) } else { None }));
    }
    for name in distance::VEHICLE_EUCLIDEAN {
        columns.push(ints(name, &|_| if name == distance::DVEH_EUC1 { Some(1800) } else { None }));
    }
    columns.push(ints(distance::DVEH_EUCFINAL, &|t| match t {
        Trip::NeedsImputation => None,
        _ => Some(1800),
    }));
    columns.push(strs(distance::DISTANCIA_RUTA, &|t| match t {
        Trip::BadRouteDistance => Some("abc"),
        _ => Some("2300.5"),
    }));
    columns.push(strs(distance::DISTANCIA_EUCL, &|_| Some("1750")));
    columns.push(strs(stops::PARADERO_INICIO_VIAJE, &|_| Some("PA433")));
    columns.push(strs(stops::PARADERO_FIN_VIAJE, &|t| match t {
        Trip::NoDestination => None,
        _ => Some("PJ12"),
    }));

    DataFrame::new(columns).unwrap()
}

/// Write a partition of `trips` under `root` using the lake layout.
pub fn write_partition(root: &Path, year: i32, week: u32, trips: &[Trip]) {
    LocalStorage
        .write_parquet(
            &data_file(root, year, week),
            &mut trips_frame(trips),
            OutputCompression::Snappy,
        )
        .unwrap();
}
