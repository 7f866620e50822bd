/// Column-name constants for the trip lake.
/// Single source of truth for the filter, the worker and the tests.

// ── Trip timing columns (seconds) ───────────────────────────────────────────
pub mod timing {
    pub const TV1: &str = "tv1";
    pub const TV2: &str = "tv2";
    pub const TV3: &str = "tv3";
    pub const TV4: &str = "tv4";
    pub const TC1: &str = "tc1";
    pub const TC2: &str = "tc2";
    pub const TC3: &str = "tc3";
    pub const TE0: &str = "te0";
    pub const TE1: &str = "te1";
    pub const TE2: &str = "te2";
    pub const TE3: &str = "te3";

    /// In-vehicle legs.
    pub const VEHICLE: [&str; 4] = [TV1, TV2, TV3, TV4];

    /// Every leg, transfer and wait component of a trip, in trip order.
    pub const TOTAL: [&str; 11] = [TE0, TV1, TC1, TE1, TV2, TC2, TE2, TV3, TC3, TE3, TV4];
}

// ── Trip distance columns (metres) ──────────────────────────────────────────
pub mod distance {
    pub const DVEH_EUC1: &str = "dveh_euc1";
    pub const DVEH_EUC2: &str = "dveh_euc2";
    pub const DVEH_EUC3: &str = "dveh_euc3";
    pub const DVEH_EUC4: &str = "dveh_euc4";
    pub const DVEH_EUCFINAL: &str = "dveh_eucfinal";
    pub const DISTANCIA_RUTA: &str = "distancia_ruta";
    pub const DISTANCIA_EUCL: &str = "distancia_eucl";

    pub const VEHICLE_EUCLIDEAN: [&str; 4] = [DVEH_EUC1, DVEH_EUC2, DVEH_EUC3, DVEH_EUC4];
}

// ── Stop identifiers ────────────────────────────────────────────────────────
pub mod stops {
    pub const PARADERO_INICIO_VIAJE: &str = "paradero_inicio_viaje";
    pub const PARADERO_FIN_VIAJE: &str = "paradero_fin_viaje";
}

// ── Derived columns added by the quality filter ─────────────────────────────
pub mod derived {
    pub const T_VEHICULO_TOTAL_SEG: &str = "t_vehiculo_total_seg";
    pub const T_TOTAL_CALCULADO_SEG: &str = "t_total_calculado_seg";
    pub const D_VEHICULO_EUCL_TOTAL_M: &str = "d_vehiculo_eucl_total_m";
}

// ── Lake layout ─────────────────────────────────────────────────────────────
pub mod layout {
    pub const YEAR_KEY: &str = "iso_year";
    pub const WEEK_KEY: &str = "iso_week";
    pub const DATA_FILE: &str = "data-0.parquet";
}

/// Columns the quality filter reads. A partition missing any of them fails.
pub const REQUIRED: [&str; 20] = [
    timing::TV1,
    timing::TV2,
    timing::TV3,
    timing::TV4,
    timing::TC1,
    timing::TC2,
    timing::TC3,
    timing::TE0,
    timing::TE1,
    timing::TE2,
    timing::TE3,
    distance::DVEH_EUC1,
    distance::DVEH_EUC2,
    distance::DVEH_EUC3,
    distance::DVEH_EUC4,
    distance::DVEH_EUCFINAL,
    distance::DISTANCIA_RUTA,
    distance::DISTANCIA_EUCL,
    stops::PARADERO_INICIO_VIAJE,
    stops::PARADERO_FIN_VIAJE,
];
