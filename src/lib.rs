pub mod error;
pub mod geometry;
pub mod spatial_database;
pub mod variography;

pub mod prelude {

    pub mod re_exports {
        pub use nalgebra;
        pub use ndarray;
    }

    pub use crate::error::{Result, VariogramError};
    pub use crate::geometry::{variogram_tolerance::DirectionalProjector, LagTolerance};
    pub use crate::spatial_database::{feature_table::FeatureTable, PointDataset, Sample};
    pub use crate::variography::{
        binning::{DirectionalRow, DirectionalVariogram, VariogramBin},
        config::VariogramConfig,
        engine::VariogramEngine,
        export::{write_directional, write_map, write_omni},
        map::{VariogramMap, VariogramMapCell},
    };
}
