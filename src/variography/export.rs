use std::io;

use crate::error::Result;
use crate::variography::binning::{DirectionalVariogram, VariogramBin};
use crate::variography::map::VariogramMap;

/// Writes `lag_bin,semivariance,n_pairs` rows.
pub fn write_omni<W: io::Write>(writer: W, bins: &[VariogramBin]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bin in bins {
        wtr.serialize(bin)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `azimuth,lag_bin,semivariance,n_pairs` rows, azimuths in the order given.
pub fn write_directional<W: io::Write>(
    writer: W,
    variograms: &[DirectionalVariogram],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in variograms.iter().flat_map(|v| v.rows()) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the reported map cells as `x_lag,y_lag,semivariance,n_pairs` rows.
pub fn write_map<W: io::Write>(writer: W, map: &VariogramMap) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for cell in map.cells() {
        wtr.serialize(cell)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use nalgebra::Point2;

    use super::*;
    use crate::spatial_database::PointDataset;
    use crate::variography::{config::VariogramConfig, engine::VariogramEngine};

    fn engine() -> VariogramEngine {
        let dataset = PointDataset::from_points(
            "p21",
            &[
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(0.0, 3.0),
                Point2::new(2.0, 3.0),
                Point2::new(1.0, 1.0),
            ],
            &[0.2, 0.4, 0.1, 0.9, 0.5],
        )
        .unwrap();
        VariogramEngine::new(&dataset, VariogramConfig::default().with_n_lags(3)).unwrap()
    }

    fn lines(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn omni_table() {
        let mut buf = Vec::new();
        write_omni(&mut buf, &engine().omni()).unwrap();
        let lines = lines(buf);
        assert_eq!(lines[0], "lag_bin,semivariance,n_pairs");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn directional_rows_accumulate() {
        let engine = engine();
        let sweep = engine.azimuthal_sweep(&[0.0, 90.0]).unwrap();
        let mut buf = Vec::new();
        write_directional(&mut buf, &sweep).unwrap();
        let lines = lines(buf);
        assert_eq!(lines[0], "azimuth,lag_bin,semivariance,n_pairs");
        assert_eq!(lines.len(), 1 + 2 * 3);
        assert!(lines[1].starts_with("0.0,"));
        assert!(lines[4].starts_with("90.0,"));
    }

    #[test]
    fn map_table_writes_nan_cells() {
        // a cross of five points: no lag has dx = dy = 0, so the origin cell is empty
        let dataset = PointDataset::from_points(
            "p21",
            &[
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 1.0),
                Point2::new(1.0, 2.0),
                Point2::new(1.0, 0.0),
            ],
            &[0.0, 1.0, 2.0, 5.0, 3.0],
        )
        .unwrap();
        let engine =
            VariogramEngine::new(&dataset, VariogramConfig::default().with_n_lags(3)).unwrap();
        let map = engine.map();
        assert_eq!(map.x_lags(), [-1.0, 0.0, 1.0]);
        assert_eq!(map.y_lags(), [-1.0, 0.0, 1.0]);

        let mut buf = Vec::new();
        write_map(&mut buf, &map).unwrap();
        let lines = lines(buf);
        assert_eq!(lines[0], "x_lag,y_lag,semivariance,n_pairs");
        assert_eq!(lines.len(), 1 + 9);
        // x-major order puts (0, 0) in the middle of the grid
        assert_eq!(lines[5], "0.0,0.0,NaN,0");
    }
}
