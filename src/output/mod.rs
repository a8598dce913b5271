//! Result files written at the end of a run.
//!
//! All files for a run are named after the order date:
//! `deliveries-<date>.json`, `flightpath-<date>.json`, `drone-<date>.geojson`.

pub mod geojson;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{Order, OrderStatus, OrderValidationCode};
use crate::geometry::Coordinate;
use crate::planner::MoveRecord;

pub use geojson::FeatureCollection;

/// One row of the deliveries file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery<'a> {
    pub order_no: &'a str,
    pub order_status: OrderStatus,
    pub order_validation_code: OrderValidationCode,
    pub cost_in_pence: u32,
}

impl<'a> From<&'a Order> for Delivery<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            order_no: &order.order_no,
            order_status: order.order_status,
            order_validation_code: order.order_validation_code,
            cost_in_pence: order.price_total_in_pence,
        }
    }
}

/// Writes the result files for one date into an output directory.
pub struct OutputWriter {
    dir: PathBuf,
    date: NaiveDate,
}

impl OutputWriter {
    /// Create the writer, creating `dir` if it does not exist.
    pub fn new(dir: &Path, date: NaiveDate) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            date,
        })
    }

    pub fn deliveries_path(&self) -> PathBuf {
        self.dir.join(format!("deliveries-{}.json", self.date))
    }

    pub fn flightpath_path(&self) -> PathBuf {
        self.dir.join(format!("flightpath-{}.json", self.date))
    }

    pub fn geojson_path(&self) -> PathBuf {
        self.dir.join(format!("drone-{}.geojson", self.date))
    }

    /// Status of every processed order, delivered or not.
    pub fn write_deliveries(&self, orders: &[Order]) -> Result<PathBuf> {
        let deliveries: Vec<Delivery> = orders.iter().map(Delivery::from).collect();
        let path = self.deliveries_path();
        write_json(&path, &deliveries)?;
        Ok(path)
    }

    /// Every move of every delivered order.
    pub fn write_flightpath(&self, moves: &[MoveRecord]) -> Result<PathBuf> {
        let path = self.flightpath_path();
        write_json(&path, moves)?;
        Ok(path)
    }

    /// The whole day's flight as a single GeoJSON line.
    pub fn write_geojson(&self, waypoints: &[Coordinate]) -> Result<PathBuf> {
        let path = self.geojson_path();
        write_json(&path, &FeatureCollection::from_waypoints(waypoints))?;
        Ok(path)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
