//! NetCDF export of acceleration datasets.
//!
//! Files are NetCDF classic with 64-bit offsets. Missing floating point
//! values are stored as the NetCDF default fill ([`F64_FILL`]) and declared
//! as `_FillValue`; missing storage ids are `-1`.
//!
//! # Example
//!
//! ```no_run
//! use sfy_core::netcdf::{read_netcdf, write_netcdf};
//! # fn example(ts: &sfy_core::AxlTimeseries) -> sfy_core::Result<()> {
//! write_netcdf(ts, "wavebug01.nc")?;
//! let back = read_netcdf("wavebug01.nc")?;
//! assert_eq!(back.time().len(), ts.time().len());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use netcdf3::{DataSet, FileReader, FileWriter, Version};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::timeseries::{
    AttrValue, AxlTimeseries, DatasetAttrs, RESERVED_ATTRIBUTES, VARIABLES, VarType,
};

/// Axes of a dataset, in file order.
pub const DIMENSIONS: [&str; 3] = ["time", "position_time", "received"];

const STORAGE_ID_FILL: i32 = -1;

/// Fill value of nullable `f64` variables (`NC_FILL_DOUBLE`).
pub const F64_FILL: f64 = 9.969_209_968_386_869e36;

/// Fill value of nullable `f32` variables (`NC_FILL_FLOAT`).
pub const F32_FILL: f32 = 9.969_21e36;

fn nc_err<E: std::fmt::Debug>(e: E) -> Error {
    Error::NetCdf(format!("{e:?}"))
}

/// Write a dataset to `path`.
///
/// The file is written next to `path` and moved into place once complete,
/// so a failed export never leaves a partial file behind.
///
/// # Errors
///
/// Returns [`Error::EmptyDimension`] if any axis is empty, since classic
/// NetCDF cannot store zero-length fixed dimensions. Encoding and I/O
/// failures are returned as [`Error::NetCdf`] and [`Error::Io`].
pub fn write_netcdf(ts: &AxlTimeseries, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    for dim in DIMENSIONS {
        if ts.dimension_len(dim) == 0 {
            return Err(Error::EmptyDimension(dim));
        }
    }

    let storage_id = ts
        .storage_id()
        .iter()
        .map(|id| match id {
            Some(id) => i32::try_from(*id)
                .map_err(|_| Error::NetCdf(format!("storage id {id} does not fit in i32"))),
            None => Ok(STORAGE_ID_FILL),
        })
        .collect::<Result<Vec<i32>>>()?;

    let data_set = define(ts)?;

    let tmp = tmp_path(path);
    debug!("Writing {} via {}", path.display(), tmp.display());
    if let Err(e) = write_file(ts, &data_set, &storage_id, &tmp) {
        if let Err(rm) = std::fs::remove_file(&tmp) {
            warn!("Could not remove {}: {}", tmp.display(), rm);
        }
        return Err(e);
    }
    std::fs::rename(&tmp, path)?;

    info!(
        "Wrote {} samples, {} packets to {}",
        ts.time().len(),
        ts.received().len(),
        path.display()
    );
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

fn define(ts: &AxlTimeseries) -> Result<DataSet> {
    let mut ds = DataSet::new();

    for dim in DIMENSIONS {
        ds.add_fixed_dim(dim, ts.dimension_len(dim)).map_err(nc_err)?;
    }

    for var in VARIABLES {
        match var.var_type {
            VarType::F32 => ds.add_var_f32(var.name, &[var.dimension]),
            VarType::F64 => ds.add_var_f64(var.name, &[var.dimension]),
            VarType::I32 => ds.add_var_i32(var.name, &[var.dimension]),
        }
        .map_err(nc_err)?;

        for (key, value) in var.attrs {
            ds.add_var_attr_string(var.name, key, value)
                .map_err(nc_err)?;
        }

        if var.nullable {
            match var.var_type {
                // attributes must be finite: the writer looks variables up by equality
                VarType::F64 => ds.add_var_attr_f64(var.name, "_FillValue", vec![F64_FILL]),
                VarType::F32 => ds.add_var_attr_f32(var.name, "_FillValue", vec![F32_FILL]),
                VarType::I32 => {
                    ds.add_var_attr_i32(var.name, "_FillValue", vec![STORAGE_ID_FILL])
                }
            }
            .map_err(nc_err)?;
        }
    }

    for (key, value) in ts.attrs().to_pairs() {
        match value {
            AttrValue::Number(n) => ds.add_global_attr_f64(&key, vec![n]),
            AttrValue::Text(s) => ds.add_global_attr_string(&key, &s),
        }
        .map_err(nc_err)?;
    }

    Ok(ds)
}

fn write_file(ts: &AxlTimeseries, ds: &DataSet, storage_id: &[i32], path: &Path) -> Result<()> {
    let nullable =
        |v: &[Option<f64>]| -> Vec<f64> { v.iter().map(|x| x.unwrap_or(F64_FILL)).collect() };

    let mut writer = FileWriter::open(path).map_err(nc_err)?;
    writer
        .set_def(ds, Version::Offset64Bit, 0)
        .map_err(nc_err)?;

    writer.write_var_f64("time", ts.time()).map_err(nc_err)?;
    writer
        .write_var_f64("position_time", &nullable(ts.position_time()))
        .map_err(nc_err)?;
    writer
        .write_var_f64("received", ts.received())
        .map_err(nc_err)?;
    writer.write_var_f32("w_z", ts.w_z()).map_err(nc_err)?;
    writer.write_var_f32("w_x", ts.w_x()).map_err(nc_err)?;
    writer.write_var_f32("w_y", ts.w_y()).map_err(nc_err)?;
    writer
        .write_var_f64("lon", &nullable(ts.lon()))
        .map_err(nc_err)?;
    writer
        .write_var_f64("lat", &nullable(ts.lat()))
        .map_err(nc_err)?;
    writer
        .write_var_f64("package_start", &nullable(ts.package_start()))
        .map_err(nc_err)?;
    writer.write_var_f64("added", ts.added()).map_err(nc_err)?;
    writer
        .write_var_i32("storage_id", storage_id)
        .map_err(nc_err)?;

    writer.close().map_err(nc_err)?;
    Ok(())
}

/// Read a dataset written by [`write_netcdf`].
///
/// # Errors
///
/// Returns [`Error::NetCdf`] if the file cannot be decoded or lacks a
/// variable or global attribute, and [`Error::DimensionMismatch`] if its
/// variables do not line up.
pub fn read_netcdf(path: impl AsRef<Path>) -> Result<AxlTimeseries> {
    let path = path.as_ref();
    let mut reader = FileReader::open(path).map_err(nc_err)?;

    let attrs = read_attrs(reader.data_set())?;

    let mut f64_var = |name: &str| reader.read_var_f64(name).map_err(nc_err);
    let time = f64_var("time")?;
    let position_time = f64_var("position_time")?;
    let received = f64_var("received")?;
    let lon = f64_var("lon")?;
    let lat = f64_var("lat")?;
    let package_start = f64_var("package_start")?;
    let added = f64_var("added")?;

    let w_x = reader.read_var_f32("w_x").map_err(nc_err)?;
    let w_y = reader.read_var_f32("w_y").map_err(nc_err)?;
    let w_z = reader.read_var_f32("w_z").map_err(nc_err)?;
    let storage_id = reader
        .read_var_i32("storage_id")
        .map_err(nc_err)?
        .into_iter()
        .map(|id| u32::try_from(id).ok())
        .collect();

    let nullable = |v: Vec<f64>| -> Vec<Option<f64>> {
        v.into_iter()
            .map(|x| (x != F64_FILL && !x.is_nan()).then_some(x))
            .collect()
    };

    debug!("Read {} samples from {}", time.len(), path.display());

    AxlTimeseries::from_stored(
        attrs,
        time,
        (w_x, w_y, w_z),
        (nullable(position_time), nullable(lon), nullable(lat)),
        received,
        nullable(package_start),
        added,
        storage_id,
    )
}

fn read_attrs(ds: &DataSet) -> Result<DatasetAttrs> {
    let number = |key: &str| {
        ds.get_global_attr_f64(key)
            .and_then(|v| v.first().copied())
            .ok_or_else(|| Error::NetCdf(format!("missing global attribute '{key}'")))
    };
    let text = |key: &str| {
        ds.get_global_attr_as_string(key)
            .ok_or_else(|| Error::NetCdf(format!("missing global attribute '{key}'")))
    };

    let extra = ds
        .get_global_attrs()
        .into_iter()
        .filter(|a| !RESERVED_ATTRIBUTES.contains(&a.name()))
        .filter_map(|a| a.get_as_string().map(|v| (a.name().to_string(), v)))
        .collect();

    Ok(DatasetAttrs {
        frequency: number("frequency")?,
        dt: number("dt")?,
        buoy_device: text("buoy_device")?,
        buoy_name: text("buoy_name")?,
        extra,
    })
}
