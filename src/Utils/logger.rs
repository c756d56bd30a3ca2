use crate::numerical::sampler::{SampledFunction1D, SampledFunction2D};
use chrono::Local;
use csv::Writer;
use log::info;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::io;
use std::path::Path;

/// "debug" | "info" | "warn" | "error" | "off"
pub fn parse_log_level(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// log_<date>_<time>.txt
pub fn default_log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// terminal logger plus an optional file logger; calling it a second time is harmless
/// (the global logger is only set once)
pub fn init_logger(level: &str, log_file: Option<&str>) -> io::Result<()> {
    let level = parse_log_level(level).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("loglevel must be debug, info, warn, error or off, got {}", level),
        )
    })?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(filename) = log_file {
        let file = File::create(filename)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    if CombinedLogger::init(loggers).is_ok() {
        info!("logger started with level {}", level);
    }
    Ok(())
}

/// two columns `x,y`
pub fn save_curve_to_csv<P: AsRef<Path>>(curve: &SampledFunction1D, filename: P) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(["x", "y"])?;
    for (x, y) in curve.x.iter().zip(curve.y.iter()) {
        writer.write_record([x.to_string(), y.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// long format `x,y,z`, one line per grid cell, row by row
pub fn save_surface_to_csv<P: AsRef<Path>>(
    surface: &SampledFunction2D,
    filename: P,
) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(["x", "y", "z"])?;
    for (i, row) in surface.z.row_iter().enumerate() {
        let row_data = row.iter().enumerate().map(|(j, &z)| {
            [
                surface.x[(i, j)].to_string(),
                surface.y[(i, j)].to_string(),
                z.to_string(),
            ]
        });
        for record in row_data {
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_log_level("warn"), Some(LevelFilter::Warn));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_default_log_file_name() {
        let name = default_log_file_name();
        assert!(name.starts_with("log_") && name.ends_with(".txt"));
    }

    #[test]
    fn test_init_logger_rejects_unknown_level() {
        assert!(init_logger("loud", None).is_err());
    }

    #[test]
    fn test_save_curve_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.csv");
        let curve = SampledFunction1D {
            x: vec![0.0, 0.5],
            y: vec![1.0, 2.5],
        };
        save_curve_to_csv(&curve, &path).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap(), vec!["x", "y"]);
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|s| s.to_string()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["0", "1"], vec!["0.5", "2.5"]]);
    }

    #[test]
    fn test_save_surface_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.csv");
        let surface = SampledFunction2D {
            x: DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 1.0]),
            y: DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 1.0, 1.0]),
            z: DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 2.0]),
        };
        save_surface_to_csv(&surface, &path).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[1][0], "1");
        assert_eq!(&rows[1][1], "0");
        assert_eq!(&rows[3][2], "2");
    }
}
