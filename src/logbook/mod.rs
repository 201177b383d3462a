//! Lift and passenger logbooks
//!
//! This module turns parsed sections into typed per-run tables and derives the
//! per-row annotations the timeline stage needs.
//!
//! - **run_tables**: groups log entries by simulation and run, and extracts the
//!   one lift table and one passenger table every usable run must have
//! - **lift**: lift movement rows and motion-state labelling
//! - **passenger**: passenger rows and wait/transit/travel KPIs

pub mod lift;
pub mod passenger;
pub mod run_tables;

pub use lift::*;
pub use passenger::*;
pub use run_tables::*;

/// Parse a finite number from a logged field
pub(crate) fn parse_number(name: &str, raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("Invalid {}: {:?}", name, raw)),
    }
}

/// Reject rows whose width does not match the category schema
pub(crate) fn check_width(fields: &[String], schema: &[&str]) -> Result<(), String> {
    if fields.len() != schema.len() {
        return Err(format!(
            "Expected {} fields, found {}",
            schema.len(),
            fields.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("time", " 4.25 ").unwrap(), 4.25);
        assert!(parse_number("time", "NaN").is_err());
        assert!(parse_number("time", "inf").is_err());
        assert!(parse_number("time", "").is_err());
    }

    #[test]
    fn test_check_width() {
        let fields = vec!["a".to_string(), "b".to_string()];
        assert!(check_width(&fields, &["x", "y"]).is_ok());
        assert!(check_width(&fields, &["x"]).is_err());
    }
}
