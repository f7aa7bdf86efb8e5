//! Configuration access port.
//!
//! Typed getters return `Ok(None)` for an absent key and a `ConfigInvalid`
//! error for a present value that does not parse.

use crate::domain::error::MomrevError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, MomrevError> {
        self.get_string(section, key)
            .map(|v| {
                v.parse().map_err(|_| {
                    MomrevError::config_invalid(section, key, format!("expected an integer, got '{v}'"))
                })
            })
            .transpose()
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, MomrevError> {
        self.get_string(section, key)
            .map(|v| {
                v.parse::<f64>()
                    .ok()
                    .filter(|x| x.is_finite())
                    .ok_or_else(|| {
                        MomrevError::config_invalid(section, key, format!("expected a number, got '{v}'"))
                    })
            })
            .transpose()
    }

    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, MomrevError> {
        self.get_string(section, key)
            .map(|v| {
                parse_bool(&v).ok_or_else(|| {
                    MomrevError::config_invalid(
                        section,
                        key,
                        format!("expected true/false, yes/no, on/off or 1/0, got '{v}'"),
                    )
                })
            })
            .transpose()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
