use regex::Regex;

use crate::{Error, Result};

pub fn validate_system_name(name: &str) -> Result<()> {
    let rgx = Regex::new(r"^[a-zA-Z0-9_]+$").unwrap();
    if !rgx.is_match(name) {
        Err(Error::Argument(format!(
            "\"{}\". Invalid system name. Must contain only a-Z, 0-9 or _",
            name
        )))
    } else {
        Ok(())
    }
}

pub fn validate_actor_name(name: &str) -> Result<()> {
    let rgx = Regex::new(r"^[[:graph:]]+$").unwrap();
    if !rgx.is_match(name) || name.contains('/') {
        Err(Error::Argument(format!(
            "\"{}\". Invalid actor name. Must be printable and contain no spaces or /",
            name
        )))
    } else {
        Ok(())
    }
}
