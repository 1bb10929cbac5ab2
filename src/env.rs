//! Configuration from environment variables.

/// Environment variable which sets the [`DiagnosticLevel`](crate::DiagnosticLevel).
pub const DIAGNOSTICS_VAR: &str = "BAGSHAPE_DIAGNOSTICS";

/// Environment variable which enables strict rank checks on packed indices.
pub const STRICT_INDICES_VAR: &str = "BAGSHAPE_STRICT_INDICES";

/// Interpret a string value such as "1" or "no" as a boolean.
pub fn str_as_bool(s: &str) -> bool {
    match s {
        "1" | "true" | "t" | "yes" | "y" => true,
        "0" | "false" | "f" | "no" | "n" => false,
        _ => {
            eprintln!("Unrecognized boolean value \"{}\"", s);
            false
        }
    }
}

/// Interpret an optional environment variable value as a boolean flag,
/// returning `default` if it is unset.
pub fn flag_value(value: Option<&str>, default: bool) -> bool {
    value.map(str_as_bool).unwrap_or(default)
}

/// Parse the value of the environment variable `name`, falling back to
/// `default` if it is unset or invalid.
pub fn parse_value<T: std::str::FromStr>(name: &str, value: Option<&str>, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    let Some(value) = value else {
        return default;
    };
    match value.parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("Invalid value for {}: {}", name, err);
            default
        }
    }
}
