use std::fmt;
use std::fmt::Formatter;
use serde::Deserialize;
use serde_json::{Number, Value};

/// Element ids of all telemetry fields, in display order
pub const FIELD_IDS: [&str; 18] = [
    "pack_voltage",
    "charge_current",
    "discharge_current",
    "pack_current",
    "soc",
    "lowest_cell_voltage",
    "lowest_cell_voltage_num",
    "highest_cell_voltage",
    "highest_cell_voltage_num",
    "lowest_cell_temperature",
    "lowest_cell_temperature_num",
    "highest_cell_temperature",
    "highest_cell_temperature_num",
    "cell_count",
    "cell_communication_error",
    "allowed_to_discharge",
    "allowed_to_charge",
    "timestamp",
];

/// How a field is projected onto its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Rendered as-is
    Value,
    /// Rendered as the yes/no label by truthiness
    Flag,
}

/// A single telemetry value as sent by the server.
///
/// The server sends numbers and booleans while the BMS link is up and the string `"-"`
/// for every field while it is down, so nothing beyond the JSON type is assumed.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Reading {
    Flag(bool),
    Number(Number),
    Text(String),
    Other(Value),
}

impl Reading {
    /// Truthiness as the browser dashboard evaluates it
    pub fn is_truthy(&self) -> bool {
        match self {
            Reading::Flag(b) => *b,
            Reading::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
            Reading::Text(s) => !s.is_empty(),
            Reading::Other(v) => !v.is_null(),
        }
    }
}

/// Implementation of the Display Trait, renders the value as text content
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Reading::Flag(b) => write!(f, "{}", b),
            Reading::Number(n) => write!(f, "{}", format_number(n)),
            Reading::Text(s) => write!(f, "{}", s),
            Reading::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Formats a json number without a trailing `.0` on integral floats, e.g. `25.0` -> `25`.
/// Magnitudes below 1e-6 or from 1e21 up use exponent form, e.g. `1e-7` and `1.5e+21`.
///
/// # Arguments
///
/// * 'number' - the number to format
fn format_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(v) if v == 0.0 => "0".to_string(),
        Some(v) if v.abs() < 1e-6 || v.abs() >= 1e21 => exponent_form(v),
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{}", v),
        None => number.to_string(),
    }
}

/// Shortest exponent form with an explicit sign on positive exponents
fn exponent_form(value: f64) -> String {
    let text = format!("{:e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
        _ => text,
    }
}

/// Telemetry snapshot as returned by the status endpoint
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct BmsStatus {
    pub pack_voltage: Option<Reading>,
    pub charge_current: Option<Reading>,
    pub discharge_current: Option<Reading>,
    pub pack_current: Option<Reading>,
    pub soc: Option<Reading>,
    pub lowest_cell_voltage: Option<Reading>,
    pub lowest_cell_voltage_num: Option<Reading>,
    pub highest_cell_voltage: Option<Reading>,
    pub highest_cell_voltage_num: Option<Reading>,
    pub lowest_cell_temperature: Option<Reading>,
    pub lowest_cell_temperature_num: Option<Reading>,
    pub highest_cell_temperature: Option<Reading>,
    pub highest_cell_temperature_num: Option<Reading>,
    pub cell_count: Option<Reading>,
    pub cell_communication_error: Option<Reading>,
    pub allowed_to_discharge: Option<Reading>,
    pub allowed_to_charge: Option<Reading>,
    pub timestamp: Option<Reading>,
}

impl BmsStatus {
    /// Returns all fields paired with their element id and kind, in the order of FIELD_IDS
    ///
    pub fn fields(&self) -> [(&'static str, FieldKind, Option<&Reading>); 18] {
        use FieldKind::{Flag, Value};
        [
            (FIELD_IDS[0], Value, self.pack_voltage.as_ref()),
            (FIELD_IDS[1], Value, self.charge_current.as_ref()),
            (FIELD_IDS[2], Value, self.discharge_current.as_ref()),
            (FIELD_IDS[3], Value, self.pack_current.as_ref()),
            (FIELD_IDS[4], Value, self.soc.as_ref()),
            (FIELD_IDS[5], Value, self.lowest_cell_voltage.as_ref()),
            (FIELD_IDS[6], Value, self.lowest_cell_voltage_num.as_ref()),
            (FIELD_IDS[7], Value, self.highest_cell_voltage.as_ref()),
            (FIELD_IDS[8], Value, self.highest_cell_voltage_num.as_ref()),
            (FIELD_IDS[9], Value, self.lowest_cell_temperature.as_ref()),
            (FIELD_IDS[10], Value, self.lowest_cell_temperature_num.as_ref()),
            (FIELD_IDS[11], Value, self.highest_cell_temperature.as_ref()),
            (FIELD_IDS[12], Value, self.highest_cell_temperature_num.as_ref()),
            (FIELD_IDS[13], Value, self.cell_count.as_ref()),
            (FIELD_IDS[14], Flag, self.cell_communication_error.as_ref()),
            (FIELD_IDS[15], Flag, self.allowed_to_discharge.as_ref()),
            (FIELD_IDS[16], Flag, self.allowed_to_charge.as_ref()),
            (FIELD_IDS[17], Value, self.timestamp.as_ref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connected_payload() {
        let json = r#"{
            "pack_voltage": 52.35, "charge_current": 0, "discharge_current": 3.5,
            "pack_current": -3.5, "soc": 87, "lowest_cell_voltage": 3.27,
            "lowest_cell_voltage_num": 4, "highest_cell_voltage": 3.31,
            "highest_cell_voltage_num": 11, "lowest_cell_temperature": 21.0,
            "lowest_cell_temperature_num": 2, "highest_cell_temperature": 24.0,
            "highest_cell_temperature_num": 9, "cell_count": 16,
            "cell_communication_error": false, "allowed_to_discharge": true,
            "allowed_to_charge": true, "timestamp": "2024-05-01 12:00:00"
        }"#;
        let status: BmsStatus = serde_json::from_str(json).unwrap();

        assert_eq!(status.pack_voltage.unwrap().to_string(), "52.35");
        assert_eq!(status.pack_current.unwrap().to_string(), "-3.5");
        assert_eq!(status.lowest_cell_temperature.unwrap().to_string(), "21");
        assert_eq!(status.cell_count.unwrap().to_string(), "16");
        assert_eq!(status.allowed_to_charge, Some(Reading::Flag(true)));
        assert_eq!(status.timestamp.unwrap().to_string(), "2024-05-01 12:00:00");
    }

    #[test]
    fn parses_disconnected_placeholders() {
        let json = r#"{"soc": "-", "allowed_to_charge": "-", "cell_count": null}"#;
        let status: BmsStatus = serde_json::from_str(json).unwrap();

        assert_eq!(status.soc, Some(Reading::Text("-".to_string())));
        assert!(status.allowed_to_charge.unwrap().is_truthy());
        assert!(status.cell_count.is_none());
        assert!(status.pack_voltage.is_none());
    }

    #[test]
    fn truthiness_follows_browser_rules() {
        assert!(!Reading::Flag(false).is_truthy());
        assert!(!Reading::Number(Number::from(0)).is_truthy());
        assert!(Reading::Number(Number::from(4)).is_truthy());
        assert!(!Reading::Text(String::new()).is_truthy());
        assert!(Reading::Text("-".to_string()).is_truthy());
        assert!(Reading::Other(serde_json::json!([])).is_truthy());
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        let render = |json: &str| serde_json::from_str::<Reading>(json).unwrap().to_string();

        assert_eq!(render("0.0000001"), "1e-7");
        assert_eq!(render("-2.5e-9"), "-2.5e-9");
        assert_eq!(render("0.000001"), "0.000001");
        assert_eq!(render("1e21"), "1e+21");
        assert_eq!(render("1.5e22"), "1.5e+22");
        assert_eq!(render("1e20"), "100000000000000000000");
        assert_eq!(render("25.0"), "25");
    }

    #[test]
    fn fields_follow_id_order() {
        let status = BmsStatus::default();
        let fields = status.fields();
        for (i, (id, _, value)) in fields.iter().enumerate() {
            assert_eq!(*id, FIELD_IDS[i]);
            assert!(value.is_none());
        }
        let flags = fields.iter().filter(|(_, kind, _)| *kind == FieldKind::Flag).count();
        assert_eq!(flags, 3);
    }
}
