//! Emergency catalogue parser.
//!
//! Line format: `[name][priority]:type,count,time;type,count,time;`, e.g.
//! `[Incendio][2]:Pompieri,3,60;Ambulanza,1,40;`.

use std::fs;

use tracing::{debug, warn};

use crate::error::{DispatchError, DispatchResult};
use crate::model::{EmergencyType, EmergencyTypeId, Priority, RescuerRequirement, ResponderType};

const TAG: &str = "parse_emergency_types";

pub fn parse_emergency_types(
    path: &str,
    responder_types: &[ResponderType],
) -> DispatchResult<Vec<EmergencyType>> {
    debug!(target: TAG, path, "parsing emergency catalogue");

    let contents = fs::read_to_string(path).map_err(|e| DispatchError::ConfigParse {
        file: path.to_string(),
        reason: e.to_string(),
    })?;

    let mut types = Vec::new();
    for (lineno, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line, responder_types) {
            Some((name, priority, requirements)) => {
                types.push(EmergencyType {
                    id: EmergencyTypeId(types.len() as u32),
                    name,
                    priority,
                    requirements,
                });
            }
            None => {
                warn!(target: TAG, line = lineno + 1, text = line, "malformed emergency line, skipping");
            }
        }
    }

    debug!(target: TAG, count = types.len(), "emergency catalogue parsed");
    Ok(types)
}

/// Re-emits a catalogue in the same line format it was parsed from,
/// preserving order. Used to verify the parse/emit/parse round-trip.
pub fn emit_emergency_types(types: &[EmergencyType], responder_types: &[ResponderType]) -> String {
    let mut out = String::new();
    for t in types {
        let mut reqs = String::new();
        for r in &t.requirements {
            let type_name = responder_types
                .iter()
                .find(|rt| rt.id == r.responder_type)
                .map(|rt| rt.name.as_str())
                .unwrap_or("?");
            reqs.push_str(&format!(
                "{},{},{};",
                type_name, r.required_count, r.time_to_manage_secs
            ));
        }
        out.push_str(&format!("[{}][{}]:{}\n", t.name, t.priority.as_f64() as u8, reqs));
    }
    out
}

fn parse_line(
    line: &str,
    responder_types: &[ResponderType],
) -> Option<(String, Priority, Vec<RescuerRequirement>)> {
    let (header, body) = line.split_once(':')?;
    let fields = super::bracket_fields(header)?;
    if fields.len() != 2 {
        return None;
    }
    let name = fields[0].clone();
    let priority = Priority::from_u8(fields[1].parse().ok()?)?;

    let mut requirements = Vec::new();
    for segment in body.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let parts: Vec<&str> = segment.split(',').collect();
        if parts.len() != 3 {
            return None;
        }
        let type_name = parts[0].trim();
        let responder_type = responder_types.iter().find(|t| t.name == type_name)?;
        let required_count: u32 = parts[1].trim().parse().ok()?;
        let time_to_manage_secs: u64 = parts[2].trim().parse().ok()?;
        requirements.push(RescuerRequirement {
            responder_type: responder_type.id,
            required_count,
            time_to_manage_secs,
        });
    }
    if requirements.is_empty() {
        return None;
    }

    Some((name, priority, requirements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_responders() -> Vec<ResponderType> {
        vec![
            ResponderType {
                id: crate::model::ResponderTypeId(0),
                name: "Pompieri".into(),
                speed: 3,
                base: (0, 0),
                fleet_size: 6,
            },
            ResponderType {
                id: crate::model::ResponderTypeId(1),
                name: "Ambulanza".into(),
                speed: 5,
                base: (100, 200),
                fleet_size: 12,
            },
        ]
    }

    #[test]
    fn parses_well_formed_catalogue() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[Incendio][2]:Pompieri,3,60;Ambulanza,1,40;").unwrap();
        writeln!(file, "[Incidente][0]:Ambulanza,1,10;").unwrap();

        let types =
            parse_emergency_types(file.path().to_str().unwrap(), &sample_responders()).unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].name, "Incendio");
        assert_eq!(types[0].priority, Priority::High);
        assert_eq!(types[0].total_required_count(), 4);
        assert_eq!(types[0].total_time_to_manage_secs(), 60);
        assert_eq!(types[1].priority, Priority::Low);
    }

    #[test]
    fn skips_line_with_unknown_responder_type() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[Incendio][2]:Sommozzatori,1,10;").unwrap();
        writeln!(file, "[Incidente][0]:Ambulanza,1,10;").unwrap();

        let types =
            parse_emergency_types(file.path().to_str().unwrap(), &sample_responders()).unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "Incidente");
    }

    #[test]
    fn round_trips_through_emit_and_reparse() {
        let responders = sample_responders();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[Incendio][2]:Pompieri,3,60;Ambulanza,1,40;").unwrap();
        writeln!(file, "[Incidente][0]:Ambulanza,1,10;").unwrap();
        let first = parse_emergency_types(file.path().to_str().unwrap(), &responders).unwrap();

        let reemitted = emit_emergency_types(&first, &responders);
        let mut roundtrip_file = tempfile::NamedTempFile::new().unwrap();
        roundtrip_file.write_all(reemitted.as_bytes()).unwrap();
        let second =
            parse_emergency_types(roundtrip_file.path().to_str().unwrap(), &responders).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.priority, b.priority);
            assert_eq!(a.total_required_count(), b.total_required_count());
        }
    }
}
