use crate::core::{DeviceStatus, Direction, Mode};
use super::parser::ResponseFields;
use super::{power, Command};

/// Translates parsed fields into a status record.
///
/// Missing, rejected or unrecognized fields never fail; each falls back to
/// its default (off, speed "00", no direction with oscillation, auto mode).
pub fn translate(fields: &ResponseFields) -> DeviceStatus {
    let is_on = fields.byte(Command::ON_OFF) == Some(power::ON);

    let speed = fields
        .byte(Command::SPEED)
        .map(|s| format!("{:02}", s))
        .unwrap_or_else(|| "00".to_string());

    // An unknown direction is reported as alternating airflow
    let direction = fields.byte(Command::DIRECTION).and_then(Direction::from_code);
    let oscillating = direction.map_or(true, |d| d == Direction::Alternating);

    let mode = fields
        .byte(Command::MODE)
        .and_then(Mode::from_code)
        .unwrap_or_default();

    DeviceStatus {
        is_on,
        speed,
        oscillating,
        direction,
        mode,
    }
}
