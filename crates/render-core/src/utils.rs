use folio_types::Millipoints;
use lopdf::Object;

/// Convert millipoints to PDF points.
pub fn to_points(value: Millipoints) -> f32 {
    value as f32 / 1000.0
}

/// Convert a top-down Y coordinate to a bottom-up one (flip origin).
pub fn flip_y(y: Millipoints, page_height: Millipoints) -> Millipoints {
    page_height - y
}

/// A real operand.
pub fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// A real operand from millipoints.
pub fn points(value: Millipoints) -> Object {
    Object::Real(to_points(value))
}

pub fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}
