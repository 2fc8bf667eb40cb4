use serde_json::{Value, json};

/// A US-letter page whose body starts one inch from the top left
pub fn page(main: Vec<Value>) -> Value {
    json!({
        "width": 612000, "height": 792000,
        "body": {
            "position": "absolute", "x": 72000, "y": 72000, "width": 468000, "height": 648000,
            "main": main
        }
    })
}

pub fn document(pages: Vec<Value>) -> Value {
    json!({ "pages": pages })
}

/// A line whose baseline sits 10pt below its top
pub fn line(children: Vec<Value>) -> Value {
    json!({ "kind": "line", "height": 12000, "placement_offset": 10000, "children": children })
}

pub fn word(text: &str, font: &str, size: i32, width: i32) -> Value {
    json!({ "kind": "word", "text": text, "font": font, "size": size, "width": width })
}

pub fn space(size: i32) -> Value {
    json!({ "kind": "inline_space", "size": size })
}

pub fn svg(markup: &str, width: i32, height: i32) -> Value {
    json!({
        "kind": "vector_graphic", "width": width, "height": height,
        "document": { "markup": markup }
    })
}
