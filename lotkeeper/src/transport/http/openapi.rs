//! OpenAPI 3.0.3 document for the HTTP API, served at `/api-docs`.

use serde_json::{Map, Value, json};

use crate::lot::MAX_LOT_CAPACITY;
use crate::version::LOTKEEPER_VERSION;

fn schema_ref(name: &str) -> Value {
    json!({"$ref": format!("#/components/schemas/{name}")})
}

fn json_body(schema: Value) -> Value {
    json!({"content": {"application/json": {"schema": schema}}})
}

fn lot_id_param() -> Value {
    json!({
        "name": "lot_id",
        "in": "path",
        "required": true,
        "description": "Parking lot ID.",
        "schema": {"type": "string"},
        "example": "PL1"
    })
}

fn path_param(name: &str, description: &str, example: &str) -> Value {
    json!({
        "name": name,
        "in": "path",
        "required": true,
        "description": description,
        "schema": {"type": "string"},
        "example": example
    })
}

/// One operation: summary, parameters, optional request body, and the
/// success response plus any error statuses it can return.
fn operation(
    summary: &str,
    params: Vec<Value>,
    request: Option<&str>,
    success: (&str, Value),
    errors: &[&str],
) -> Value {
    let mut responses = Map::new();
    let (status, schema) = success;
    responses.insert(
        status.into(),
        json!({
            "description": "Successful Response",
            "content": {"application/json": {"schema": schema}}
        }),
    );
    for status in errors {
        let description = match *status {
            "400" => "Invalid input or rejected operation",
            "404" => "Parking lot or vehicle not found",
            "409" => "Parking lot already exists",
            _ => "Error",
        };
        responses.insert(
            (*status).into(),
            json!({
                "description": description,
                "content": {"application/json": {"schema": schema_ref("Error")}}
            }),
        );
    }

    let mut op = Map::new();
    op.insert("summary".into(), json!(summary));
    if !params.is_empty() {
        op.insert("parameters".into(), Value::Array(params));
    }
    if let Some(name) = request {
        let mut body = json_body(schema_ref(name));
        body["required"] = json!(true);
        op.insert("requestBody".into(), body);
    }
    op.insert("responses".into(), Value::Object(responses));
    Value::Object(op)
}

fn message_with_total() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message": {"type": "string"},
            "totalSlots": {"type": "integer"}
        }
    })
}

fn components() -> Value {
    json!({
        "CreateLotRequest": {
            "type": "object",
            "required": ["id", "size"],
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Unique identifier for the parking lot.",
                    "example": "PL1"
                },
                "size": {
                    "type": "integer",
                    "description": "Total number of slots in the parking lot.",
                    "minimum": 1,
                    "maximum": MAX_LOT_CAPACITY,
                    "example": 5
                }
            }
        },
        "ResizeRequest": {
            "type": "object",
            "required": ["size"],
            "properties": {
                "size": {
                    "type": "integer",
                    "description": "Number of slots to add or remove.",
                    "minimum": 1,
                    "maximum": MAX_LOT_CAPACITY,
                    "example": 3
                }
            }
        },
        "ParkRequest": {
            "type": "object",
            "required": ["regNo", "color"],
            "properties": {
                "regNo": {
                    "type": "string",
                    "description": "Car registration number.",
                    "example": "UP-14-DC-1987"
                },
                "color": {
                    "type": "string",
                    "description": "Car color.",
                    "example": "Black"
                }
            }
        },
        "ClearRequest": {
            "type": "object",
            "required": ["slotNumber"],
            "properties": {
                "slotNumber": {
                    "type": "integer",
                    "description": "Slot number to free.",
                    "minimum": 1,
                    "example": 1
                }
            }
        },
        "OccupiedSlot": {
            "type": "object",
            "properties": {
                "slot": {"type": "integer"},
                "key": {"type": "string"},
                "tag": {"type": "string"}
            }
        },
        "ParkingLot": {
            "type": "object",
            "properties": {
                "lotId": {"type": "string"},
                "totalSlots": {"type": "integer"},
                "occupiedSlots": {"type": "array", "items": schema_ref("OccupiedSlot")},
                "availableSlots": {"type": "array", "items": {"type": "integer"}},
                "tagIndex": {
                    "type": "object",
                    "additionalProperties": {"type": "array", "items": {"type": "integer"}}
                },
                "keyIndex": {
                    "type": "object",
                    "additionalProperties": {"type": "integer"}
                }
            }
        },
        "Error": {
            "type": "object",
            "properties": {"error": {"type": "string"}}
        }
    })
}

/// Build the full document.
pub fn openapi_document() -> Value {
    let lot = lot_id_param;
    let color = || path_param("color", "Car color, matched case-insensitively.", "Black");
    let reg_no = || {
        path_param(
            "reg_no",
            "Car registration number, matched case-insensitively.",
            "UP-14-DC-1987",
        )
    };
    let message = json!({"type": "object", "properties": {"message": {"type": "string"}}});

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Car Parking System API",
            "description": "Manage multiple parking lots: create, expand, shrink and \
                monitor lots, park and release vehicles, and look vehicles up by \
                registration number or color.",
            "version": LOTKEEPER_VERSION,
            "license": {"name": "MIT", "url": "https://opensource.org/licenses/MIT"}
        },
        "paths": {
            "/health-check": {
                "get": operation(
                    "Service health and aggregate capacity",
                    vec![],
                    None,
                    ("200", json!({"type": "object"})),
                    &[],
                )
            },
            "/parking-lots": {
                "post": operation(
                    "Create a parking lot",
                    vec![],
                    Some("CreateLotRequest"),
                    ("201", message.clone()),
                    &["400", "409"],
                ),
                "get": operation(
                    "List all parking lots",
                    vec![],
                    None,
                    ("200", json!({
                        "type": "object",
                        "properties": {
                            "parkingLots": {"type": "array", "items": schema_ref("ParkingLot")}
                        }
                    })),
                    &[],
                )
            },
            "/parking-lots/{lot_id}": {
                "get": operation(
                    "Get one parking lot",
                    vec![lot()],
                    None,
                    ("200", schema_ref("ParkingLot")),
                    &["404"],
                ),
                "delete": operation(
                    "Delete a parking lot",
                    vec![lot()],
                    None,
                    ("200", message),
                    &["404"],
                )
            },
            "/parking-lots/{lot_id}/expand": {
                "patch": operation(
                    "Add slots to a parking lot",
                    vec![lot()],
                    Some("ResizeRequest"),
                    ("200", message_with_total()),
                    &["400", "404"],
                )
            },
            "/parking-lots/{lot_id}/shrink": {
                "patch": operation(
                    "Remove free slots from a parking lot",
                    vec![lot()],
                    Some("ResizeRequest"),
                    ("200", message_with_total()),
                    &["400", "404"],
                )
            },
            "/parking-lots/{lot_id}/park": {
                "post": operation(
                    "Park a car in the lowest free slot",
                    vec![lot()],
                    Some("ParkRequest"),
                    ("200", json!({
                        "type": "object",
                        "properties": {"allocated_slot_number": {"type": "integer"}}
                    })),
                    &["400", "404"],
                )
            },
            "/parking-lots/{lot_id}/clear": {
                "post": operation(
                    "Free an occupied slot",
                    vec![lot()],
                    Some("ClearRequest"),
                    ("200", json!({
                        "type": "object",
                        "properties": {"freed_slot_number": {"type": "integer"}}
                    })),
                    &["400", "404"],
                )
            },
            "/parking-lots/{lot_id}/status": {
                "get": operation(
                    "Occupied slots with their cars",
                    vec![lot()],
                    None,
                    ("200", json!({"type": "array", "items": {"type": "object"}})),
                    &["404"],
                )
            },
            "/parking-lots/{lot_id}/slots-by-color/{color}": {
                "get": operation(
                    "Slots holding cars of one color",
                    vec![lot(), color()],
                    None,
                    ("200", json!({
                        "type": "object",
                        "properties": {"slots": {"type": "array", "items": {"type": "integer"}}}
                    })),
                    &["404"],
                )
            },
            "/parking-lots/{lot_id}/vehicles-by-color/{color}": {
                "get": operation(
                    "Registration numbers of cars of one color",
                    vec![lot(), color()],
                    None,
                    ("200", json!({
                        "type": "object",
                        "properties": {
                            "registrations": {"type": "array", "items": {"type": "string"}}
                        }
                    })),
                    &["404"],
                )
            },
            "/parking-lots/{lot_id}/slot-by-reg/{reg_no}": {
                "get": operation(
                    "Slot of one car",
                    vec![lot(), reg_no()],
                    None,
                    ("200", json!({
                        "type": "object",
                        "properties": {"slot": {"type": "integer"}}
                    })),
                    &["404"],
                )
            }
        },
        "components": {"schemas": components()}
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_parking_route() {
        let doc = openapi_document();
        let paths = doc["paths"].as_object().unwrap();

        for path in [
            "/parking-lots",
            "/parking-lots/{lot_id}",
            "/parking-lots/{lot_id}/expand",
            "/parking-lots/{lot_id}/shrink",
            "/parking-lots/{lot_id}/park",
            "/parking-lots/{lot_id}/clear",
            "/parking-lots/{lot_id}/status",
            "/parking-lots/{lot_id}/slots-by-color/{color}",
            "/parking-lots/{lot_id}/vehicles-by-color/{color}",
            "/parking-lots/{lot_id}/slot-by-reg/{reg_no}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(doc["paths"]["/parking-lots"]["post"]["responses"]["409"].is_object());
    }

    #[test]
    fn request_bodies_resolve_to_components() {
        let doc = openapi_document();
        let schemas = &doc["components"]["schemas"];

        let park = &doc["paths"]["/parking-lots/{lot_id}/park"]["post"]["requestBody"];
        assert_eq!(
            park["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/ParkRequest"
        );
        assert_eq!(schemas["ParkRequest"]["required"], json!(["regNo", "color"]));
        assert_eq!(
            schemas["CreateLotRequest"]["properties"]["size"]["maximum"],
            json!(MAX_LOT_CAPACITY)
        );
        assert_eq!(doc["info"]["version"], LOTKEEPER_VERSION);
    }
}
