//! The tool schema exposed to the language model, and decoding of the
//! model's tool calls into a closed set of operations.
//!
//! Dispatch is modeled as a tagged union rather than string-matched side
//! effects: a call either decodes into a supported [`ToolInvocation`] or
//! it doesn't, and the controller falls back to its no-valid-response
//! sentinel for anything undecodable.

use serde::Deserialize;

use ik_domain::tool::{ToolCall, ToolDefinition};

use crate::availability::AvailabilityQuery;

pub const TOOL_CHECK_AVAILABILITY: &str = "check_booking_availability";
pub const TOOL_PROPERTY_DETAILS: &str = "get_property_details";

/// Build the tool definitions advertised on every dialogue turn.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: TOOL_PROPERTY_DETAILS.into(),
            description: "Fetch details of the properties. Can specify a property ID to get \
                          details for a specific property."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "property_id": {
                        "type": "string",
                        "description": "The ID of the property to fetch details for. If not provided, details for all properties are returned."
                    }
                },
                "required": []
            }),
        },
        ToolDefinition {
            name: TOOL_CHECK_AVAILABILITY.into(),
            description: "Check if a property is available for booking between the specified \
                          check-in and check-out dates."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "property_id": {
                        "type": "string",
                        "description": "The ID of the property to check availability for. Optional if property_name is provided."
                    },
                    "property_name": {
                        "type": "string",
                        "description": "The name of the property to check availability for. Optional if property_id is provided."
                    },
                    "city_name": {
                        "type": "string",
                        "description": "The city where the property is located. When given alone, availability is checked for every property in the city."
                    },
                    "check_in": {
                        "type": "string",
                        "description": "Check-in date in YYYY-MM-DD format (e.g. '2025-06-10')."
                    },
                    "check_out": {
                        "type": "string",
                        "description": "Check-out date in YYYY-MM-DD format (e.g. '2025-06-15')."
                    }
                },
                "required": ["check_in", "check_out"]
            }),
        },
    ]
}

/// A decoded, supported tool invocation.
#[derive(Debug, Clone)]
pub enum ToolInvocation {
    CheckAvailability(AvailabilityQuery),
    PropertyDetails { property_id: Option<String> },
}

#[derive(Debug, Deserialize)]
struct DetailArgs {
    #[serde(default)]
    property_id: Option<String>,
}

impl ToolInvocation {
    /// Decode a model tool call. Returns `None` for unsupported tool names
    /// and for arguments that don't fit the declared schema — the caller
    /// treats both as "no valid response" rather than guessing.
    pub fn decode(call: &ToolCall) -> Option<Self> {
        match call.tool_name.as_str() {
            TOOL_CHECK_AVAILABILITY => {
                let query: AvailabilityQuery =
                    serde_json::from_value(call.arguments.clone()).ok()?;
                Some(Self::CheckAvailability(query))
            }
            TOOL_PROPERTY_DETAILS => {
                let args: DetailArgs = serde_json::from_value(call.arguments.clone()).ok()?;
                Some(Self::PropertyDetails {
                    property_id: args.property_id,
                })
            }
            other => {
                tracing::warn!(tool = other, "model requested an unsupported tool");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            call_id: "call_1".into(),
            tool_name: name.into(),
            arguments,
        }
    }

    #[test]
    fn decodes_availability_call() {
        let decoded = ToolInvocation::decode(&call(
            TOOL_CHECK_AVAILABILITY,
            serde_json::json!({
                "property_name": "The Walk Flat",
                "check_in": "2025-06-10",
                "check_out": "2025-06-15"
            }),
        ));
        match decoded {
            Some(ToolInvocation::CheckAvailability(q)) => {
                assert_eq!(q.property_name.as_deref(), Some("The Walk Flat"));
                assert_eq!(q.check_in.as_deref(), Some("2025-06-10"));
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn decodes_details_call_with_and_without_id() {
        match ToolInvocation::decode(&call(
            TOOL_PROPERTY_DETAILS,
            serde_json::json!({"property_id": "P1"}),
        )) {
            Some(ToolInvocation::PropertyDetails { property_id }) => {
                assert_eq!(property_id.as_deref(), Some("P1"));
            }
            other => panic!("unexpected decode: {other:?}"),
        }

        match ToolInvocation::decode(&call(TOOL_PROPERTY_DETAILS, serde_json::json!({}))) {
            Some(ToolInvocation::PropertyDetails { property_id }) => {
                assert!(property_id.is_none());
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn missing_dates_still_decode_into_a_query() {
        // Validation of missing dates belongs to the resolver, not the
        // decoder — the query must come through so the guest gets the
        // "missing dates" message rather than the generic sentinel.
        let decoded = ToolInvocation::decode(&call(
            TOOL_CHECK_AVAILABILITY,
            serde_json::json!({"property_id": "P1"}),
        ));
        assert!(matches!(decoded, Some(ToolInvocation::CheckAvailability(_))));
    }

    #[test]
    fn unknown_tool_is_rejected() {
        assert!(ToolInvocation::decode(&call("make_me_a_booking", serde_json::json!({}))).is_none());
    }

    #[test]
    fn mistyped_arguments_are_rejected() {
        assert!(ToolInvocation::decode(&call(
            TOOL_CHECK_AVAILABILITY,
            serde_json::json!({"check_in": 20250610})
        ))
        .is_none());
        assert!(ToolInvocation::decode(&call(TOOL_PROPERTY_DETAILS, serde_json::json!("P1"))).is_none());
    }

    #[test]
    fn schema_declares_exactly_two_tools() {
        let defs = tool_definitions();
        assert_eq!(defs.len(), 2);
        let availability = defs
            .iter()
            .find(|d| d.name == TOOL_CHECK_AVAILABILITY)
            .unwrap();
        let required = availability.parameters["required"].as_array().unwrap();
        assert!(required.contains(&serde_json::json!("check_in")));
        assert!(required.contains(&serde_json::json!("check_out")));
    }
}
