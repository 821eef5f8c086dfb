//! Admin request bodies of the issuer scenario

use rand::Rng;
use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "degree schema";
pub const SCHEMA_ATTRIBUTES: [&str; 4] = ["name", "date", "degree", "age"];

/// Random `x.y.z` so every run publishes a fresh schema
pub fn random_schema_version() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{}.{}.{}",
        rng.gen_range(1..=101),
        rng.gen_range(1..=101),
        rng.gen_range(1..=101)
    )
}

pub fn schema_body(version: &str) -> Value {
    json!({
        "schema_name": SCHEMA_NAME,
        "schema_version": version,
        "attributes": SCHEMA_ATTRIBUTES,
    })
}

pub fn credential_definition_body(schema_id: &str) -> Value {
    json!({ "schema_id": schema_id })
}

pub fn credential_offer(credential_definition_id: &str, connection_id: &str) -> Value {
    json!({
        "credential_definition_id": credential_definition_id,
        "connection_id": connection_id,
    })
}

/// Attribute values issued once the holder asks for the credential
pub fn credential_values() -> Value {
    json!({
        "name": "Alice Smith",
        "date": "2018-05-28",
        "degree": "Maths",
        "age": "24",
    })
}

/// Proof of education: issued attributes restricted to our DID, one
/// self-attested attribute, and an age predicate
pub fn proof_request(connection_id: &str, issuer_did: Option<&str>) -> Value {
    let restricted = |name: &str| match issuer_did {
        Some(did) => json!({ "name": name, "restrictions": [{ "issuer_did": did }] }),
        None => json!({ "name": name }),
    };

    json!({
        "name": "Proof of Education",
        "version": "1.0",
        "connection_id": connection_id,
        "requested_attributes": [
            restricted("name"),
            restricted("date"),
            restricted("degree"),
            { "name": "self_attested_thing" },
        ],
        "requested_predicates": [
            { "name": "age", "p_type": ">=", "p_value": 18 }
        ],
    })
}

pub fn basic_message(content: &str) -> Value {
    json!({ "content": content })
}
