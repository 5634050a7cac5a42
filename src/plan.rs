//! Schema-driven planning.
//!
//! The orchestrator proposes a new state for a resource; [`plan_resource`]
//! applies the schema's plan modifiers to it and works out which attributes
//! change. Unknown values (to be computed during apply) are `null`.

use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::schema::{PlanModifier, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Plan a resource against `schema`.
///
/// - `prior_state` is `None` when the resource does not exist yet.
/// - A `null` `proposed_state` plans destruction.
///
/// Computed attributes marked [`PlanModifier::UseStateForUnknown`] keep their
/// prior value when the proposal leaves them unknown. A change to an attribute
/// marked [`PlanModifier::RequiresReplace`] on an existing resource sets
/// `requires_replace`.
pub fn plan_resource(
    schema: &Schema,
    prior_state: Option<&Value>,
    proposed_state: Value,
) -> Result<PlanResult, ProviderError> {
    let prior = match prior_state {
        Some(Value::Object(obj)) => Some(obj),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(ProviderError::Validation(format!(
                "prior state must be an object, got {}",
                other
            )))
        },
    };

    let proposed = match proposed_state {
        Value::Null => return Ok(plan_destroy(schema, prior)),
        Value::Object(obj) => obj,
        other => {
            return Err(ProviderError::Validation(format!(
                "proposed state must be an object, got {}",
                other
            )))
        },
    };

    let mut planned = proposed;
    for (name, attr) in &schema.attributes {
        let unknown = planned.get(name).map_or(true, Value::is_null);
        let retained = prior
            .and_then(|p| p.get(name))
            .filter(|v| !v.is_null())
            .filter(|_| {
                unknown
                    && attr.flags.computed
                    && attr.has_plan_modifier(PlanModifier::UseStateForUnknown)
            })
            .cloned();
        match retained {
            Some(value) => {
                planned.insert(name.clone(), value);
            },
            None if unknown => {
                planned.insert(name.clone(), Value::Null);
            },
            None => {},
        }
    }

    let mut changes = Vec::new();
    let mut requires_replace = false;
    for (name, attr) in &schema.attributes {
        let before = prior.and_then(|p| known(p, name));
        let after = known(&planned, name);

        if prior.is_none() {
            changes.push(AttributeChange::new(name.clone(), None, after));
        } else if before != after {
            if attr.has_plan_modifier(PlanModifier::RequiresReplace) {
                requires_replace = true;
            }
            changes.push(AttributeChange::new(name.clone(), before, after));
        }
    }

    Ok(PlanResult::with_changes(
        Value::Object(planned),
        changes,
        requires_replace,
    ))
}

fn plan_destroy(schema: &Schema, prior: Option<&Map<String, Value>>) -> PlanResult {
    let Some(prior) = prior else {
        return PlanResult::no_change(Value::Null);
    };

    let changes = schema
        .attributes
        .keys()
        .filter_map(|name| known(prior, name).map(|v| AttributeChange::removed(name.clone(), v)))
        .collect();
    PlanResult::with_changes(Value::Null, changes, false)
}

fn known(obj: &Map<String, Value>, name: &str) -> Option<Value> {
    obj.get(name).filter(|v| !v.is_null()).cloned()
}
