//! Show evaluator: inserts and removes conditional fields.

use crate::adapter::{required_list, ConditionalField};
use crate::context::ChangeContext;
use form_expression::{Bindings, JsValue};
use form_path::Segment;
use serde_json::Value;
use tracing::{debug, warn};

/// Why an entry was not evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The edit did not supply indices for every array slot of the entry.
    Unresolved,
    /// The expression reads `data` but the edit happened in another object.
    ContextMismatch,
    /// The field, or the object holding it, is not in the live schema.
    FieldMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    Shown,
    Hidden,
    Unchanged,
    Skipped(SkipReason),
    /// The expression failed; the field is shown.
    FailedOpen,
}

/// Evaluates one conditional field against the change and applies the
/// result to the context's schema and row.
pub fn evaluate_show(entry: &ConditionalField, ctx: &mut ChangeContext, action: &Value) -> ShowOutcome {
    let schema_path = entry.schema_path.substitute(&ctx.indices);
    let field_context = entry.context_path.substitute(&ctx.indices);
    if !schema_path.is_resolved() || !field_context.is_resolved() {
        debug!(key = %entry.key, "show skipped: unresolved index");
        return ShowOutcome::Skipped(SkipReason::Unresolved);
    }
    let schema_context = entry.schema_context.substitute(&ctx.indices);
    if !ctx.schema.contains(&schema_context) {
        debug!(key = %entry.key, "show skipped: enclosing object not shown");
        return ShowOutcome::Skipped(SkipReason::FieldMissing);
    }

    let data = ctx.data_for(&field_context);
    if data.is_undefined() && entry.show.references("data") {
        debug!(key = %entry.key, "show skipped: edit outside the field's object");
        return ShowOutcome::Skipped(SkipReason::ContextMismatch);
    }

    let bindings = Bindings::form(data, JsValue::Json(ctx.row.clone()), action.clone().into());
    let (visible, outcome_if_changed) = match entry.show.test(&bindings) {
        Ok(visible) => (visible, None),
        Err(err) => {
            warn!(key = %entry.key, expression = entry.show.source(), error = %err, "show expression failed, field shown");
            (true, Some(ShowOutcome::FailedOpen))
        }
    };

    let list = required_list(&schema_context);
    let present = ctx.schema.contains(&schema_path);
    let outcome = if visible {
        if !present {
            if let Err(err) = ctx.schema.insert(&schema_path, entry.definition.clone()) {
                warn!(key = %entry.key, error = %err, "conditional field not inserted");
                return ShowOutcome::Unchanged;
            }
        }
        if entry.statically_required {
            if let Err(err) = ctx.schema.add_required(&list, &entry.field_name) {
                warn!(key = %entry.key, error = %err, "conditional field not required");
            }
        }
        if present {
            ShowOutcome::Unchanged
        } else {
            ShowOutcome::Shown
        }
    } else {
        if !present {
            return ShowOutcome::Unchanged;
        }
        if let Err(err) = ctx.schema.remove(&schema_path) {
            warn!(key = %entry.key, error = %err, "conditional field not removed");
            return ShowOutcome::Unchanged;
        }
        let value_path = field_context.child(Segment::key(entry.field_name.as_str()));
        if let Err(err) = value_path.remove(&mut ctx.row) {
            warn!(key = %entry.key, error = %err, "hidden field value kept");
        }
        if entry.statically_required {
            if let Err(err) = ctx.schema.remove_required(&list, &entry.field_name) {
                warn!(key = %entry.key, error = %err, "hidden field still required");
            }
        }
        ShowOutcome::Hidden
    };
    outcome_if_changed.unwrap_or(outcome)
}
