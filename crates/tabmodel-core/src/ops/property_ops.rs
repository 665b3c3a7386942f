//! Scalar property writes

use crate::errors::{ModelError, Result};
use crate::history::UndoOperation;
use crate::model::{Facet, ObjectId, PropertyName, PropertyValue};
use crate::notify::ChangeEvent;

use super::dependency_ops::refresh_dependencies;
use super::Model;

/// Storage-level write of one tracked property
///
/// Does not log and does not validate; used by history replay and by
/// operations that log their own undo record. Keeps the collection name index
/// in sync, refreshes dependencies after an expression write and publishes
/// `PropertyChanged`.
///
/// # Errors
///
/// Returns `ObjectNotFound` for unknown ids, and `Internal` if `value` does
/// not fit the property.
pub(crate) fn write_property(
    model: &mut Model,
    id: ObjectId,
    property: PropertyName,
    value: &PropertyValue,
) -> Result<()> {
    let mismatch = || ModelError::Internal {
        message: format!("{:?} is not a valid {} value", value, property),
    };
    let handle = model.handle_mut(id)?;
    let key = handle.collection();

    let old = match property {
        PropertyName::Name => {
            let name = value.as_text().ok_or_else(mismatch)?.to_string();
            PropertyValue::Text(std::mem::replace(&mut handle.name, name))
        }
        PropertyName::Expression => {
            let expression = match value {
                PropertyValue::Empty => None,
                other => Some(other.as_text().ok_or_else(mismatch)?.to_string()),
            };
            PropertyValue::from(std::mem::replace(&mut handle.expression, expression))
        }
        PropertyName::Ordinal => {
            let ordinal = match value {
                PropertyValue::Empty => None,
                other => Some(other.as_integer().ok_or_else(mismatch)?),
            };
            PropertyValue::from(std::mem::replace(&mut handle.ordinal, ordinal))
        }
    };
    handle.touch();

    if property == PropertyName::Name {
        if let (Some(key), Some(old_name), Some(new_name)) = (key, old.as_text(), value.as_text()) {
            model.collection_mut(key)?.reindex_name(id, old_name, new_name);
        }
    }
    if property == PropertyName::Expression && model.is_live(id) {
        refresh_dependencies(model, id)?;
    }

    model.notifier.publish(ChangeEvent::PropertyChanged {
        object: id,
        property,
        old,
        new: value.clone(),
    });
    Ok(())
}

/// Write one tracked property, then record the undoable change
///
/// Nothing is logged when the write fails.
///
/// # Errors
///
/// Same as [`write_property`].
pub(crate) fn write_logged_property(
    model: &mut Model,
    id: ObjectId,
    property: PropertyName,
    old: PropertyValue,
    new: PropertyValue,
) -> Result<()> {
    write_property(model, id, property, &new)?;
    model.log.add(UndoOperation::PropertyChange {
        object: id,
        property,
        old,
        new,
    });
    Ok(())
}

/// Replace the formula of a formula-bearing object
///
/// Logs an undoable property change and immediately recomputes the object's
/// outgoing dependency edges. Returns whether anything changed (a listener
/// veto or an identical expression leave the model untouched).
///
/// # Errors
///
/// * `UnsupportedOperation` - the object does not carry formulas
/// * `ObjectNotFound` / `ObjectDeleted` - `id` is not live
pub fn set_expression(model: &mut Model, id: ObjectId, expression: Option<&str>) -> Result<bool> {
    let handle = model.get_live(id)?;
    if !handle.supports(Facet::FormulaBearing) {
        tracing::error!(object_id = %id, object_kind = %handle.kind(), "object has no formula");
        return Err(ModelError::UnsupportedOperation {
            object_id: id,
            kind: handle.kind(),
            operation: "set expression".to_string(),
        });
    }
    if handle.expression() == expression {
        return Ok(false);
    }

    let old = PropertyValue::from(handle.expression().map(str::to_string));
    let new = PropertyValue::from(expression.map(str::to_string));
    if model
        .notifier
        .property_changing(id, PropertyName::Expression, &new)
    {
        return Ok(false);
    }

    write_logged_property(model, id, PropertyName::Expression, old, new)?;
    Ok(true)
}
