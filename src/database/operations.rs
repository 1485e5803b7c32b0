use serde_json::Value;

use crate::{
    database::{Collection, DocumentStore, Fields},
    error::AppError,
};

/// Attempts at a guarded read-modify-write before giving up on a contended record.
const APPEND_ATTEMPTS: usize = 3;

#[derive(Debug, PartialEq, Eq)]
pub enum Appended {
    /// The value was added; holds the list as written.
    Added(Vec<String>),
    AlreadyPresent,
}

/// Appends `value` to the string list stored in `field`, unless it is already there.
///
/// The write is only applied if the list is unchanged since it was read, so two
/// concurrent appends cannot overwrite each other. Returns `None` if the record is absent.
pub async fn append_unique(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
    field: &str,
    value: &str,
) -> Result<Option<Appended>, AppError> {
    for _ in 0..APPEND_ATTEMPTS {
        let Some(doc) = store.get_by_id(collection, id).await? else {
            return Ok(None);
        };

        let current = doc.fields.get(field).cloned().unwrap_or(Value::Null);
        let mut list: Vec<String> = match &current {
            Value::Null => vec![],
            other => serde_json::from_value(other.clone())?,
        };

        if list.iter().any(|existing| existing == value) {
            return Ok(Some(Appended::AlreadyPresent));
        }
        list.push(value.to_owned());

        let mut fields = Fields::new();
        fields.insert(field.to_owned(), serde_json::to_value(&list)?);

        if store
            .update_fields_if(collection, id, field, &current, fields)
            .await?
        {
            return Ok(Some(Appended::Added(list)));
        }

        tracing::warn!("{collection}/{id} changed while appending to {field}, retrying");
    }

    Err(AppError::Network(format!(
        "Could not update {collection}/{id}: too many concurrent changes"
    )))
}
