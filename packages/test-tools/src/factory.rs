//! Object factory for constructing entity instances without fixtures.
//!
//! A [`Factory`] collects named field values for one entity type and turns
//! them into ActiveModels, or inserts them straight into the backing store.
//! Fields set with [`Factory::with`] hold for every constructed instance;
//! fields set with [`Factory::with_each`] contribute one element per
//! instance, and all such sequences must agree on their length.
//!
//! ```ignore
//! let saved = Factory::<users::ActiveModel>::new()
//!     .with_each("username", ["john", "tom"])
//!     .with_each("last_name", ["Smith", "Green"])
//!     .with("email", unique_email("factory"))
//!     .create(&db)
//!     .await?;
//! ```

use std::marker::PhantomData;
use std::str::FromStr;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnFromStrErr, ConnectionTrait, EntityTrait,
    IntoActiveModel, Value,
};

use crate::error::Error;

#[derive(Debug, Clone)]
enum FieldValue {
    One(Value),
    Each(Vec<Value>),
}

/// Builder for one or more instances of an entity's ActiveModel.
#[derive(Debug, Clone)]
pub struct Factory<A> {
    fields: Vec<(String, FieldValue)>,
    _marker: PhantomData<A>,
}

impl<A> Factory<A> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Set a field to the same value on every constructed instance.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.put(field, FieldValue::One(value.into()));
        self
    }

    /// Set a field from a sequence: instance `i` receives element `i`.
    ///
    /// Every sequence-valued field in one factory must have the same length.
    pub fn with_each<I>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.put(
            field,
            FieldValue::Each(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    fn put(&mut self, field: &str, value: FieldValue) {
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| name == field) {
            slot.1 = value;
        } else {
            self.fields.push((field.to_string(), value));
        }
    }
}

impl<A> Factory<A>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    <A::Entity as EntityTrait>::Column: FromStr<Err = ColumnFromStrErr>,
{
    /// Construct the instances without persisting anything.
    ///
    /// With no sequence-valued field this is exactly one instance built from
    /// the scalars (one default instance when no fields are set at all); with
    /// sequence-valued fields of common length N it is N instances in input
    /// order, scalars broadcast to each.
    pub fn build(self) -> Result<Vec<A>, Error> {
        self.rows()
    }

    /// Construct exactly one instance without persisting it.
    ///
    /// Errors if the configured fields describe zero or several instances.
    pub fn build_one(self) -> Result<A, Error> {
        let mut rows = self.rows()?;
        if rows.len() != 1 {
            return Err(Error::NotSingular { count: rows.len() });
        }
        Ok(rows.remove(0))
    }

    /// Construct the instances and insert each through the backing store.
    ///
    /// Exactly one insert per instance, issued in index order. A length
    /// mismatch or unknown field fails before anything is inserted.
    pub async fn create<C>(self, db: &C) -> Result<Vec<<A::Entity as EntityTrait>::Model>, Error>
    where
        C: ConnectionTrait,
    {
        let rows = self.rows()?;
        let mut saved = Vec::with_capacity(rows.len());
        for row in rows {
            saved.push(row.insert(db).await?);
        }
        Ok(saved)
    }

    /// Construct exactly one instance and insert it.
    pub async fn create_one<C>(self, db: &C) -> Result<<A::Entity as EntityTrait>::Model, Error>
    where
        C: ConnectionTrait,
    {
        let row = self.build_one()?;
        Ok(row.insert(db).await?)
    }

    /// Number of instances the configured fields describe.
    ///
    /// Fails on the first sequence-valued field whose length disagrees with
    /// the field that fixed the length.
    fn row_count(&self) -> Result<usize, Error> {
        let mut anchor: Option<(&str, usize)> = None;
        for (name, value) in &self.fields {
            if let FieldValue::Each(values) = value {
                match anchor {
                    None => anchor = Some((name, values.len())),
                    Some((first, expected)) if values.len() != expected => {
                        return Err(Error::SequenceLengthMismatch {
                            anchor: first.to_string(),
                            field: name.clone(),
                            expected,
                            actual: values.len(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(anchor.map_or(1, |(_, len)| len))
    }

    fn rows(&self) -> Result<Vec<A>, Error> {
        let count = self.row_count()?;

        // Resolve every column name up front so a bad name constructs nothing.
        let mut columns = Vec::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            let column = <A::Entity as EntityTrait>::Column::from_str(name)?;
            columns.push((column, value));
        }

        let mut rows = Vec::with_capacity(count);
        for index in 0..count {
            let mut row = A::default();
            for (column, value) in &columns {
                let value = match value {
                    FieldValue::One(value) => value.clone(),
                    FieldValue::Each(values) => values[index].clone(),
                };
                row.set(*column, value);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

impl<A> Default for Factory<A> {
    fn default() -> Self {
        Self::new()
    }
}
