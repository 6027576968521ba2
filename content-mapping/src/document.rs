//! Field-bag documents and a closure-driven mapper for them.
//!
//! [`Document`] is the object type of [`crate::destination::memory::MemoryDestination`] and
//! resembles a search index document: an id, a record class, and named field values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SyncResult;
use crate::mapper::{MapResult, Mapper};
use crate::types::RecordId;

/// Named field values of a [`Document`], sorted by field name.
pub type Fields = BTreeMap<String, Value>;

/// A destination object made of named JSON values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    pub class_name: String,
    #[serde(default)]
    pub fields: Fields,
    /// Set for documents created during a pass and not yet written.
    #[serde(skip)]
    is_new: bool,
}

impl Document {
    /// Creates an empty document.
    pub fn new(id: RecordId, class_name: impl Into<String>) -> Self {
        Self {
            id,
            class_name: class_name.into(),
            fields: Fields::new(),
            is_new: false,
        }
    }

    /// Creates an empty document that does not exist in the destination yet.
    ///
    /// [`DocumentMapper`] always reports such a document as changed, even when its mapped
    /// field set is empty.
    pub fn created(id: RecordId, class_name: impl Into<String>) -> Self {
        Self {
            is_new: true,
            ..Self::new(id, class_name)
        }
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Returns the key identifying this document across record classes.
    pub fn key(&self) -> String {
        format!("{}:{}", self.class_name, self.id)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// [`Mapper`] that builds [`Document`] fields through closures.
///
/// `id_of` extracts the source id. `fields_of` returns the complete field set of a source
/// record, or `None` when the record must not exist in the destination. A document is
/// reported as changed when its fields differ from the computed ones or when forced.
pub struct DocumentMapper<I, F> {
    id_of: I,
    fields_of: F,
    force: bool,
}

impl<I, F> DocumentMapper<I, F> {
    pub fn new(id_of: I, fields_of: F) -> Self {
        Self {
            id_of,
            fields_of,
            force: false,
        }
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }
}

impl<I, F> fmt::Debug for DocumentMapper<I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentMapper")
            .field("force", &self.force)
            .finish_non_exhaustive()
    }
}

impl<S, I, F> Mapper<S, Document> for DocumentMapper<I, F>
where
    I: Fn(&S) -> RecordId,
    F: Fn(&S) -> SyncResult<Option<Fields>>,
{
    fn id_of(&self, source_record: &S) -> RecordId {
        (self.id_of)(source_record)
    }

    fn set_force(&mut self, force: bool) {
        self.force = force;
    }

    fn map(&self, source_record: &S, mut document: Document) -> SyncResult<MapResult<Document>> {
        let Some(fields) = (self.fields_of)(source_record)? else {
            return Ok(MapResult::Unmappable);
        };

        if !self.force && !document.is_new && document.fields == fields {
            return Ok(MapResult::Unchanged);
        }

        document.fields = fields;
        document.is_new = false;

        Ok(MapResult::Changed(document))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Article {
        id: u64,
        title: Option<&'static str>,
    }

    fn article_mapper()
    -> DocumentMapper<impl Fn(&Article) -> RecordId, impl Fn(&Article) -> SyncResult<Option<Fields>>>
    {
        DocumentMapper::new(
            |article: &Article| RecordId(article.id),
            |article: &Article| {
                Ok(article.title.map(|title| {
                    let mut fields = Fields::new();
                    fields.insert("title".to_string(), json!(title));
                    fields
                }))
            },
        )
    }

    #[test]
    fn document_key_combines_class_and_id() {
        let document = Document::new(RecordId(42), "article");

        assert_eq!(document.key(), "article:42");
        assert_eq!(document.to_string(), "article:42");
    }

    #[test]
    fn new_document_is_changed() {
        let mapper = article_mapper();
        let article = Article {
            id: 1,
            title: Some("Hello"),
        };

        let result = mapper
            .map(&article, Document::new(RecordId(1), "article"))
            .unwrap();

        let document = result.into_object().unwrap();
        assert_eq!(document.field("title"), Some(&json!("Hello")));
        assert_eq!(Mapper::<Article, Document>::id_of(&mapper, &article), RecordId(1));
    }

    #[test]
    fn equal_fields_are_unchanged_unless_forced() {
        let mut mapper = article_mapper();
        let article = Article {
            id: 1,
            title: Some("Hello"),
        };
        let existing = Document::new(RecordId(1), "article").with_field("title", "Hello");

        let result = mapper.map(&article, existing.clone()).unwrap();
        assert_eq!(result, MapResult::Unchanged);

        Mapper::<Article, Document>::set_force(&mut mapper, true);
        assert!(mapper.is_forced());
        let result = mapper.map(&article, existing.clone()).unwrap();
        assert_eq!(result, MapResult::Changed(existing));
    }

    #[test]
    fn created_document_with_empty_fields_is_changed() {
        let mapper = DocumentMapper::new(
            |article: &Article| RecordId(article.id),
            |_: &Article| -> SyncResult<Option<Fields>> { Ok(Some(Fields::new())) },
        );
        let article = Article {
            id: 1,
            title: None,
        };

        let result = mapper
            .map(&article, Document::created(RecordId(1), "article"))
            .unwrap();

        assert_eq!(
            result,
            MapResult::Changed(Document::new(RecordId(1), "article"))
        );

        let result = mapper
            .map(&article, Document::new(RecordId(1), "article"))
            .unwrap();
        assert_eq!(result, MapResult::Unchanged);
    }

    #[test]
    fn missing_fields_are_unmappable() {
        let mapper = article_mapper();
        let article = Article { id: 1, title: None };

        let result = mapper
            .map(&article, Document::new(RecordId(1), "article"))
            .unwrap();

        assert!(result.is_unmappable());
    }
}
