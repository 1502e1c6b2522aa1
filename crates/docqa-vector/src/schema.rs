use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Arrow schema of the `chunks` table. The vector width is the embedding
/// dimensionality of whatever model built the index, so it is a parameter
/// rather than a constant.
pub fn chunks_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("doc_path", DataType::Utf8, false),
        Field::new("chunk_index", DataType::Int32, false),
        Field::new("content", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}
