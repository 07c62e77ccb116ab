/// Database row type, mapped directly from the `documents` table.
/// Typed decoding happens in `Collection` so this layer stays schema-free.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub id: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}
