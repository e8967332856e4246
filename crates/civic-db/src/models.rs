/// Row type for the `records` table.
pub struct RecordRow {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}
