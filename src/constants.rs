/// Constants describing the default category scheme.
pub mod categories {
    /// Default `(label, slug)` pairs in scheme order.
    pub const DEFAULT_CATEGORIES: [(&str, &str); 3] = [
        ("高尾クラス", "takawo"),
        ("八尾クラス", "yao"),
        ("山下クラス", "yamashita"),
    ];
}

/// Constants used by CSV loading.
pub mod source {
    /// Minimum number of fields a row needs (`category, group, theme, materialsUrl`).
    pub const MIN_FIELDS: usize = 4;
    /// Default CSV file name.
    pub const DEFAULT_DATA_FILENAME: &str = "data.csv";
    /// Source id reported for in-memory CSV text.
    pub const INLINE_SOURCE_ID: &str = "inline";
}

/// Constants used by the block shuffle.
pub mod shuffle {
    /// Number of blocks (and records per category) in the reference layout.
    pub const DEFAULT_BLOCK_COUNT: usize = 3;
}

/// Constants used by persisted-state encoding and sidecar files.
pub mod persistence {
    /// Default sidecar file name.
    pub const DEFAULT_ORDER_FILENAME: &str = "order.json";
    /// Extension used for the temp file written before an atomic rename.
    pub const TEMP_EXTENSION: &str = "json.tmp";
}

/// Constants used by the schedule layout.
pub mod schedule {
    /// Presentations in the first session.
    pub const FIRST_SESSION_CAPACITY: usize = 4;
    /// Heading of the first session.
    pub const FIRST_SESSION_LABEL: &str = "Day 1 (4 presentations)";
    /// Heading of the session that takes the remaining presentations.
    pub const SECOND_SESSION_LABEL: &str = "Day 2 (remaining presentations)";
}
