use std::path::PathBuf;

pub enum Command {
    // Sources & schemas
    Sources,
    Fields {
        source: String,
    },
    // Rendering
    Preview {
        source: String,
        format: Option<String>,
        fields: Option<Vec<String>>,
        user: Option<String>,
    },
    Export {
        source: String,
        format: Option<String>,
        fields: Option<Vec<String>>,
        user: Option<String>,
        out_dir: Option<PathBuf>,
    },
    // Cached research record
    CacheShow,
    CacheSet {
        json: String,
    },
    CacheClear,
}
