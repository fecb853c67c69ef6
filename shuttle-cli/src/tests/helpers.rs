//! Test helpers for writing solve requests into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use shuttle_core::{Guest, SolveRequest};
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

pub(super) fn temp_workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Three guests who fit one vehicle within a 15 minute window.
pub(super) fn sample_request() -> SolveRequest {
    SolveRequest::new(
        vec![
            Guest::new("g1", "Ada", 0),
            Guest::new("g2", "Brian", 5),
            Guest::new("g3", "Cleo", 10),
        ],
        1,
        3,
        15,
    )
    .with_round_trip_min(60)
}

pub(super) fn write_request(path: &Utf8Path, request: &SolveRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialize request");
    write_utf8(path, payload.as_bytes());
}
